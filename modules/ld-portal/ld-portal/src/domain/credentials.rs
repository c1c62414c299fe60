//! Credential suggestions for newly created interns.

use rand::Rng;

const PASSWORD_LEN: usize = 12;
const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Random 12-character password over letters, digits and `!@#$%^&*`.
#[must_use]
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..PASSWORD_LEN)
        .map(|_| char::from(PASSWORD_ALPHABET[rng.random_range(0..PASSWORD_ALPHABET.len())]))
        .collect()
}

/// `intern_<letters of name>_<n>` with `n` in `0..999`.
///
/// Only ASCII letters of `name` are kept, lowercased.
#[must_use]
pub fn generate_username(name: &str) -> String {
    let slug: String = name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let suffix = rand::rng().random_range(0..999);
    format!("intern_{slug}_{suffix}")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn password_has_fixed_length_and_alphabet() {
        for _ in 0..50 {
            let password = generate_password();
            assert_eq!(password.len(), PASSWORD_LEN);
            assert!(password.bytes().all(|b| PASSWORD_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn passwords_differ_between_calls() {
        assert_ne!(generate_password(), generate_password());
    }

    #[test]
    fn username_keeps_lowercase_letters_only() {
        let username = generate_username("Grace O'Hopper-2");
        let rest = username.strip_prefix("intern_graceohopper_").unwrap();
        let n: u32 = rest.parse().unwrap();
        assert!(n < 999);
    }

    #[test]
    fn username_of_empty_name_still_has_shape() {
        let username = generate_username("");
        assert!(username.starts_with("intern__"));
    }
}
