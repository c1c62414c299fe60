use std::io::Write;

use clap::Args;
use ld_portal_sdk::constants::USE_CASES;
use ld_portal_sdk::{AccountType, LoginRequest, Registration, RegistrationReceipt, Secret};
use ldp_query::CUSTOM_CATEGORY;

use crate::context::AppContext;

#[derive(Args)]
pub struct LoginArgs {
    pub username: String,

    /// Password; taken from `LDP_PASSWORD` when omitted
    #[arg(long, env = "LDP_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl LoginArgs {
    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let request = LoginRequest {
            username: self.username,
            password: Secret::from(self.password),
        };
        let response = ctx.api().login(&request).await?;
        writeln!(
            out,
            "signed in as {} ({})",
            response.user.name, response.user.role
        )?;
        Ok(())
    }
}

/// The local session is dropped even when the backend call fails.
pub async fn logout(ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
    match ctx.api().logout().await {
        Ok(()) => writeln!(out, "signed out")?,
        Err(e) => {
            tracing::warn!(error = %e, "backend logout failed");
            writeln!(out, "signed out locally ({e})")?;
        }
    }
    Ok(())
}

pub fn whoami(ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
    let user = ctx.identity()?;
    writeln!(out, "{} ({}, id {})", user.name, user.role, user.id)?;
    Ok(())
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub industry: Option<String>,

    /// One of the predefined use cases, or free text
    #[arg(long)]
    pub use_case: Option<String>,

    /// Data source to connect; repeat for several
    #[arg(long = "integration")]
    pub integrations: Vec<String>,

    /// Request a 10-day demo account instead of an L&D engagement
    #[arg(long)]
    pub demo: bool,
}

impl RegisterArgs {
    fn registration(self) -> Registration {
        let use_case_type = self
            .use_case
            .as_deref()
            .filter(|u| !USE_CASES.contains(u))
            .map(|_| CUSTOM_CATEGORY.to_owned());
        Registration {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            company: self.company,
            phone: self.phone,
            industry_domain: self.industry,
            primary_use_case: self.use_case,
            primary_use_case_type: use_case_type,
            selected_integrations: self.integrations,
            account_type: if self.demo {
                AccountType::Demo
            } else {
                AccountType::Ld
            },
        }
    }

    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let receipt = ctx.api().register(&self.registration()).await?;
        print_receipt(out, &receipt)?;
        Ok(())
    }
}

fn print_receipt(out: &mut dyn Write, receipt: &RegistrationReceipt) -> std::io::Result<()> {
    writeln!(out, "{}", receipt.message)?;
    if let Some(id) = receipt.request_id {
        writeln!(out, "request id: {id}")?;
    }
    if let (Some(username), Some(password)) = (&receipt.username, &receipt.password) {
        writeln!(out, "demo username: {username}")?;
        writeln!(out, "demo password: {}", password.expose())?;
    }
    if let Some(expires) = receipt.expires_at {
        writeln!(out, "expires: {}", expires.format("%Y-%m-%d %H:%M UTC"))?;
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn args(use_case: Option<&str>) -> RegisterArgs {
        RegisterArgs {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            company: "Analytical".to_owned(),
            phone: "555-0100".to_owned(),
            industry: None,
            use_case: use_case.map(str::to_owned),
            integrations: Vec::new(),
            demo: true,
        }
    }

    #[test]
    fn free_text_use_case_is_marked_custom() {
        let registration = args(Some("Tracking drone fleets")).registration();
        assert_eq!(
            registration.primary_use_case_type.as_deref(),
            Some(CUSTOM_CATEGORY)
        );
        assert_eq!(registration.account_type, AccountType::Demo);
    }

    #[test]
    fn predefined_use_case_is_not_custom() {
        let registration = args(Some(USE_CASES[0])).registration();
        assert!(registration.primary_use_case_type.is_none());
        assert!(args(None).registration().primary_use_case_type.is_none());
    }
}
