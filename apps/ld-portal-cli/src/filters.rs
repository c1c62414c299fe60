use anyhow::Context as _;
use clap::Args;
use ld_portal::{RecordCollectionView, RecordId};
use ldp_query::{Dimension, Filterable};

/// Dashboard filter bar. Every flag defaults to `all`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Status (requests), state (demo accounts) or specialization (interns)
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub industry: Option<String>,

    /// Primary use case, or `custom` for free-text use cases
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub integration: Option<String>,

    /// Customer company an intern works with
    #[arg(long)]
    pub company: Option<String>,

    /// Count bucket of the primary counter: 0, 1-5, 6-10 or 10+
    #[arg(long)]
    pub primary_count: Option<String>,

    /// Count bucket of the secondary counter
    #[arg(long)]
    pub secondary_count: Option<String>,

    /// Case-insensitive substring search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Earliest creation date, `YYYY-MM-DD` or RFC 3339
    #[arg(long)]
    pub from: Option<String>,

    /// Latest creation date; a plain date includes the whole day
    #[arg(long)]
    pub to: Option<String>,
}

impl FilterArgs {
    fn pairs(&self) -> [(Dimension, Option<&String>); 10] {
        [
            (Dimension::Status, self.status.as_ref()),
            (Dimension::Industry, self.industry.as_ref()),
            (Dimension::Category, self.category.as_ref()),
            (Dimension::Integration, self.integration.as_ref()),
            (Dimension::Company, self.company.as_ref()),
            (Dimension::PrimaryCount, self.primary_count.as_ref()),
            (Dimension::SecondaryCount, self.secondary_count.as_ref()),
            (Dimension::Search, self.search.as_ref()),
            (Dimension::DateFrom, self.from.as_ref()),
            (Dimension::DateTo, self.to.as_ref()),
        ]
    }

    pub fn apply<R>(&self, view: &mut RecordCollectionView<R>) -> anyhow::Result<()>
    where
        R: Filterable + RecordId + Send + Sync + 'static,
    {
        for (dimension, value) in self.pairs() {
            if let Some(value) = value {
                view.set_filter(dimension, value)
                    .with_context(|| format!("invalid {dimension} filter"))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_map_to_nothing() {
        let args = FilterArgs::default();
        assert!(args.pairs().iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn flags_map_to_their_dimension() {
        let args = FilterArgs {
            primary_count: Some("10+".to_owned()),
            to: Some("2025-01-31".to_owned()),
            ..FilterArgs::default()
        };
        let set: Vec<Dimension> = args
            .pairs()
            .iter()
            .filter(|(_, v)| v.is_some())
            .map(|(d, _)| *d)
            .collect();
        assert_eq!(set, vec![Dimension::PrimaryCount, Dimension::DateTo]);
    }
}
