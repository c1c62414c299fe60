use crate::field::FilterField;

/// Binding of the category dimension.
///
/// `known` is the predefined category list used by the `"custom"` sentinel;
/// `kind_field`, when bound, marks a record as custom by itself holding the
/// value `"custom"`.
#[derive(Clone, Debug)]
pub struct CategoryBinding<F: FilterField> {
    pub field: F,
    pub known: &'static [&'static str],
    pub kind_field: Option<F>,
}

/// Tells the filter engine which record field backs each dimension.
///
/// Unbound dimensions impose no constraint even when the filter state sets
/// them.
#[derive(Clone, Debug)]
pub struct FieldMap<F: FilterField> {
    pub status: Option<F>,
    pub industry: Option<F>,
    pub category: Option<CategoryBinding<F>>,
    pub integration: Option<F>,
    pub company: Option<F>,
    pub primary_count: Option<F>,
    pub secondary_count: Option<F>,
    pub search: Vec<F>,
    pub date: Option<F>,
}

impl<F: FilterField> Default for FieldMap<F> {
    fn default() -> Self {
        Self {
            status: None,
            industry: None,
            category: None,
            integration: None,
            company: None,
            primary_count: None,
            secondary_count: None,
            search: Vec::new(),
            date: None,
        }
    }
}

impl<F: FilterField> FieldMap<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, field: F) -> Self {
        self.status = Some(field);
        self
    }

    #[must_use]
    pub fn industry(mut self, field: F) -> Self {
        self.industry = Some(field);
        self
    }

    #[must_use]
    pub fn category(
        mut self,
        field: F,
        known: &'static [&'static str],
        kind_field: Option<F>,
    ) -> Self {
        self.category = Some(CategoryBinding {
            field,
            known,
            kind_field,
        });
        self
    }

    #[must_use]
    pub fn integration(mut self, field: F) -> Self {
        self.integration = Some(field);
        self
    }

    #[must_use]
    pub fn company(mut self, field: F) -> Self {
        self.company = Some(field);
        self
    }

    #[must_use]
    pub fn primary_count(mut self, field: F) -> Self {
        self.primary_count = Some(field);
        self
    }

    #[must_use]
    pub fn secondary_count(mut self, field: F) -> Self {
        self.secondary_count = Some(field);
        self
    }

    /// Searchable fields, joined with single spaces in the given order.
    #[must_use]
    pub fn search<I: IntoIterator<Item = F>>(mut self, fields: I) -> Self {
        self.search = fields.into_iter().collect();
        self
    }

    #[must_use]
    pub fn date(mut self, field: F) -> Self {
        self.date = Some(field);
        self
    }
}
