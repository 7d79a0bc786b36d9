use std::collections::BTreeSet;

use super::assignment::Category;

/// Dashboard filter state. `subject == None` means all subjects and an
/// empty category set means all categories. Filters never carry across a
/// semester switch because subject ids are semester-scoped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilters {
    pub subject: Option<i64>,
    pub categories: BTreeSet<Category>,
}

impl DashboardFilters {
    pub fn is_all(&self) -> bool {
        self.subject.is_none() && self.categories.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Query-string fragment for the dashboard fetch. Unfiltered dimensions
    /// are omitted entirely; categories encode as a csv of numeric codes.
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(sub_id) = self.subject {
            parts.push(format!("subId={sub_id}"));
        }
        if !self.categories.is_empty() {
            let csv = self
                .categories
                .iter()
                .map(|c| c.code().to_string())
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("categories={csv}"));
        }
        parts.join("&")
    }
}
