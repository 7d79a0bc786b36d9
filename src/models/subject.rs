use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Subject names longer than this are clipped for display. Storage always
/// keeps the full name.
pub const SUBJECT_DISPLAY_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub sub_id: i64,
    pub sub_name: String,
}

/// Subject lookup built fresh from the live subject list of one semester.
#[derive(Debug, Default)]
pub struct SubjectIndex {
    names: HashMap<i64, String>,
}

impl SubjectIndex {
    pub fn from_subjects(subjects: &[Subject]) -> Self {
        let names = subjects
            .iter()
            .map(|s| (s.sub_id, s.sub_name.clone()))
            .collect();
        Self { names }
    }

    /// Display name for an assignment's subject. Resolution order: the live
    /// map, then the row's own non-blank denormalized name, then a
    /// `(subject#…)` placeholder. A miss never drops the row.
    pub fn display_name(&self, sub_id: Option<i64>, denormalized: Option<&str>) -> String {
        if let Some(id) = sub_id {
            if let Some(name) = self.names.get(&id) {
                return clip_display(name);
            }
        }
        if let Some(name) = denormalized {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                return clip_display(trimmed);
            }
        }
        match sub_id {
            Some(id) => format!("(subject#{id})"),
            None => "(subject#?)".to_string(),
        }
    }
}

pub fn clip_display(name: &str) -> String {
    let mut chars = name.chars();
    let clipped: String = chars.by_ref().take(SUBJECT_DISPLAY_LIMIT).collect();
    if chars.next().is_some() {
        format!("{clipped}…")
    } else {
        clipped
    }
}
