use serde::{Deserialize, Serialize};

/// One row of the sidebar semester menu. `current` marks the semester the
/// dashboard payload was built for; older servers omit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterItem {
    pub sem_id: i64,
    pub sem_name: String,
    #[serde(default)]
    pub current: bool,
}
