use serde::{Deserialize, Serialize};

use super::assignment::Assignment;
use super::semester::SemesterItem;
use super::subject::Subject;

/// Fully normalized dashboard state for one semester. Replaced wholesale on
/// every load; never patched in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub sem_id: i64,
    pub sem_name: String,
    pub user_name: String,
    pub subjects: Vec<Subject>,
    pub semesters: Vec<SemesterItem>,
    pub incomplete: Vec<Assignment>,
    pub complete: Vec<Assignment>,
}

impl DashboardSnapshot {
    /// Both partitions in server order, incomplete first. The calendar view
    /// falls back to this union when no dedicated calendar fetch is held.
    pub fn all_assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.incomplete.iter().chain(self.complete.iter())
    }

    /// Looks one assignment up by id across both partitions.
    pub fn find_assignment(&self, assign_id: i64) -> Option<&Assignment> {
        self.all_assignments().find(|a| a.assign_id == assign_id)
    }
}
