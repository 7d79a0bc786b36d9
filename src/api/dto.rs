use serde::{Deserialize, Serialize};

use crate::models::{Assignment, CalendarItem, Category, SemesterItem, Subject, SubjectIndex};
use crate::utils::dates;

/// Raw dashboard response. The collaborator nests the semester header under
/// `dashboard` and the two partitions under `sections`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    #[serde(default)]
    pub dashboard: DashboardHeader,
    #[serde(default)]
    pub semesters: Vec<SemesterItem>,
    #[serde(default)]
    pub sections: AssignmentSections,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardHeader {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub sem_id: Option<i64>,
    #[serde(default)]
    pub sem_name: Option<String>,
    #[serde(default)]
    pub subject_list: Vec<Subject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentSections {
    #[serde(default)]
    pub incomplete: Vec<AssignmentRow>,
    #[serde(default)]
    pub complete: Vec<AssignmentRow>,
}

/// One wire assignment row before normalization. Subject linkage and the
/// server display label are optional on the wire; a row is never dropped
/// for missing either.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    pub assign_id: i64,
    pub assign_name: String,
    #[serde(default)]
    pub due_date: String,
    pub category: Category,
    #[serde(default)]
    pub is_complete: i64,
    #[serde(default)]
    pub sub_id: Option<i64>,
    #[serde(default)]
    pub sub_name: Option<String>,
    #[serde(default)]
    pub due_label: Option<String>,
}

impl AssignmentRow {
    /// Normalizes one row: due date collapsed to the canonical day-string
    /// when one can be extracted, completion collapsed to a bool (only 1
    /// means complete; the server also uses 2 for incomplete-but-due-soon),
    /// subject name resolved through the live index.
    pub fn into_assignment(self, index: &SubjectIndex) -> Assignment {
        let due_date = dates::extract_day(&self.due_date).unwrap_or(self.due_date);
        let sub_name = index.display_name(self.sub_id, self.sub_name.as_deref());
        Assignment {
            assign_id: self.assign_id,
            assign_name: self.assign_name,
            due_date,
            category: self.category,
            is_complete: self.is_complete == 1,
            sub_id: self.sub_id,
            sub_name: Some(sub_name),
            due_label: self.due_label,
        }
    }
}

/// GET /semester/{id}/calendar response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarPayload {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub items: Vec<CalendarItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReq<'a> {
    pub user_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterReq<'a> {
    pub sem_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectReq<'a> {
    pub sub_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentReq<'a> {
    pub assign_name: &'a str,
    pub due_date: &'a str,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteReq {
    pub is_complete: u8,
}
