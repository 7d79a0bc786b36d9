use serde::{Deserialize, Serialize};

use super::assignment::Category;

/// Flat row from the dedicated calendar fetch. Carries no completion flag;
/// the aggregator treats fetched rows as open work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub sub_name: String,
    pub due_date: String,
    pub assign_name: String,
    pub category: Category,
}
