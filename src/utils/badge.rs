use chrono::NaiveDate;

use crate::utils::dates;

/// Urgency badge for one assignment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueBadge {
    pub label: String,
    pub is_urgent: bool,
    pub is_overdue: bool,
}

impl DueBadge {
    /// Non-urgent badge carrying the server label when it has one, "DUE"
    /// otherwise. Completed items and far-future items both land here.
    fn calm(server_label: Option<&str>) -> Self {
        let label = server_label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("DUE");
        DueBadge {
            label: label.to_string(),
            is_urgent: false,
            is_overdue: false,
        }
    }
}

/// Classifies against the machine-local calendar date.
pub fn classify(due_text: &str, complete: bool, server_label: Option<&str>) -> DueBadge {
    classify_with_today(due_text, complete, server_label, dates::today())
}

/// Badge for an assignment given its raw due text and completion flag.
///
/// The stored due day is the day BEFORE the nominal deadline, so the labels
/// run one day behind it: due == today reads "D-1", due == yesterday reads
/// "D-DAY", anything older reads "OVER". There is no countdown past D-1;
/// future dates fall through to the calm default.
pub fn classify_with_today(
    due_text: &str,
    complete: bool,
    server_label: Option<&str>,
    today: NaiveDate,
) -> DueBadge {
    if complete {
        return DueBadge::calm(server_label);
    }
    let due = match dates::extract_day(due_text).and_then(|d| dates::parse_day(&d)) {
        Some(due) => due,
        None => return DueBadge::calm(server_label),
    };
    match dates::diff_days(due, today) {
        0 => DueBadge {
            label: "D-1".to_string(),
            is_urgent: true,
            is_overdue: false,
        },
        -1 => DueBadge {
            label: "D-DAY".to_string(),
            is_urgent: true,
            is_overdue: false,
        },
        n if n < -1 => DueBadge {
            label: "OVER".to_string(),
            is_urgent: true,
            is_overdue: true,
        },
        _ => DueBadge::calm(server_label),
    }
}
