use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;
use crate::utils::dates;

/// Assignment category. The collaborator stores the numeric code; some
/// endpoints echo it back as a JSON string, so decoding accepts both forms.
/// Codes outside the known set are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Assignment,
    Lecture,
    Todo,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Assignment, Category::Lecture, Category::Todo];

    pub fn code(self) -> u8 {
        match self {
            Category::Assignment => 0,
            Category::Lecture => 1,
            Category::Todo => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Category::Assignment),
            1 => Some(Category::Lecture),
            2 => Some(Category::Todo),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Assignment => "assignment",
            Category::Lecture => "lecture",
            Category::Todo => "todo",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Assignment
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Category::from_code(code).ok_or_else(|| format!("unknown category code: {code}"));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "assignment" => Ok(Category::Assignment),
            "lecture" => Ok(Category::Lecture),
            "todo" => Ok(Category::Todo),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Text(String),
        }

        let code = match Raw::deserialize(deserializer)? {
            Raw::Code(n) => n,
            Raw::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("category code is not numeric: {s:?}")))?,
        };
        Category::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown category code: {code}")))
    }
}

/// One normalized assignment row. `due_date` is the canonical day-string
/// when the raw server text contained one, otherwise the raw text as-is.
/// `sub_name` holds the resolved display name after normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub assign_id: i64,
    pub assign_name: String,
    pub due_date: String,
    pub category: Category,
    pub is_complete: bool,
    pub sub_id: Option<i64>,
    pub sub_name: Option<String>,
    pub due_label: Option<String>,
}

/// Client-side form state for creating or editing an assignment.
/// `assign_id` is `None` for a create.
#[derive(Debug, Clone, Default)]
pub struct AssignmentDraft {
    pub assign_id: Option<i64>,
    pub sub_id: Option<i64>,
    pub assign_name: String,
    pub due_date: String,
    pub category: Category,
}

impl AssignmentDraft {
    /// Checked before any network call; a draft that fails here is never
    /// sent to the server.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.assign_name.trim().is_empty() {
            return Err(ValidationError::Missing("assignment name"));
        }
        if dates::parse_day(&self.due_date).is_none() {
            return Err(ValidationError::InvalidDate("due date"));
        }
        if self.assign_id.is_none() && self.sub_id.is_none() {
            return Err(ValidationError::Missing("subject"));
        }
        Ok(())
    }
}
