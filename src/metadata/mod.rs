// Metadata extraction module

pub mod ffprobe;
pub mod nfo;

use serde::{Deserialize, Serialize};

/// Candidate values produced by one metadata source.
///
/// Both the descriptor reader and the tag reader return this shape; fields a
/// source does not supply are simply None. Readers normalize empty and
/// whitespace-only strings to None so the resolver only ever sees usable
/// candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldValues {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub year: Option<String>,
    pub duration_seconds: Option<i64>,
}

impl FieldValues {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.instructor.is_none()
            && self.year.is_none()
            && self.duration_seconds.is_none()
    }
}

/// Normalize a raw string value: trimmed, empty mapped to None.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
