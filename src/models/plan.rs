//! Parsed substitution plan.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alternating biweekly schedule designator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Week {
    #[default]
    A,
    B,
}

impl Week {
    /// `a`/`b` in either case; anything else is week A.
    pub fn from_letter(letter: char) -> Self {
        match letter.to_ascii_lowercase() {
            'b' => Week::B,
            _ => Week::A,
        }
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Week::A => write!(f, "A"),
            Week::B => write!(f, "B"),
        }
    }
}

/// Date information from the document header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub year_one: u32,
    pub year_two: u32,
    pub day_numerical: u32,
    pub month_numerical: u32,
    pub day_name: String,
    pub week: Week,
}

/// Supervising class and teacher for this and next week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProperService {
    pub class_this_week: String,
    pub teacher_this_week: String,
    pub class_next_week: String,
    pub teacher_next_week: String,
}

/// Class putting up the chairs after the fourth block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairService {
    pub class: String,
    pub subject: String,
    pub teacher: String,
}

/// One substitution entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRow {
    /// Lesson slot label as printed, e.g. "3" or "5-6"
    pub lessons: String,
    /// Comma-joined affected classes
    pub classes: String,
    pub orig_subject: String,
    pub orig_teacher: String,
    pub new_subject: String,
    pub new_teacher: String,
    pub room: String,
    pub info: String,
}

impl LessonRow {
    /// Affected classes, trimmed, in document order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// The parsed plan for one school day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInformation {
    pub time_info: TimeInfo,
    pub proper_service: ProperService,
    pub chair_service: ChairService,
    pub extra_text: String,
    pub absent_teachers: Vec<String>,
    pub lessons: Vec<LessonRow>,
    /// Archived copy of the source document, if one was written
    pub pdf_path: Option<PathBuf>,
    pub processed_at: DateTime<Utc>,
    /// Raw input lines, kept for debugging layout drift
    pub debug_text: Vec<String>,
}

impl TableInformation {
    pub fn new() -> Self {
        Self {
            time_info: TimeInfo::default(),
            proper_service: ProperService::default(),
            chair_service: ChairService::default(),
            extra_text: String::new(),
            absent_teachers: Vec::new(),
            lessons: Vec::new(),
            pdf_path: None,
            processed_at: Utc::now(),
            debug_text: Vec::new(),
        }
    }

    /// Day and month the plan is for.
    pub fn date_key(&self) -> (u32, u32) {
        (self.time_info.day_numerical, self.time_info.month_numerical)
    }
}

impl Default for TableInformation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_letter_defaults_to_a() {
        assert_eq!(Week::from_letter('a'), Week::A);
        assert_eq!(Week::from_letter('B'), Week::B);
        assert_eq!(Week::from_letter('x'), Week::A);
    }

    #[test]
    fn class_names_split_and_trim() {
        let row = LessonRow {
            classes: "7A, 7B,,8C".into(),
            ..LessonRow::default()
        };
        assert_eq!(row.class_names().collect::<Vec<_>>(), vec!["7A", "7B", "8C"]);
    }
}
