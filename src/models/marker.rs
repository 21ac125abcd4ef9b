//! Marker message grammar.
//!
//! The last bot message in the plan channel records which plan the messages
//! before it belong to and how many of them there are:
//!
//! ```text
//! BOT-MARKER:<day|ERROR>:<month|ERROR>:<count>:BOT-MARKER
//! ```

use std::fmt;

const TAG: &str = "BOT-MARKER";

/// Suffix identifying a marker message.
pub const MARKER_SUFFIX: &str = ":BOT-MARKER";

/// What the messages before a marker show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKey {
    /// The plan for this day and month
    Date { day: u32, month: u32 },
    /// An error announcement
    Error,
}

/// Decoded marker payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotMarker {
    pub key: MarkerKey,
    pub count: usize,
}

impl BotMarker {
    pub fn for_plan(day: u32, month: u32, count: usize) -> Self {
        Self {
            key: MarkerKey::Date { day, month },
            count,
        }
    }

    pub fn for_error(count: usize) -> Self {
        Self {
            key: MarkerKey::Error,
            count,
        }
    }

    /// Whether trimmed message content looks like a marker.
    pub fn is_marker(content: &str) -> bool {
        content.trim().ends_with(MARKER_SUFFIX)
    }

    /// Decode the marker from message content.
    ///
    /// Returns `None` unless the text from the first `BOT-MARKER:` onwards has
    /// exactly five colon-separated fields with numeric values.
    pub fn parse(content: &str) -> Option<Self> {
        let start = content.find("BOT-MARKER:")?;
        let parts: Vec<&str> = content[start..].trim().split(':').collect();
        if parts.len() != 5 || parts[0] != TAG || parts[4] != TAG {
            return None;
        }

        let count = parts[3].parse().ok()?;
        let key = if parts[1] == "ERROR" {
            MarkerKey::Error
        } else {
            MarkerKey::Date {
                day: parts[1].parse().ok()?,
                month: parts[2].parse().ok()?,
            }
        };

        Some(Self { key, count })
    }
}

impl fmt::Display for BotMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key {
            MarkerKey::Date { day, month } => {
                write!(f, "{TAG}:{day}:{month}:{}:{TAG}", self.count)
            }
            MarkerKey::Error => write!(f, "{TAG}:ERROR:ERROR:{}:{TAG}", self.count),
        }
    }
}
