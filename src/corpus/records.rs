// Input records and the difficulty level encoded in item ids.

use std::fmt;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AlignError, Result};

/// One curriculum standard. Many standards share a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardRecord {
    pub domain: String,
    pub standard_text: String,
}

/// One test item with its difficulty level already parsed from the id.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub item_id: String,
    pub prompt: String,
    pub level: Level,
}

/// Item difficulty, encoded as a single `L`/`M`/`H` character in the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Low, Level::Medium, Level::High];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(Level::Low),
            "M" => Some(Level::Medium),
            "H" => Some(Level::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Extracts the difficulty level from item ids using a configurable pattern.
///
/// The first match of the pattern must be exactly one of `L`, `M`, `H`.
pub struct LevelParser {
    pattern: Regex,
}

impl LevelParser {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            AlignError::Config(format!("Invalid level pattern '{pattern}': {e}"))
        })?;
        Ok(Self { pattern })
    }

    pub fn parse(&self, item_id: &str) -> Result<Level> {
        self.pattern
            .find(item_id)
            .and_then(|m| Level::from_code(m.as_str()))
            .ok_or_else(|| {
                AlignError::Input(format!(
                    "Item '{item_id}' has no difficulty code (L, M or H) in its id"
                ))
            })
    }
}
