//! Quality selection - maps a preference onto the engine's rendition ladder

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One rendition reported by the streaming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityLevel {
    /// Position in the engine's level list
    pub index: usize,
    /// Pixel height
    pub height: u32,
    /// Pixel width
    pub width: u32,
    /// Bitrate in bits per second
    pub bitrate: u64,
}

impl QualityLevel {
    pub fn new(index: usize, height: u32, width: u32, bitrate: u64) -> Self {
        Self { index, height, width, bitrate }
    }

    /// Display label, e.g. `720p`
    pub fn label(&self) -> String {
        format!("{}p", self.height)
    }

    /// Embedder-facing description of this level
    pub fn info(&self) -> QualityLevelInfo {
        QualityLevelInfo {
            index: self.index,
            height: self.height,
            width: self.width,
            bitrate: self.bitrate,
            label: self.label(),
        }
    }
}

/// Quality level as handed to embedders by `getQualityLevels`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityLevelInfo {
    pub index: usize,
    pub height: u32,
    pub width: u32,
    pub bitrate: u64,
    pub label: String,
}

/// Requested quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawPreference", into = "RawPreference")]
pub enum QualityPreference {
    /// Let the engine adapt
    #[default]
    Auto,
    /// Highest-indexed rendition
    High,
    /// Rendition at `floor(count / 2)`
    Medium,
    /// Lowest-indexed rendition
    Low,
    /// Rendition closest to this pixel height
    Height(u32),
}

impl QualityPreference {
    /// Build a preference from a numeric target height
    pub fn from_height(height: f64) -> Result<Self> {
        if !height.is_finite() || height < 1.0 || height > u32::MAX as f64 {
            return Err(Error::InvalidQuality(height.to_string()));
        }
        Ok(QualityPreference::Height(height.round() as u32))
    }
}

impl FromStr for QualityPreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "auto" => Ok(QualityPreference::Auto),
            "high" => Ok(QualityPreference::High),
            "medium" => Ok(QualityPreference::Medium),
            "low" => Ok(QualityPreference::Low),
            other => other
                .trim_end_matches('p')
                .parse::<u32>()
                .ok()
                .filter(|h| *h > 0)
                .map(QualityPreference::Height)
                .ok_or_else(|| Error::InvalidQuality(s.to_string())),
        }
    }
}

impl std::fmt::Display for QualityPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityPreference::Auto => write!(f, "auto"),
            QualityPreference::High => write!(f, "high"),
            QualityPreference::Medium => write!(f, "medium"),
            QualityPreference::Low => write!(f, "low"),
            QualityPreference::Height(h) => write!(f, "{}p", h),
        }
    }
}

/// Wire form: either a preset name or a bare height
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPreference {
    Height(f64),
    Name(String),
}

impl TryFrom<RawPreference> for QualityPreference {
    type Error = Error;

    fn try_from(raw: RawPreference) -> Result<Self> {
        match raw {
            RawPreference::Height(h) => QualityPreference::from_height(h),
            RawPreference::Name(name) => name.parse(),
        }
    }
}

impl From<QualityPreference> for RawPreference {
    fn from(pref: QualityPreference) -> Self {
        match pref {
            QualityPreference::Height(h) => RawPreference::Height(h as f64),
            other => RawPreference::Name(other.to_string()),
        }
    }
}

/// Outcome of resolving a preference against a level list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualitySelection {
    /// Engine adaptive mode
    Auto,
    /// Fixed rendition index
    Fixed(usize),
}

impl QualitySelection {
    /// Sentinel used by hls.js for adaptive mode
    pub const AUTO_LEVEL: i32 = -1;

    /// Value to assign to the engine's current level
    pub fn engine_level(&self) -> i32 {
        match self {
            QualitySelection::Auto => Self::AUTO_LEVEL,
            QualitySelection::Fixed(index) => *index as i32,
        }
    }
}

/// Resolve `preference` against `levels`.
///
/// Returns `None` while the engine has not reported any renditions.
/// Height matching picks the smallest absolute difference; on a tie the
/// lowest index wins.
pub fn resolve(levels: &[QualityLevel], preference: QualityPreference) -> Option<QualitySelection> {
    if levels.is_empty() {
        return None;
    }

    let selection = match preference {
        QualityPreference::Auto => QualitySelection::Auto,
        QualityPreference::High => QualitySelection::Fixed(levels.len() - 1),
        QualityPreference::Medium => QualitySelection::Fixed(levels.len() / 2),
        QualityPreference::Low => QualitySelection::Fixed(0),
        QualityPreference::Height(target) => {
            let mut best = 0;
            let mut best_diff = u64::MAX;
            for (i, level) in levels.iter().enumerate() {
                let diff = (level.height as i64 - target as i64).unsigned_abs();
                if diff < best_diff {
                    best = i;
                    best_diff = diff;
                }
            }
            QualitySelection::Fixed(best)
        }
    };

    Some(selection)
}
