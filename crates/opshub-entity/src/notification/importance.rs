//! Notification importance levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal severity of a notification.
///
/// The order `Low < Medium < High < Urgent` is relied on for every
/// threshold comparison; never compare the string forms.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[sqlx(type_name = "importance_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Background information.
    Low,
    /// Standard events.
    #[default]
    Medium,
    /// Important events.
    High,
    /// Requires immediate attention.
    Urgent,
}

impl Importance {
    /// Every importance level, lowest first.
    pub const ALL: [Importance; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    /// Return the ordinal rank (higher = more severe).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }

    /// Whether this level meets the given threshold.
    pub fn meets(&self, threshold: Importance) -> bool {
        self.rank() >= threshold.rank()
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Importance {
    type Err = opshub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(opshub_core::AppError::validation(format!(
                "Invalid importance: '{s}'. Expected one of: low, medium, high, urgent"
            ))),
        }
    }
}
