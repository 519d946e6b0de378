//! Delivery channel enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A delivery surface a notification may be sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Email delivery.
    Email,
    /// In-app notification center.
    InApp,
    /// Slack webhook message.
    Slack,
}

impl Channel {
    /// Every delivery channel.
    pub const ALL: [Channel; 3] = [Self::Email, Self::InApp, Self::Slack];

    /// Return the channel as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::InApp => "in_app",
            Self::Slack => "slack",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = opshub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "in_app" => Ok(Self::InApp),
            "slack" => Ok(Self::Slack),
            _ => Err(opshub_core::AppError::validation(format!(
                "Invalid channel: '{s}'. Expected one of: email, in_app, slack"
            ))),
        }
    }
}
