//! Notification type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The event kind a notification was produced for.
///
/// The set is closed: preference maps key on it and routing matches on it
/// exhaustively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A task was assigned to the recipient.
    TaskAssigned,
    /// A task the recipient follows was completed.
    TaskCompleted,
    /// A comment was added on a followed entity.
    CommentAdded,
    /// The recipient was @-mentioned.
    Mention,
    /// A deadline is approaching.
    DeadlineApproaching,
    /// A project milestone was reached.
    MilestoneReached,
    /// Team membership changed.
    TeamChange,
    /// A tracked entity changed status.
    StatusChange,
    /// A project risk was flagged.
    RiskAlert,
    /// A system-level alert.
    SystemAlert,
    /// A project update was published.
    ProjectUpdate,
}

impl NotificationType {
    /// Every notification type, in declaration order.
    pub const ALL: [NotificationType; 11] = [
        Self::TaskAssigned,
        Self::TaskCompleted,
        Self::CommentAdded,
        Self::Mention,
        Self::DeadlineApproaching,
        Self::MilestoneReached,
        Self::TeamChange,
        Self::StatusChange,
        Self::RiskAlert,
        Self::SystemAlert,
        Self::ProjectUpdate,
    ];

    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::TaskCompleted => "task_completed",
            Self::CommentAdded => "comment_added",
            Self::Mention => "mention",
            Self::DeadlineApproaching => "deadline_approaching",
            Self::MilestoneReached => "milestone_reached",
            Self::TeamChange => "team_change",
            Self::StatusChange => "status_change",
            Self::RiskAlert => "risk_alert",
            Self::SystemAlert => "system_alert",
            Self::ProjectUpdate => "project_update",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = opshub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_assigned" => Ok(Self::TaskAssigned),
            "task_completed" => Ok(Self::TaskCompleted),
            "comment_added" => Ok(Self::CommentAdded),
            "mention" => Ok(Self::Mention),
            "deadline_approaching" => Ok(Self::DeadlineApproaching),
            "milestone_reached" => Ok(Self::MilestoneReached),
            "team_change" => Ok(Self::TeamChange),
            "status_change" => Ok(Self::StatusChange),
            "risk_alert" => Ok(Self::RiskAlert),
            "system_alert" => Ok(Self::SystemAlert),
            "project_update" => Ok(Self::ProjectUpdate),
            _ => Err(opshub_core::AppError::validation(format!(
                "Invalid notification type: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_types() {
        for kind in NotificationType::ALL {
            assert_eq!(kind.as_str().parse::<NotificationType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_invalid_type_rejected() {
        assert!("task-assigned".parse::<NotificationType>().is_err());
        assert!("".parse::<NotificationType>().is_err());
    }
}
