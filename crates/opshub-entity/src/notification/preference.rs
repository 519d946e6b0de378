//! Notification preference entity.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::channel::Channel;
use super::importance::Importance;
use super::kind::NotificationType;

/// Per-user notification delivery preferences.
///
/// Exactly one record exists per user (enforced by a unique constraint);
/// absent records are synthesized from [`NotificationPreference::default_for_user`]
/// on first access.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationPreference {
    /// The user these preferences belong to.
    pub user_id: Uuid,
    /// Email channel settings.
    pub email: Json<EmailPreference>,
    /// In-app channel settings.
    pub in_app: Json<ChannelPreference>,
    /// Slack channel settings.
    pub slack: Json<SlackPreference>,
    /// Do-not-disturb window.
    pub dnd: Json<DndWindow>,
    /// When preferences were last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Settings shared by every delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPreference {
    /// Whether the channel is enabled at all.
    pub enabled: bool,
    /// Per-type opt-in flags. A type absent from the map is treated as off.
    #[serde(default)]
    pub types: BTreeMap<NotificationType, bool>,
    /// Lowest importance level allowed through this channel.
    #[serde(default)]
    pub minimum_importance: Importance,
}

/// Email channel settings: the shared block plus digest scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPreference {
    /// Shared channel settings.
    #[serde(flatten)]
    pub channel: ChannelPreference,
    /// How often digest emails are batched.
    #[serde(default)]
    pub digest_frequency: DigestFrequency,
    /// Local clock time ("HH:MM") digests are sent at.
    #[serde(default = "default_digest_time")]
    pub digest_time: String,
}

/// Slack channel settings: the shared block plus the webhook target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackPreference {
    /// Shared channel settings.
    #[serde(flatten)]
    pub channel: ChannelPreference,
    /// Incoming-webhook URL messages are posted to.
    pub webhook_url: Option<String>,
}

/// How often email digests are batched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestFrequency {
    /// No batching, send each notification as it happens.
    Immediate,
    /// One digest per day.
    #[default]
    Daily,
    /// One digest per week.
    Weekly,
}

/// A recurring local-time window during which deliveries are suppressed.
///
/// `start`/`end` are "HH:MM" local clock values in `timezone`; a window
/// with `start > end` crosses midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DndWindow {
    /// Whether the window is active.
    pub enabled: bool,
    /// Window start, "HH:MM".
    pub start: String,
    /// Window end, "HH:MM".
    pub end: String,
    /// IANA timezone name the clock values are interpreted in.
    pub timezone: String,
}

impl Default for DndWindow {
    fn default() -> Self {
        Self {
            enabled: false,
            start: "22:00".to_string(),
            end: "08:00".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

impl ChannelPreference {
    /// Documented defaults for a channel.
    ///
    /// Email and in-app opt into most types; slack starts fully opted out
    /// until the user configures a webhook. Minimum importance is low for
    /// email and in-app, medium for slack.
    pub fn defaults_for(channel: Channel) -> Self {
        let types = NotificationType::ALL
            .into_iter()
            .map(|kind| (kind, default_type_flag(channel, kind)))
            .collect();
        Self {
            enabled: !matches!(channel, Channel::Slack),
            types,
            minimum_importance: match channel {
                Channel::Email | Channel::InApp => Importance::Low,
                Channel::Slack => Importance::Medium,
            },
        }
    }
}

/// Default per-type opt-in flag for a channel.
///
/// High-volume, digest-worthy traffic stays off email by default; in-app
/// receives everything; slack receives nothing until opted in.
fn default_type_flag(channel: Channel, kind: NotificationType) -> bool {
    match channel {
        Channel::Email => !matches!(
            kind,
            NotificationType::TaskCompleted | NotificationType::ProjectUpdate
        ),
        Channel::InApp => true,
        Channel::Slack => false,
    }
}

impl NotificationPreference {
    /// Create default preferences for a user.
    pub fn default_for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: Json(EmailPreference {
                channel: ChannelPreference::defaults_for(Channel::Email),
                digest_frequency: DigestFrequency::default(),
                digest_time: default_digest_time(),
            }),
            in_app: Json(ChannelPreference::defaults_for(Channel::InApp)),
            slack: Json(SlackPreference {
                channel: ChannelPreference::defaults_for(Channel::Slack),
                webhook_url: None,
            }),
            dnd: Json(DndWindow::default()),
            updated_at: Some(Utc::now()),
        }
    }

    /// The shared settings block for a channel.
    pub fn channel(&self, channel: Channel) -> &ChannelPreference {
        match channel {
            Channel::Email => &self.email.channel,
            Channel::InApp => &self.in_app.0,
            Channel::Slack => &self.slack.channel,
        }
    }

    /// Mutable access to the shared settings block for a channel.
    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelPreference {
        match channel {
            Channel::Email => &mut self.email.channel,
            Channel::InApp => &mut self.in_app.0,
            Channel::Slack => &mut self.slack.channel,
        }
    }
}

fn default_digest_time() -> String {
    "09:00".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel_enablement() {
        let prefs = NotificationPreference::default_for_user(Uuid::new_v4());
        assert!(prefs.channel(Channel::Email).enabled);
        assert!(prefs.channel(Channel::InApp).enabled);
        assert!(!prefs.channel(Channel::Slack).enabled);
    }

    #[test]
    fn test_default_minimum_importance() {
        let prefs = NotificationPreference::default_for_user(Uuid::new_v4());
        assert_eq!(
            prefs.channel(Channel::Email).minimum_importance,
            Importance::Low
        );
        assert_eq!(
            prefs.channel(Channel::Slack).minimum_importance,
            Importance::Medium
        );
    }

    #[test]
    fn test_default_type_table() {
        let prefs = NotificationPreference::default_for_user(Uuid::new_v4());
        for kind in NotificationType::ALL {
            assert_eq!(prefs.channel(Channel::InApp).types[&kind], true);
            assert_eq!(prefs.channel(Channel::Slack).types[&kind], false);
        }
        let email = prefs.channel(Channel::Email);
        assert!(!email.types[&NotificationType::TaskCompleted]);
        assert!(!email.types[&NotificationType::ProjectUpdate]);
        assert!(email.types[&NotificationType::Mention]);
        assert!(email.types[&NotificationType::RiskAlert]);
    }

    #[test]
    fn test_email_preference_flattens() {
        let prefs = NotificationPreference::default_for_user(Uuid::new_v4());
        let json = serde_json::to_value(&prefs.email.0).unwrap();
        assert_eq!(json["enabled"], true);
        assert_eq!(json["digest_frequency"], "daily");
        let back: EmailPreference = serde_json::from_value(json).unwrap();
        assert_eq!(back, prefs.email.0);
    }
}
