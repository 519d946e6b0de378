//! Per-channel delivery outcome records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::channel::Channel;

/// Outcome of the latest delivery attempt on a single channel.
///
/// Only the latest attempt is retained; tracking a new attempt replaces the
/// whole sub-record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDelivery {
    /// Whether the message was sent (or displayed, for in-app).
    #[serde(default)]
    pub sent: bool,
    /// When the successful attempt happened. Set only on success.
    pub sent_at: Option<DateTime<Utc>>,
    /// Transport error from a failed attempt.
    pub error: Option<String>,
}

impl ChannelDelivery {
    /// Record a successful delivery at the given instant.
    pub fn success(at: DateTime<Utc>) -> Self {
        Self {
            sent: true,
            sent_at: Some(at),
            error: None,
        }
    }

    /// Record a failed delivery.
    pub fn failure(error: Option<String>) -> Self {
        Self {
            sent: false,
            sent_at: None,
            error,
        }
    }
}

/// Delivery outcomes across all channels for one notification.
///
/// A channel with no attempt yet is absent (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryState {
    /// Email delivery outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<ChannelDelivery>,
    /// In-app delivery outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_app: Option<ChannelDelivery>,
    /// Slack delivery outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<ChannelDelivery>,
}

impl DeliveryState {
    /// The latest outcome for a channel, if any attempt was tracked.
    pub fn channel(&self, channel: Channel) -> Option<&ChannelDelivery> {
        match channel {
            Channel::Email => self.email.as_ref(),
            Channel::InApp => self.in_app.as_ref(),
            Channel::Slack => self.slack.as_ref(),
        }
    }

    /// Replace a channel's outcome wholesale.
    pub fn set(&mut self, channel: Channel, outcome: ChannelDelivery) {
        match channel {
            Channel::Email => self.email = Some(outcome),
            Channel::InApp => self.in_app = Some(outcome),
            Channel::Slack => self.slack = Some(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_prior_outcome() {
        let now = Utc::now();
        let mut state = DeliveryState::default();
        state.set(Channel::Email, ChannelDelivery::success(now));
        state.set(Channel::Email, ChannelDelivery::failure(Some("smtp 550".into())));

        let email = state.channel(Channel::Email).unwrap();
        assert!(!email.sent);
        assert_eq!(email.sent_at, None);
        assert_eq!(email.error.as_deref(), Some("smtp 550"));
        assert!(state.channel(Channel::Slack).is_none());
    }

    #[test]
    fn test_untracked_channels_not_serialized() {
        let mut state = DeliveryState::default();
        state.set(Channel::InApp, ChannelDelivery::success(Utc::now()));
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("in_app").is_some());
    }
}
