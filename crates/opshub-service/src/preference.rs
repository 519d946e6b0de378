//! Preference resolution and partial updates.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use opshub_core::error::{AppError, ErrorKind};
use opshub_core::result::AppResult;
use opshub_database::store::PreferenceStore;
use opshub_entity::notification::preference::{ChannelPreference, DigestFrequency};
use opshub_entity::notification::{Importance, NotificationPreference, NotificationType};

/// Manages the one-per-user preference record.
#[derive(Clone)]
pub struct PreferenceService {
    /// Preference storage backend.
    store: Arc<dyn PreferenceStore>,
}

/// Caller-supplied partial update. Only the fields present here can be
/// changed; anything else in the payload is ignored by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceUpdate {
    /// Email channel changes.
    pub email: Option<EmailUpdate>,
    /// In-app channel changes.
    pub in_app: Option<ChannelUpdate>,
    /// Slack channel changes.
    pub slack: Option<SlackUpdate>,
    /// Do-not-disturb changes.
    pub dnd: Option<DndUpdate>,
}

/// Partial update for the settings shared by every channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelUpdate {
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// Per-type flags to overwrite. Keys absent here keep their value.
    pub types: Option<BTreeMap<NotificationType, bool>>,
    /// New importance threshold.
    pub minimum_importance: Option<Importance>,
}

/// Partial update for the email channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailUpdate {
    /// Shared channel changes.
    #[serde(flatten)]
    pub channel: ChannelUpdate,
    /// New digest frequency.
    pub digest_frequency: Option<DigestFrequency>,
    /// New digest send time ("HH:MM").
    pub digest_time: Option<String>,
}

/// Partial update for the slack channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackUpdate {
    /// Shared channel changes.
    #[serde(flatten)]
    pub channel: ChannelUpdate,
    /// New webhook target. A payload that omits the field keeps the
    /// current value; an explicit `null` clears it.
    #[serde(
        default,
        deserialize_with = "clearable",
        skip_serializing_if = "Option::is_none"
    )]
    pub webhook_url: Option<Option<String>>,
}

/// Deserializes a field where `null` means "clear" rather than "keep".
/// Field absence is handled by `#[serde(default)]` and stays `None`.
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Partial update for the do-not-disturb window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DndUpdate {
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New window start ("HH:MM").
    pub start: Option<String>,
    /// New window end ("HH:MM").
    pub end: Option<String>,
    /// New IANA timezone name.
    pub timezone: Option<String>,
}

impl PreferenceService {
    /// Creates a new preference service.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Gets the preference record for a user, creating it from defaults on
    /// first access.
    ///
    /// Two concurrent first accesses may both attempt the insert; the
    /// storage unique constraint rejects the loser, which then re-reads the
    /// winner's row. Both writers carry identical defaults, so the race has
    /// no observable outcome beyond the discarded duplicate.
    pub async fn get_or_create(&self, user_id: Uuid) -> AppResult<NotificationPreference> {
        if let Some(prefs) = self.store.find_by_user(user_id).await? {
            return Ok(prefs);
        }

        let defaults = NotificationPreference::default_for_user(user_id);
        match self.store.insert(&defaults).await {
            Ok(created) => {
                info!(user_id = %user_id, "Bootstrapped default notification preferences");
                Ok(created)
            }
            Err(e) if e.is_kind(ErrorKind::Conflict) => {
                self.store.find_by_user(user_id).await?.ok_or_else(|| {
                    AppError::internal("Preference record missing after insert conflict")
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Merges an allow-listed partial update into the user's record (after
    /// bootstrapping it if needed) and persists the result.
    pub async fn update(
        &self,
        user_id: Uuid,
        update: PreferenceUpdate,
    ) -> AppResult<NotificationPreference> {
        validate_update(&update)?;

        let mut prefs = self.get_or_create(user_id).await?;

        if let Some(email) = update.email {
            merge_channel(&mut prefs.email.channel, email.channel);
            if let Some(freq) = email.digest_frequency {
                prefs.email.digest_frequency = freq;
            }
            if let Some(time) = email.digest_time {
                prefs.email.digest_time = time;
            }
        }
        if let Some(in_app) = update.in_app {
            merge_channel(&mut prefs.in_app, in_app);
        }
        if let Some(slack) = update.slack {
            merge_channel(&mut prefs.slack.channel, slack.channel);
            if let Some(url) = slack.webhook_url {
                prefs.slack.webhook_url = url;
            }
        }
        if let Some(dnd) = update.dnd {
            if let Some(enabled) = dnd.enabled {
                prefs.dnd.enabled = enabled;
            }
            if let Some(start) = dnd.start {
                prefs.dnd.start = start;
            }
            if let Some(end) = dnd.end {
                prefs.dnd.end = end;
            }
            if let Some(timezone) = dnd.timezone {
                prefs.dnd.timezone = timezone;
            }
        }

        let saved = self.store.update(&prefs).await?;
        info!(user_id = %user_id, "Notification preferences updated");
        Ok(saved)
    }
}

/// Merge a channel update into the stored block. Supplied type flags
/// overwrite per key; everything else is untouched.
fn merge_channel(target: &mut ChannelPreference, update: ChannelUpdate) {
    if let Some(enabled) = update.enabled {
        target.enabled = enabled;
    }
    if let Some(types) = update.types {
        target.types.extend(types);
    }
    if let Some(minimum) = update.minimum_importance {
        target.minimum_importance = minimum;
    }
}

/// Reject malformed clock and timezone strings so stored records stay
/// well-formed.
fn validate_update(update: &PreferenceUpdate) -> AppResult<()> {
    if let Some(email) = &update.email {
        if let Some(time) = &email.digest_time {
            validate_clock(time, "digest_time")?;
        }
    }
    if let Some(dnd) = &update.dnd {
        if let Some(start) = &dnd.start {
            validate_clock(start, "dnd.start")?;
        }
        if let Some(end) = &dnd.end {
            validate_clock(end, "dnd.end")?;
        }
        if let Some(timezone) = &dnd.timezone {
            timezone.parse::<chrono_tz::Tz>().map_err(|_| {
                AppError::validation(format!("Unknown timezone: '{timezone}'"))
            })?;
        }
    }
    Ok(())
}

fn validate_clock(value: &str, field: &str) -> AppResult<()> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| AppError::validation(format!("{field} must be 'HH:MM', got '{value}'")))
}
