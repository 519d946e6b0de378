//! Routing decision engine.
//!
//! Pure predicate over a resolved preference record: decides whether a
//! notification should go out on a given channel. Callers remain
//! responsible for invoking the transport and recording the outcome.

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use opshub_entity::notification::preference::DndWindow;
use opshub_entity::notification::{Channel, Importance, NotificationPreference, NotificationType};

/// Decide whether to deliver a notification on a channel.
///
/// Gates are checked in order, short-circuiting on the first suppression:
/// channel enabled, per-type opt-in (absent types are off), importance
/// threshold, do-not-disturb window. The DND gate applies to every channel
/// and every importance level, urgent included.
pub fn should_notify(
    prefs: &NotificationPreference,
    notification_type: NotificationType,
    channel: Channel,
    importance: Importance,
    now: DateTime<Utc>,
) -> bool {
    let settings = prefs.channel(channel);

    if !settings.enabled {
        return false;
    }
    if !settings
        .types
        .get(&notification_type)
        .copied()
        .unwrap_or(false)
    {
        return false;
    }
    if !importance.meets(settings.minimum_importance) {
        return false;
    }
    if in_dnd_window(&prefs.dnd, now) {
        return false;
    }

    true
}

/// Whether the given instant falls inside an active DND window.
///
/// Clock values are interpreted in the window's timezone; an unparseable
/// timezone falls back to UTC, and malformed "HH:MM" strings never match
/// (both fail open for delivery). Bounds are inclusive; a window with
/// `start > end` crosses midnight.
pub fn in_dnd_window(dnd: &DndWindow, now: DateTime<Utc>) -> bool {
    if !dnd.enabled {
        return false;
    }

    let (Some(start), Some(end)) = (parse_clock(&dnd.start), parse_clock(&dnd.end)) else {
        return false;
    };

    let tz: Tz = dnd.timezone.parse().unwrap_or(chrono_tz::UTC);
    let local = now.with_timezone(&tz).time();

    if start <= end {
        start <= local && local <= end
    } else {
        local >= start || local <= end
    }
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}
