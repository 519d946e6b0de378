//! Notification domain entities.

pub mod channel;
pub mod delivery;
pub mod importance;
pub mod kind;
pub mod model;
pub mod preference;
pub mod reference;

pub use channel::Channel;
pub use delivery::{ChannelDelivery, DeliveryState};
pub use importance::Importance;
pub use kind::NotificationType;
pub use model::{NewNotification, Notification};
pub use preference::{
    ChannelPreference, DigestFrequency, DndWindow, EmailPreference, NotificationPreference,
    SlackPreference,
};
pub use reference::{EntityRef, RefKind};
