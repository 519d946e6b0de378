//! Repository implementations for Opshub entities.

pub mod notification;
pub mod preference;

pub use notification::NotificationRepository;
pub use preference::PreferenceRepository;
