//! # opshub-service
//!
//! Business logic layer for the Opshub notification subsystem. Routing
//! decisions are pure functions; the preference and notification services
//! orchestrate storage through the [`opshub_database::store`] traits.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod notification;
pub mod preference;
pub mod routing;

pub use notification::NotificationService;
pub use preference::{PreferenceService, PreferenceUpdate};
pub use routing::should_notify;
