//! # opshub-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations for the Opshub notification entities.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{NotificationStore, PreferenceStore};
