//! Core type definitions used across the Opshub workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
