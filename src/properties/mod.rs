//! Per-user key-value properties
//!
//! Each user's properties live in one JSON object on disk. Multi-key updates
//! are written in a single replace, so readers never see half of an update.

mod models;
mod storage;

pub use models::StoreLocation;
pub use storage::{PropertyError, PropertyStore, Result, UserProperties};
