//! Study cards and how they are read from a spreadsheet
//!
//! This module provides:
//! - The `Card` value object and its row mapping
//! - The chapter/section index used for navigation
//! - Card retrieval from the user's spreadsheet, provisioning it on first use

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::{CardStore, CardStoreError, LocalCardStore};
