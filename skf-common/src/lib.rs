//! # SketchFactor Common Library
//!
//! Shared code for the SketchFactor reputation engine:
//! - Database schema, models, and initialization
//! - Error taxonomy shared across crates
//! - Configuration loading and root folder resolution
//! - Slug derivation for organization names

pub mod config;
pub mod db;
pub mod error;
pub mod slug;

pub use error::{Error, Result};
