//! Shared types, errors, and configuration for Kassa.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list operations
//! - The error-kind taxonomy every module error classifies into
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::ErrorKind;
