//! Anticipatory Action Triggers common types and errors.
//!
//! This crate provides foundational types shared across aat-core modules:
//! - Structured error types with stable codes
//! - Output format specifications
//! - Schema versioning for output payloads

pub mod error;
pub mod output;
pub mod schema;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
