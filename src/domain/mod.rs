//! Domain layer for UX Audit
//!
//! Domain Model - Pure outcome types for a single page audit
//! - Contains the report aggregate, per-rule outcomes and the crate error type
//! - Independent of HTTP, HTML parsing and terminal concerns

pub mod outcomes;

// Re-export main domain types for convenience
pub use outcomes::*;
