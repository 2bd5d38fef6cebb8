//! Shared utilities and common types for the report service.
//!
//! This crate provides common functionality used across all other crates:
//! - Text helpers (CSV escaping, filename and sheet-name sanitizing)
//! - Common validation logic

pub mod text;
pub mod validation;
