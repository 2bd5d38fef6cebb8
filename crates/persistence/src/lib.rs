//! Persistence layer for the report service.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Postgres implementations of the report pipeline collaborators

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
