//! Shared infrastructure for the Routes4Life backend
//!
//! This crate provides the pieces used by every service in the workspace:
//! PostgreSQL connection pooling and the shared database error type.

pub mod database;
pub mod error;
