//! Shared infrastructure for the Clipshelf services
//!
//! This crate provides the pieces every service needs regardless of what it
//! does with media: PostgreSQL connection pooling and the database error
//! type. Service-specific concerns (auth, storage, HTTP) live in the service
//! crates themselves.

pub mod database;
pub mod error;
