//! Database layer for analysis history persistence.
//!
//! A thin repository layer over SQLx and PostgreSQL:
//!
//! - [`handlers`]: repository implementation for the history table
//! - [`models`]: database record structures matching the table schema
//! - [`errors`]: database-specific error types
//!
//! The database is optional at runtime. When no connection is configured the
//! service runs without persistence: analyze requests still succeed, history
//! endpoints report the capability as unavailable.

pub mod errors;
pub mod handlers;
pub mod models;
