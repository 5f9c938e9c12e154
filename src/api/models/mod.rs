//! Wire types for the HTTP API.

pub mod analyze;
pub mod history;
pub mod pagination;
