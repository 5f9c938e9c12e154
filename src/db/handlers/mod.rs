//! Repository implementations for database access.

pub mod history;

pub use history::History;
