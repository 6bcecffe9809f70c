//! Data models
//!
//! Row types persisted by the engine plus the derived report rows.
//! All IDs are UUIDv4 strings; timestamps are epoch milliseconds.

pub mod client;
pub mod order;
pub mod report;
pub mod settings;

// Re-exports
pub use client::*;
pub use order::*;
pub use report::*;
pub use settings::*;
