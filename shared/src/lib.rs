//! Shared types for the pedidos order tracker
//!
//! Domain models and the unified error system, consumed by the engine crate
//! and by any outer surface built on top of it.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
