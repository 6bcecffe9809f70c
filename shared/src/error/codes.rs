//! Unified error codes for the pedidos order tracker
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with any frontend built on the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no line items
    EmptyOrder = 4002,
    /// A line item has a blank flavor or non-positive quantity
    InvalidLineItem = 4003,
    /// Order is already in a terminal status
    OrderAlreadyClosed = 4004,

    // ==================== 9xxx: System ====================
    /// Database/storage failure
    DatabaseError = 9001,
    /// Internal error
    InternalError = 9002,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",
            Self::OrderNotFound => "Order not found",
            Self::EmptyOrder => "Order has no line items",
            Self::InvalidLineItem => "Invalid line item",
            Self::OrderAlreadyClosed => "Order is already delivered or cancelled",
            Self::DatabaseError => "Database error",
            Self::InternalError => "Internal error",
        }
    }

    /// Numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when deserializing an unknown numeric code
#[derive(Debug, Clone, Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            7 => Ok(Self::RequiredField),
            8 => Ok(Self::ValueOutOfRange),
            4001 => Ok(Self::OrderNotFound),
            4002 => Ok(Self::EmptyOrder),
            4003 => Ok(Self::InvalidLineItem),
            4004 => Ok(Self::OrderAlreadyClosed),
            9001 => Ok(Self::DatabaseError),
            9002 => Ok(Self::InternalError),
            other => Err(InvalidErrorCode(other)),
        }
    }
}
