//! Manager errors

use crate::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Command rejection and failure reasons
///
/// Validation variants are rejected-command outcomes with a user-facing
/// message; nothing was written when one is returned. `Storage` means the
/// underlying store call failed and the operation must be considered
/// not-completed.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Client name is required")]
    ClientNameRequired,

    #[error("At least one line item is required")]
    EmptyItems,

    #[error("Every line item needs a flavor and a quantity greater than zero")]
    InvalidLineItem,

    #[error("Cost and sale per dozen must be zero or greater")]
    NegativePricing,
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl ManagerError {
    /// True for rejected-command outcomes (nothing was persisted)
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                tracing::error!(error = %e, "Storage error during command");
                AppError::database(e.to_string())
            }
            ManagerError::ClientNameRequired => {
                AppError::with_message(ErrorCode::RequiredField, err.to_string())
            }
            ManagerError::EmptyItems => {
                AppError::with_message(ErrorCode::EmptyOrder, err.to_string())
            }
            ManagerError::InvalidLineItem => {
                AppError::with_message(ErrorCode::InvalidLineItem, err.to_string())
            }
            ManagerError::NegativePricing => {
                AppError::with_message(ErrorCode::ValueOutOfRange, err.to_string())
            }
        }
    }
}
