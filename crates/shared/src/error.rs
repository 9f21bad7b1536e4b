use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    EmptyCart,
    CorruptState,
    Unavailable,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("Quantity must be a number (got '{input}')")]
    NotANumber { input: String },
    #[error("Quantity cannot be less than 1")]
    BelowMinimum { value: i64 },
    #[error("Quantity {value} is too large")]
    OutOfRange { value: i64 },
}

impl QuantityError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Validation
    }
}
