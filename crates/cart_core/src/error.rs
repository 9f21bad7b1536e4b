//! Failures surfaced by cart operations and the notices shown for them.

use shared::{
    domain::ItemId,
    error::{ErrorCode, QuantityError},
};
use storage::CorruptCart;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),
    #[error("no cart item with id {0}")]
    ItemNotFound(ItemId),
    #[error("Your cart is empty!")]
    EmptyCart,
    #[error(transparent)]
    CorruptCart(CorruptCart),
    #[error("cart storage failed: {0:#}")]
    Storage(anyhow::Error),
}

impl CartError {
    pub fn from_storage(err: anyhow::Error) -> Self {
        match err.downcast::<CorruptCart>() {
            Ok(corrupt) => Self::CorruptCart(corrupt),
            Err(err) => Self::Storage(err),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidQuantity(err) => err.code(),
            Self::ItemNotFound(_) => ErrorCode::NotFound,
            Self::EmptyCart => ErrorCode::EmptyCart,
            Self::CorruptCart(_) => ErrorCode::CorruptState,
            Self::Storage(_) => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-facing feedback. The presentation layer decides whether this becomes
/// a toast, an inline message or a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub code: Option<ErrorCode>,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            code: None,
            message: message.into(),
        }
    }
}

impl From<&CartError> for Notice {
    fn from(err: &CartError) -> Self {
        let level = match err {
            CartError::InvalidQuantity(_) | CartError::EmptyCart => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        Self {
            level,
            code: Some(err.code()),
            message: err.to_string(),
        }
    }
}
