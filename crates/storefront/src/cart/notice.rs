//! User-facing notices for failed cart operations.
//!
//! The store reports failures as [`CartStoreError`] values; the UI layer
//! turns them into one of four localized notices with [`Notice::for_failure`].

use std::fmt;

use super::CartStoreError;

/// The cart operation a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

/// A message shown to the user when a cart operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// The requested quantity exceeds the available stock.
    OutOfStock,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl Notice {
    /// Pick the notice for an error raised by `operation`.
    #[must_use]
    pub fn for_failure(operation: CartOperation, error: &CartStoreError) -> Self {
        if matches!(error, CartStoreError::StockExceeded { .. }) {
            return Self::OutOfStock;
        }

        match operation {
            CartOperation::Add => Self::AddFailed,
            CartOperation::Remove => Self::RemoveFailed,
            CartOperation::UpdateAmount => Self::UpdateFailed,
        }
    }

    /// Localized (pt-BR) message text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OutOfStock => "Quantidade solicitada fora de estoque",
            Self::AddFailed => "Erro na adição do produto",
            Self::RemoveFailed => "Erro na remoção do produto",
            Self::UpdateFailed => "Erro na alteração de quantidade do produto",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
