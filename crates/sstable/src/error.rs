//! Error type for the block read path.
//!
//! Every failure in this crate is a [`Error::Corruption`]: the bytes handed
//! to us do not follow the block format. Callers see it through an
//! iterator's `status()` rather than as a panic.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while decoding block contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The block (or one of its entries) is structurally malformed.
    #[error("corruption: {0}")]
    Corruption(String),
}

impl Error {
    /// Shorthand for building a [`Error::Corruption`].
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Returns `true` if this error reports corrupt data.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }
}
