// Recoverable input errors
// Everything here is handled by re-prompting; storage failures stay in anyhow.

use thiserror::Error;

/// Errors produced while turning user text into typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid date '{0}', expected MM/DD/YYYY")]
    InvalidDate(String),

    #[error("malformed command '{0}', expected \"category startdate (enddate)\" or \"category all\"")]
    MalformedCommand(String),

    #[error("invalid amount '{0}', expected a whole number")]
    InvalidAmount(String),

    /// User typed the abort sentinel.
    #[error("operation cancelled")]
    Cancelled,
}

pub type InputResult<T> = std::result::Result<T, InputError>;
