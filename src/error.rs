//! Error types for the bank ledger.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while operating on the ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to open, read, or write the account store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write the CSV account listing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration in {}: {}", .path.display(), .message)]
    Config { path: PathBuf, message: String },

    /// No record carries the requested account number
    #[error("Account {0} not found")]
    NotFound(u32),

    /// PIN digest did not match the stored digest
    #[error("Incorrect PIN")]
    InvalidPin,

    /// Amount was zero, negative, or not a number
    #[error("Invalid amount")]
    InvalidAmount,

    /// Withdrawal exceeds the current balance
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// New PIN is not exactly four ASCII digits
    #[error("PIN must be exactly 4 digits")]
    InvalidPinFormat,

    /// New PIN and its confirmation differ
    #[error("PINs don't match")]
    PinMismatch,

    /// Admin credentials rejected
    #[error("Access denied. Invalid admin credentials")]
    AdminAuth,

    /// Account holder name is empty, too long, or contains NUL bytes
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// A stored record could not be decoded
    #[error("Corrupt record at byte offset {offset}: {message}")]
    CorruptRecord { offset: u64, message: String },

    /// The account number space is used up
    #[error("No account numbers left to allocate")]
    AccountNumbersExhausted,
}

impl LedgerError {
    /// Returns `true` for validation failures the caller may answer by re-prompting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount
                | LedgerError::InsufficientFunds
                | LedgerError::InvalidPinFormat
                | LedgerError::PinMismatch
        )
    }
}
