//! The closed set of commands the ledger accepts, and their results.

use crate::account::AccountRecord;
use crate::admin::{AccountSummary, AdminSession};
use crate::amount::Amount;
use crate::pin::Pin;

/// A fully-collected user request. Each variant maps to one ledger operation.
#[derive(Debug)]
pub enum Command<'a> {
    /// Open a new account for `name`.
    Create { name: String },

    /// Authenticate and show the current balance.
    ViewBalance { account_number: u32, pin: String },

    /// Credit `amount` to the account.
    Deposit {
        account_number: u32,
        pin: String,
        amount: Amount,
    },

    /// Debit `amount` from the account if the balance covers it.
    Withdraw {
        account_number: u32,
        pin: String,
        amount: Amount,
    },

    /// Replace the PIN. `new_pin` must equal `confirm_pin`.
    ChangePin {
        account_number: u32,
        pin: String,
        new_pin: String,
        confirm_pin: String,
    },

    /// Remove the account. Only `confirmation == "YES"` goes ahead.
    Delete {
        account_number: u32,
        pin: String,
        confirmation: String,
    },

    /// List every account. Requires an unlocked admin session.
    ListAccounts(&'a AdminSession),

    /// Stop the command loop.
    Exit,
}

/// Result of a successful [`Command`].
#[derive(Debug)]
pub enum Outcome {
    /// New account. The PIN is shown here once and never again.
    Created { account_number: u32, pin: Pin },

    /// Account state after a view, deposit, or withdrawal.
    Account(AccountRecord),

    PinChanged,

    Deleted(DeleteOutcome),

    Listing(Vec<AccountSummary>),

    Exit,
}

/// What a delete request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record was removed.
    Deleted,

    /// Confirmation was not `YES`; nothing changed.
    Cancelled,

    /// The record disappeared between authentication and removal.
    NotFound,
}
