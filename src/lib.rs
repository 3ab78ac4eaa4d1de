//! # Bank Ledger
//!
//! A single-operator banking ledger: accounts are opened, authenticated by
//! account number and PIN, and mutated by deposits, withdrawals, PIN changes,
//! and deletions against a file-backed record store.
//!
//! ## Design Principles
//!
//! - **Fixed-width records**: the store is a flat file with a constant stride
//! - **Whole-file replace**: every mutation rewrites a temp file and renames it
//!   over the store
//! - **No plaintext PINs**: only digests from a pluggable [`PinHasher`] are kept
//! - **Explicit admin sessions**: the listing requires an [`AdminSession`] value
//!
//! ## Example
//!
//! ```no_run
//! use bank_ledger::{Amount, Ledger, RecordStore};
//! use std::str::FromStr;
//!
//! let ledger = Ledger::new(RecordStore::open("accounts.dat"));
//! let (number, pin) = ledger.create("Alice").unwrap();
//! let account = ledger
//!     .deposit(number, pin.as_str(), Amount::from_str("500").unwrap())
//!     .unwrap();
//! assert_eq!(account.balance.to_string(), "500.00");
//! ```

pub mod account;
pub mod admin;
pub mod amount;
pub mod auth;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod ledger;
pub mod pin;
pub mod store;

pub use account::{AccountName, AccountRecord, RECORD_LEN};
pub use admin::{write_listing, AccountSummary, AdminCredentials, AdminSession};
pub use amount::Amount;
pub use auth::AuthGate;
pub use command::{Command, DeleteOutcome, Outcome};
pub use config::LedgerConfig;
pub use console::Console;
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, DELETE_CONFIRMATION};
pub use pin::{Pin, PinDigest, PinHasher, Sha256PinHasher};
pub use store::{RecordStore, Records, ACCOUNT_NUMBER_BASELINE};

#[cfg(feature = "insecure-hash")]
pub use pin::InsecurePinHasher;
