//! Admin access to the all-accounts listing.
//!
//! Access is represented by an [`AdminSession`] value. Only
//! [`AdminCredentials::authenticate`] can produce one, and the listing
//! operations require it. How long a session is kept is up to the caller.

use crate::account::AccountRecord;
use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Username/password pair accepted for admin access. Supplied by configuration.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    /// Builds credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        AdminCredentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks both fields exactly. The error does not say which one was wrong.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AdminSession> {
        if self.username == username && self.password == password {
            Ok(AdminSession { _private: () })
        } else {
            Err(LedgerError::AdminAuth)
        }
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Proof of a successful admin login.
#[derive(Debug)]
pub struct AdminSession {
    _private: (),
}

/// One row of the admin listing. Never carries the PIN digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub account_number: u32,
    pub name: String,
    pub balance: Amount,
}

impl From<AccountRecord> for AccountSummary {
    fn from(record: AccountRecord) -> Self {
        AccountSummary {
            account_number: record.account_number,
            name: record.name.as_str().to_string(),
            balance: record.balance,
        }
    }
}

/// Writes the listing as CSV with an `account_number,name,balance` header.
pub fn write_listing<W: Write>(summaries: &[AccountSummary], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(["account_number", "name", "balance"])?;
    for summary in summaries {
        csv_writer.serialize(summary)?;
    }

    csv_writer.flush()?;
    Ok(())
}
