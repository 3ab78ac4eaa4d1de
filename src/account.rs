//! Account record model and its fixed-width on-disk layout.
//!
//! Each record occupies exactly [`RECORD_LEN`] bytes:
//!
//! | offset | len | field                                   |
//! |--------|-----|-----------------------------------------|
//! | 0      | 4   | account number, `u32` little-endian     |
//! | 4      | 50  | name, UTF-8, NUL-padded                 |
//! | 54     | 64  | PIN digest, lowercase hex               |
//! | 118    | 16  | balance, `rust_decimal` serialized form |

use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::pin::PinDigest;
use std::fmt;

const NUMBER_LEN: usize = 4;
const NAME_OFFSET: usize = NUMBER_LEN;
const DIGEST_OFFSET: usize = NAME_OFFSET + AccountName::MAX_LEN;
const BALANCE_OFFSET: usize = DIGEST_OFFSET + PinDigest::LEN;

/// Size of one encoded record in bytes.
pub const RECORD_LEN: usize = BALANCE_OFFSET + Amount::ENCODED_LEN;

/// Account holder name: non-empty, at most [`AccountName::MAX_LEN`] bytes of UTF-8.
///
/// Names that do not fit are rejected rather than truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountName(String);

impl AccountName {
    /// Width of the name field in bytes.
    pub const MAX_LEN: usize = 50;

    /// Validates a name. Surrounding whitespace is trimmed first.
    pub fn new(raw: &str) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidName("name must not be empty".into()));
        }
        if name.len() > Self::MAX_LEN {
            return Err(LedgerError::InvalidName(format!(
                "name is {} bytes, limit is {}",
                name.len(),
                Self::MAX_LEN
            )));
        }
        if name.contains('\0') {
            return Err(LedgerError::InvalidName(
                "name must not contain NUL characters".into(),
            ));
        }
        Ok(AccountName(name.to_string()))
    }

    /// The validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One persisted account.
///
/// The balance is only checked for non-negativity at withdrawal time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Unique account number, assigned once at creation.
    pub account_number: u32,

    /// Display name of the holder. Not unique.
    pub name: AccountName,

    /// Digest of the current PIN.
    pub pin_hash: PinDigest,

    /// Current balance.
    pub balance: Amount,
}

impl AccountRecord {
    /// Creates a record with a zero balance.
    pub fn new(account_number: u32, name: AccountName, pin_hash: PinDigest) -> Self {
        AccountRecord {
            account_number,
            name,
            pin_hash,
            balance: Amount::ZERO,
        }
    }

    /// Encodes the record into its fixed-width layout.
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[..NUMBER_LEN].copy_from_slice(&self.account_number.to_le_bytes());

        let name = self.name.as_str().as_bytes();
        buf[NAME_OFFSET..NAME_OFFSET + name.len()].copy_from_slice(name);

        buf[DIGEST_OFFSET..BALANCE_OFFSET].copy_from_slice(self.pin_hash.as_str().as_bytes());
        buf[BALANCE_OFFSET..].copy_from_slice(&self.balance.to_bytes());
        buf
    }

    /// Decodes a record. `offset` is the record's byte position in the store
    /// and only feeds error messages.
    pub fn decode(buf: &[u8; RECORD_LEN], offset: u64) -> Result<Self> {
        let corrupt = |message: String| LedgerError::CorruptRecord { offset, message };

        let mut number = [0u8; NUMBER_LEN];
        number.copy_from_slice(&buf[..NUMBER_LEN]);

        let name_field = &buf[NAME_OFFSET..DIGEST_OFFSET];
        let name_len = name_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_field.len());
        let name = std::str::from_utf8(&name_field[..name_len])
            .map_err(|e| corrupt(format!("name is not UTF-8: {}", e)))?;
        let name = AccountName::new(name).map_err(|e| corrupt(e.to_string()))?;

        let digest = std::str::from_utf8(&buf[DIGEST_OFFSET..BALANCE_OFFSET])
            .ok()
            .and_then(PinDigest::from_hex)
            .ok_or_else(|| corrupt("PIN digest is not 64 hex characters".into()))?;

        let mut balance = [0u8; Amount::ENCODED_LEN];
        balance.copy_from_slice(&buf[BALANCE_OFFSET..]);
        let balance = Amount::from_bytes(balance)
            .ok_or_else(|| corrupt("balance has an invalid flags word".into()))?;

        Ok(AccountRecord {
            account_number: u32::from_le_bytes(number),
            name,
            pin_hash: digest,
            balance,
        })
    }
}
