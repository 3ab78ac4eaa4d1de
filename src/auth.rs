//! PIN-based authentication against the record store.

use crate::account::AccountRecord;
use crate::error::{LedgerError, Result};
use crate::pin::{PinDigest, PinHasher, Sha256PinHasher};
use crate::store::RecordStore;
use log::debug;

/// Looks up an account and verifies a PIN against its stored digest.
///
/// The gate keeps no per-account state: no retry counter, no lockout.
pub struct AuthGate {
    hasher: Box<dyn PinHasher>,
}

impl AuthGate {
    /// Creates a gate that digests PINs with `hasher`.
    pub fn new(hasher: Box<dyn PinHasher>) -> Self {
        AuthGate { hasher }
    }

    /// Digests a PIN with the configured hasher.
    pub fn digest(&self, pin: &str) -> PinDigest {
        self.hasher.digest(pin)
    }

    /// Authenticates `account_number` with `pin`.
    ///
    /// On success returns a copy of the record as it was read; later changes
    /// to the store are not reflected in it.
    pub fn login(
        &self,
        store: &RecordStore,
        account_number: u32,
        pin: &str,
    ) -> Result<AccountRecord> {
        let record = store
            .find_by_number(account_number)?
            .ok_or(LedgerError::NotFound(account_number))?;

        if self.digest(pin) != record.pin_hash {
            debug!("PIN rejected for account {}", account_number);
            return Err(LedgerError::InvalidPin);
        }

        Ok(record)
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        AuthGate::new(Box::new(Sha256PinHasher))
    }
}
