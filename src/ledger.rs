//! Account operations over the record store.
//!
//! Every mutation follows the same path: authenticate, validate, compute the
//! new record, then persist it with [`RecordStore::atomic_replace`].

use crate::account::{AccountName, AccountRecord};
use crate::admin::{AccountSummary, AdminCredentials, AdminSession};
use crate::amount::Amount;
use crate::auth::AuthGate;
use crate::command::{Command, DeleteOutcome, Outcome};
use crate::error::{LedgerError, Result};
use crate::pin::{Pin, PinHasher};
use crate::store::RecordStore;
use log::{debug, info, warn};
use rand::Rng;

/// Confirmation token required by [`Ledger::delete`].
pub const DELETE_CONFIRMATION: &str = "YES";

/// The banking ledger: a record store plus the authentication gate.
pub struct Ledger {
    store: RecordStore,
    gate: AuthGate,
    admin: Option<AdminCredentials>,
}

impl Ledger {
    /// Creates a ledger with the SHA-256 PIN hasher and no admin access.
    pub fn new(store: RecordStore) -> Self {
        Ledger {
            store,
            gate: AuthGate::default(),
            admin: None,
        }
    }

    /// Replaces the PIN hashing strategy.
    pub fn with_hasher(mut self, hasher: Box<dyn PinHasher>) -> Self {
        self.gate = AuthGate::new(hasher);
        self
    }

    /// Enables admin access with the given credentials.
    pub fn with_admin(mut self, credentials: AdminCredentials) -> Self {
        self.admin = Some(credentials);
        self
    }

    /// The underlying record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Dispatches a command to the matching operation.
    pub fn execute(&self, command: Command<'_>) -> Result<Outcome> {
        match command {
            Command::Create { name } => {
                let (account_number, pin) = self.create(&name)?;
                Ok(Outcome::Created {
                    account_number,
                    pin,
                })
            }
            Command::ViewBalance {
                account_number,
                pin,
            } => Ok(Outcome::Account(self.login(account_number, &pin)?)),
            Command::Deposit {
                account_number,
                pin,
                amount,
            } => Ok(Outcome::Account(self.deposit(account_number, &pin, amount)?)),
            Command::Withdraw {
                account_number,
                pin,
                amount,
            } => Ok(Outcome::Account(self.withdraw(account_number, &pin, amount)?)),
            Command::ChangePin {
                account_number,
                pin,
                new_pin,
                confirm_pin,
            } => {
                self.change_pin(account_number, &pin, &new_pin, &confirm_pin)?;
                Ok(Outcome::PinChanged)
            }
            Command::Delete {
                account_number,
                pin,
                confirmation,
            } => Ok(Outcome::Deleted(self.delete(
                account_number,
                &pin,
                &confirmation,
            )?)),
            Command::ListAccounts(session) => Ok(Outcome::Listing(self.list_all(session)?)),
            Command::Exit => Ok(Outcome::Exit),
        }
    }

    /// Opens an account and returns its number and the freshly generated PIN.
    ///
    /// The PIN is not stored anywhere; this is the only time it is available.
    pub fn create(&self, name: &str) -> Result<(u32, Pin)> {
        self.create_with_rng(name, &mut rand::thread_rng())
    }

    /// [`Ledger::create`] with a caller-supplied random source.
    pub fn create_with_rng<R: Rng + ?Sized>(
        &self,
        name: &str,
        rng: &mut R,
    ) -> Result<(u32, Pin)> {
        let name = AccountName::new(name)?;
        let account_number = self.store.allocate_next_account_number()?;
        let pin = Pin::generate(rng);

        let record = AccountRecord::new(account_number, name, self.gate.digest(pin.as_str()));
        self.store.append(&record)?;

        info!("Created account {}", account_number);
        Ok((account_number, pin))
    }

    /// Authenticates and returns a snapshot of the account.
    pub fn login(&self, account_number: u32, pin: &str) -> Result<AccountRecord> {
        self.gate.login(&self.store, account_number, pin)
    }

    /// Credits a positive amount and returns the updated account.
    pub fn deposit(
        &self,
        account_number: u32,
        pin: &str,
        amount: Amount,
    ) -> Result<AccountRecord> {
        let mut account = self.login(account_number, pin)?;

        if !amount.is_positive() {
            debug!("Rejected deposit of {} to {}", amount, account_number);
            return Err(LedgerError::InvalidAmount);
        }

        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)?;
        self.rewrite(&account)?;

        info!("Deposited {} to account {}", amount, account_number);
        Ok(account)
    }

    /// Debits a positive amount not exceeding the balance and returns the
    /// updated account.
    pub fn withdraw(
        &self,
        account_number: u32,
        pin: &str,
        amount: Amount,
    ) -> Result<AccountRecord> {
        let mut account = self.login(account_number, pin)?;

        if !amount.is_positive() {
            debug!("Rejected withdrawal of {} from {}", amount, account_number);
            return Err(LedgerError::InvalidAmount);
        }
        if amount > account.balance {
            debug!(
                "Withdrawal of {} from {} exceeds balance {}",
                amount, account_number, account.balance
            );
            return Err(LedgerError::InsufficientFunds);
        }

        account.balance = account
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::InvalidAmount)?;
        self.rewrite(&account)?;

        info!("Withdrew {} from account {}", amount, account_number);
        Ok(account)
    }

    /// Replaces the PIN after checking format and confirmation.
    pub fn change_pin(
        &self,
        account_number: u32,
        pin: &str,
        new_pin: &str,
        confirm_pin: &str,
    ) -> Result<()> {
        let mut account = self.login(account_number, pin)?;

        let new_pin = Pin::parse(new_pin)?;
        if new_pin.as_str() != confirm_pin {
            return Err(LedgerError::PinMismatch);
        }

        account.pin_hash = self.gate.digest(new_pin.as_str());
        self.rewrite(&account)?;

        info!("Changed PIN for account {}", account_number);
        Ok(())
    }

    /// Deletes the account if `confirmation` is exactly [`DELETE_CONFIRMATION`].
    pub fn delete(
        &self,
        account_number: u32,
        pin: &str,
        confirmation: &str,
    ) -> Result<DeleteOutcome> {
        self.login(account_number, pin)?;

        if confirmation != DELETE_CONFIRMATION {
            debug!("Deletion of {} cancelled", account_number);
            return Ok(DeleteOutcome::Cancelled);
        }

        let removed = self
            .store
            .atomic_replace(|r| r.account_number == account_number, |_| None)?;

        if removed {
            info!("Deleted account {}", account_number);
            Ok(DeleteOutcome::Deleted)
        } else {
            warn!("Account {} vanished before it could be deleted", account_number);
            Ok(DeleteOutcome::NotFound)
        }
    }

    /// Checks admin credentials. Always denied when none are configured.
    pub fn admin_login(&self, username: &str, password: &str) -> Result<AdminSession> {
        let result = match &self.admin {
            Some(credentials) => credentials.authenticate(username, password),
            None => Err(LedgerError::AdminAuth),
        };
        if result.is_err() {
            warn!("Admin login denied");
        }
        result
    }

    /// Returns number, name, and balance of every account in store order.
    pub fn list_all(&self, _session: &AdminSession) -> Result<Vec<AccountSummary>> {
        self.store
            .scan_all()?
            .map(|record| record.map(AccountSummary::from))
            .collect()
    }

    /// Persists `account` over the record with the same number.
    fn rewrite(&self, account: &AccountRecord) -> Result<()> {
        let number = account.account_number;
        let matched = self
            .store
            .atomic_replace(|r| r.account_number == number, |_| Some(account.clone()))?;
        if matched {
            Ok(())
        } else {
            Err(LedgerError::NotFound(number))
        }
    }
}
