//! Interactive menu loop.
//!
//! Reads choices and field values line by line, turns them into
//! [`Command`]s, and prints the outcome. Validation errors on amounts and new
//! PINs re-prompt; every other error is printed and the menu is shown again.
//! End of input behaves like choosing Exit.

use crate::admin::{write_listing, AdminSession};
use crate::amount::Amount;
use crate::command::{Command, DeleteOutcome, Outcome};
use crate::error::{LedgerError, Result};
use crate::ledger::{Ledger, DELETE_CONFIRMATION};
use std::io::{BufRead, Write};
use std::str::FromStr;

const MENU: &str = "\n==== Bank Transaction Menu ====
1. Create Account
2. View Balance
3. Deposit
4. Withdraw
5. Change PIN
6. Delete Account
7. Details (admin only)
8. Exit
Choose an option: ";

/// The console front end. Holds the admin session once unlocked, for the
/// lifetime of the console.
pub struct Console<R, W> {
    ledger: Ledger,
    input: R,
    output: W,
    admin: Option<AdminSession>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Wraps a ledger with the given input and output streams.
    pub fn new(ledger: Ledger, input: R, output: W) -> Self {
        Console {
            ledger,
            input,
            output,
            admin: None,
        }
    }

    /// Runs until Exit is chosen or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(choice) = self.prompt(MENU)? else {
                break;
            };

            let result = match choice.trim() {
                "1" => self.create_account(),
                "2" => self.view_balance(),
                "3" => self.deposit(),
                "4" => self.withdraw(),
                "5" => self.change_pin(),
                "6" => self.delete_account(),
                "7" => self.admin_details(),
                "8" => {
                    if let Outcome::Exit = self.ledger.execute(Command::Exit)? {
                        writeln!(self.output, "Thank you.")?;
                        break;
                    }
                    Ok(())
                }
                _ => {
                    writeln!(self.output, "Invalid option.")?;
                    Ok(())
                }
            };

            if let Err(e) = result {
                writeln!(self.output, "{}", e)?;
            }
        }

        self.output.flush()?;
        Ok(())
    }

    fn create_account(&mut self) -> Result<()> {
        let Some(name) = self.prompt("Enter your name: ")? else {
            return Ok(());
        };

        if let Outcome::Created {
            account_number,
            pin,
        } = self.ledger.execute(Command::Create { name })?
        {
            writeln!(self.output, "\nAccount created successfully!")?;
            writeln!(self.output, "Account Number: {}", account_number)?;
            writeln!(self.output, "PIN: {}", pin)?;
            writeln!(self.output, "Please remember your credentials.")?;
        }
        Ok(())
    }

    fn view_balance(&mut self) -> Result<()> {
        let Some((account_number, pin)) = self.read_login()? else {
            return Ok(());
        };

        if let Outcome::Account(account) = self.ledger.execute(Command::ViewBalance {
            account_number,
            pin,
        })? {
            writeln!(self.output, "\nWelcome, {}!", account.name)?;
            writeln!(self.output, "Account: {}", account.account_number)?;
            writeln!(self.output, "Balance: {}", account.balance)?;
        }
        Ok(())
    }

    fn deposit(&mut self) -> Result<()> {
        let Some((account_number, pin)) = self.login()? else {
            return Ok(());
        };

        loop {
            let Some(amount) = self.read_amount("Amount to deposit: ")? else {
                return Ok(());
            };
            let command = Command::Deposit {
                account_number,
                pin: pin.clone(),
                amount,
            };
            match self.ledger.execute(command) {
                Ok(Outcome::Account(account)) => {
                    writeln!(
                        self.output,
                        "Deposit successful. New balance: {}",
                        account.balance
                    )?;
                    return Ok(());
                }
                Ok(_) => return Ok(()),
                Err(e) if e.is_recoverable() => writeln!(self.output, "{}. Try again.", e)?,
                Err(e) => return Err(e),
            }
        }
    }

    fn withdraw(&mut self) -> Result<()> {
        let Some((account_number, pin)) = self.login()? else {
            return Ok(());
        };

        loop {
            let Some(amount) = self.read_amount("Amount to withdraw: ")? else {
                return Ok(());
            };
            let command = Command::Withdraw {
                account_number,
                pin: pin.clone(),
                amount,
            };
            match self.ledger.execute(command) {
                Ok(Outcome::Account(account)) => {
                    writeln!(
                        self.output,
                        "Withdraw successful. New balance: {}",
                        account.balance
                    )?;
                    return Ok(());
                }
                Ok(_) => return Ok(()),
                Err(e) if e.is_recoverable() => writeln!(self.output, "{}. Try again.", e)?,
                Err(e) => return Err(e),
            }
        }
    }

    fn change_pin(&mut self) -> Result<()> {
        let Some((account_number, pin)) = self.login()? else {
            return Ok(());
        };

        loop {
            let Some(new_pin) = self.prompt("Enter new 4-digit PIN: ")? else {
                return Ok(());
            };
            let Some(confirm_pin) = self.prompt("Re-enter new PIN to confirm: ")? else {
                return Ok(());
            };
            let command = Command::ChangePin {
                account_number,
                pin: pin.clone(),
                new_pin,
                confirm_pin,
            };
            match self.ledger.execute(command) {
                Ok(_) => {
                    writeln!(self.output, "PIN changed successfully.")?;
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => writeln!(self.output, "{}. Try again.", e)?,
                Err(e) => return Err(e),
            }
        }
    }

    fn delete_account(&mut self) -> Result<()> {
        let Some((account_number, pin)) = self.login()? else {
            return Ok(());
        };

        let question = format!(
            "Are you SURE you want to delete account {}? Type {} to confirm: ",
            account_number, DELETE_CONFIRMATION
        );
        let Some(confirmation) = self.prompt(&question)? else {
            return Ok(());
        };

        let command = Command::Delete {
            account_number,
            pin,
            confirmation,
        };
        if let Outcome::Deleted(outcome) = self.ledger.execute(command)? {
            match outcome {
                DeleteOutcome::Deleted => {
                    writeln!(self.output, "Account {} deleted successfully.", account_number)?
                }
                DeleteOutcome::Cancelled => writeln!(self.output, "Deletion cancelled.")?,
                DeleteOutcome::NotFound => {
                    writeln!(self.output, "Failed to delete (account not found).")?
                }
            }
        }
        Ok(())
    }

    fn admin_details(&mut self) -> Result<()> {
        if self.admin.is_none() {
            writeln!(self.output, "--- Admin Login Required ---")?;
            let Some(username) = self.prompt("Username: ")? else {
                return Ok(());
            };
            let Some(password) = self.prompt("Password: ")? else {
                return Ok(());
            };
            self.admin = Some(self.ledger.admin_login(&username, &password)?);
        }

        let Some(session) = self.admin.as_ref() else {
            return Err(LedgerError::AdminAuth);
        };
        if let Outcome::Listing(rows) = self.ledger.execute(Command::ListAccounts(session))? {
            writeln!(self.output, "\n---- All stored accounts ----")?;
            write_listing(&rows, &mut self.output)?;
            writeln!(self.output, "-----------------------------")?;
        }
        Ok(())
    }

    /// Reads credentials and authenticates them up front, so a bad PIN is
    /// reported before any further prompts.
    fn login(&mut self) -> Result<Option<(u32, String)>> {
        let Some((account_number, pin)) = self.read_login()? else {
            return Ok(None);
        };
        self.ledger.login(account_number, &pin)?;
        Ok(Some((account_number, pin)))
    }

    fn read_login(&mut self) -> Result<Option<(u32, String)>> {
        let Some(number) = self.prompt("\nAccount number: ")? else {
            return Ok(None);
        };
        let Ok(account_number) = number.trim().parse::<u32>() else {
            writeln!(self.output, "Invalid number.")?;
            return Ok(None);
        };
        let Some(pin) = self.prompt("PIN: ")? else {
            return Ok(None);
        };
        Ok(Some((account_number, pin)))
    }

    /// Prompts until the input parses as a number. Range checks are left to
    /// the ledger.
    fn read_amount(&mut self, question: &str) -> Result<Option<Amount>> {
        loop {
            let Some(line) = self.prompt(question)? else {
                return Ok(None);
            };
            match Amount::from_str(&line) {
                Ok(amount) => return Ok(Some(amount)),
                Err(_) => writeln!(self.output, "{}. Try again.", LedgerError::InvalidAmount)?,
            }
        }
    }

    /// Writes `question` and reads one line without its line terminator.
    /// Invalid UTF-8 is replaced rather than rejected. Returns `None` at end
    /// of input.
    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminCredentials;
    use crate::store::RecordStore;
    use tempfile::TempDir;

    fn run_script(ledger: Ledger, script: &str) -> String {
        let mut output = Vec::new();
        Console::new(ledger, script.as_bytes(), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn ledger(dir: &TempDir) -> Ledger {
        Ledger::new(RecordStore::open(dir.path().join("accounts.dat")))
            .with_admin(AdminCredentials::new("ops", "pw"))
    }

    #[test]
    fn test_exit_says_goodbye() {
        let dir = TempDir::new().unwrap();
        let out = run_script(ledger(&dir), "8\n");
        assert!(out.contains("Thank you."));
    }

    #[test]
    fn test_invalid_utf8_choice_keeps_session_alive() {
        let dir = TempDir::new().unwrap();
        let mut output = Vec::new();
        let script: &[u8] = b"\xff\xfe\n8\n";
        Console::new(ledger(&dir), script, &mut output).run().unwrap();

        let out = String::from_utf8(output).unwrap();
        assert!(out.contains("Invalid option."));
        assert!(out.contains("Thank you."));
    }

    #[test]
    fn test_end_of_input_stops_loop() {
        let dir = TempDir::new().unwrap();
        let out = run_script(ledger(&dir), "");
        assert!(out.contains("Choose an option"));
        assert!(!out.contains("Thank you."));
    }

    #[test]
    fn test_unknown_option() {
        let dir = TempDir::new().unwrap();
        let out = run_script(ledger(&dir), "42\n8\n");
        assert!(out.contains("Invalid option."));
    }

    #[test]
    fn test_create_prints_credentials_once() {
        let dir = TempDir::new().unwrap();
        let out = run_script(ledger(&dir), "1\nAlice\n8\n");
        assert!(out.contains("Account created successfully!"));
        assert!(out.contains("Account Number: 100001"));
        assert_eq!(out.matches("PIN: ").count(), 1);
    }

    #[test]
    fn test_create_rejects_long_name() {
        let dir = TempDir::new().unwrap();
        let script = format!("1\n{}\n8\n", "x".repeat(60));
        let out = run_script(ledger(&dir), &script);
        assert!(out.contains("Invalid name"));
        assert!(!out.contains("Account created"));
    }

    #[test]
    fn test_deposit_reprompts_on_bad_amounts() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);
        let (n, pin) = ledger.create("Alice").unwrap();

        let script = format!("3\n{}\n{}\nabc\n-5\n250\n8\n", n, pin);
        let out = run_script(ledger, &script);

        assert_eq!(out.matches("Invalid amount. Try again.").count(), 2);
        assert!(out.contains("Deposit successful. New balance: 250.00"));
    }

    #[test]
    fn test_withdraw_reprompts_on_insufficient_funds() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);
        let (n, pin) = ledger.create("Alice").unwrap();
        ledger
            .deposit(n, pin.as_str(), Amount::from_str("100").unwrap())
            .unwrap();

        let script = format!("4\n{}\n{}\n150\n40\n8\n", n, pin);
        let out = run_script(ledger, &script);

        assert!(out.contains("Insufficient funds. Try again."));
        assert!(out.contains("Withdraw successful. New balance: 60.00"));
    }

    #[test]
    fn test_wrong_pin_skips_amount_prompt() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);
        let (n, pin) = ledger.create("Alice").unwrap();
        let wrong = if pin.as_str() == "1111" { "2222" } else { "1111" };

        let out = run_script(ledger, &format!("3\n{}\n{}\n8\n", n, wrong));
        assert!(out.contains("Incorrect PIN"));
        assert!(!out.contains("Amount to deposit"));
    }

    #[test]
    fn test_non_numeric_account_number() {
        let dir = TempDir::new().unwrap();
        let out = run_script(ledger(&dir), "2\nabc\n8\n");
        assert!(out.contains("Invalid number."));
    }

    #[test]
    fn test_change_pin_reprompts() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);
        let (n, pin) = ledger.create("Alice").unwrap();

        let script = format!("5\n{}\n{}\n12\n12\n1234\n4321\n9876\n9876\n8\n", n, pin);
        let out = run_script(ledger, &script);

        assert!(out.contains("PIN must be exactly 4 digits. Try again."));
        assert!(out.contains("PINs don't match. Try again."));
        assert!(out.contains("PIN changed successfully."));
    }

    #[test]
    fn test_delete_cancel_then_confirm() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);
        let (n, pin) = ledger.create("Alice").unwrap();

        let script = format!("6\n{n}\n{pin}\nNO\n6\n{n}\n{pin}\nYES\n2\n{n}\n{pin}\n8\n");
        let out = run_script(ledger, &script);

        assert!(out.contains("Deletion cancelled."));
        assert!(out.contains(&format!("Account {} deleted successfully.", n)));
        assert!(out.contains(&format!("Account {} not found", n)));
    }

    #[test]
    fn test_admin_session_persists_for_console_lifetime() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger(&dir);
        ledger.create("Alice").unwrap();

        let out = run_script(ledger, "7\nops\npw\n7\n8\n");

        assert_eq!(out.matches("--- Admin Login Required ---").count(), 1);
        assert_eq!(out.matches("100001,Alice,0.00").count(), 2);
    }

    #[test]
    fn test_admin_denied_then_retry() {
        let dir = TempDir::new().unwrap();
        let out = run_script(ledger(&dir), "7\nops\nnope\n7\nops\npw\n8\n");

        assert!(out.contains("Access denied"));
        assert_eq!(out.matches("--- Admin Login Required ---").count(), 2);
        assert!(out.contains("account_number,name,balance"));
    }
}
