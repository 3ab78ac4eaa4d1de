//! Bank Ledger CLI
//!
//! An interactive console over a file-backed account store.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --store accounts.dat --admin-user operator --admin-password secret
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `info` to control logging verbosity
//! - `BANK_ADMIN_USER`, `BANK_ADMIN_PASSWORD`: admin credentials

use bank_ledger::{Console, LedgerConfig, Result};
use clap::Parser;
use log::info;
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "bank-ledger", version, about = "Console banking ledger")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Account store file (overrides the config file)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Admin username
    #[arg(long, env = "BANK_ADMIN_USER")]
    admin_user: Option<String>,

    /// Admin password
    #[arg(long, env = "BANK_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LedgerConfig::load(path)?,
        None => LedgerConfig::default(),
    };
    if let Some(store) = args.store {
        config.store_path = store;
    }
    config.override_admin(args.admin_user, args.admin_password);

    info!("Using account store {}", config.store_path.display());
    let ledger = config.into_ledger();

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(ledger, stdin.lock(), stdout.lock()).run()
}
