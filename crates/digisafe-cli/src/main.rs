//! `digisafe` — Safe Folder on the command line.
//!
//! Each invocation opens the file-backed store, prompts for the PIN when the
//! command needs the vault unlocked, does its work, and locks again on exit.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use digisafe_vault::{EvidenceKind, FileStore, SafeFolder, SafeFolderConfig, VaultError};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Parser, Debug)]
#[command(name = "digisafe", version, about = "Encrypted evidence vault (Safe Folder)")]
struct Cli {
    /// Directory holding the vault, its attempt counter and config.json
    #[arg(long, global = true, default_value = ".digisafe")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether a vault exists
    Status,

    /// Create a new vault protected by a PIN
    Init {
        /// Start with no evidence instead of the sample list
        #[arg(long)]
        empty: bool,
    },

    /// List evidence items
    List,

    /// Add an evidence item
    Add {
        /// Kind of evidence: image or text
        #[arg(long)]
        kind: EvidenceKind,
        /// Display name
        #[arg(long)]
        name: String,
        /// Date string shown next to the item
        #[arg(long)]
        date: String,
    },

    /// Remove an evidence item by id
    Remove {
        /// Item id as shown by `list`
        id: u64,
    },

    /// Re-key the vault under a new PIN
    ChangePin,

    /// Delete the vault and all evidence permanently
    Reset {
        /// Confirm the irreversible deletion
        #[arg(long)]
        yes: bool,
    },

    /// Print the effective configuration
    Config,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prompt_pin(prompt: &str) -> Result<Zeroizing<String>> {
    let pin = rpassword::prompt_password(prompt).context("failed to read PIN")?;
    Ok(Zeroizing::new(pin))
}

fn prompt_new_pin() -> Result<Zeroizing<String>> {
    let pin = prompt_pin("New PIN: ")?;
    let again = prompt_pin("Repeat PIN: ")?;
    if *pin != *again {
        bail!("PINs do not match");
    }
    Ok(pin)
}

fn unlock(folder: &mut SafeFolder<FileStore>) -> Result<()> {
    let pin = prompt_pin("PIN: ")?;
    folder.unlock(&pin)?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = SafeFolderConfig::load(&cli.data_dir);
    let store = FileStore::open(&cli.data_dir)
        .with_context(|| format!("cannot open data directory {}", cli.data_dir.display()))?;
    let mut folder = SafeFolder::new(store, config)?;

    match cli.command {
        Command::Status => println!("{}", folder.state()?),
        Command::Init { empty } => {
            if folder.has_vault()? {
                return Err(VaultError::VaultAlreadyExists.into());
            }
            let pin = prompt_new_pin()?;
            folder.create(&pin, empty.then(Vec::new))?;
            println!("Safe Folder created with {} item(s).", folder.items()?.len());
        }
        Command::List => {
            unlock(&mut folder)?;
            for item in folder.items()? {
                println!(
                    "{:>4}  {:<5}  {:<14}  {}",
                    item.id,
                    item.kind.to_string(),
                    item.date,
                    item.name
                );
            }
        }
        Command::Add { kind, name, date } => {
            unlock(&mut folder)?;
            let id = folder.add_item(kind, &name, &date)?;
            println!("Added item {id}.");
        }
        Command::Remove { id } => {
            unlock(&mut folder)?;
            folder.remove_item(id)?;
            println!("Removed item {id}.");
        }
        Command::ChangePin => {
            let current = prompt_pin("Current PIN: ")?;
            folder.unlock(&current)?;
            let new_pin = prompt_new_pin()?;
            folder.change_pin(&current, &new_pin)?;
            println!("PIN changed.");
        }
        Command::Reset { yes } => {
            folder.reset(yes)?;
            println!("Vault reset complete.");
        }
        Command::Config => println!("{}", serde_json::to_string_pretty(folder.config())?),
    }

    folder.lock();
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    if let Err(e) = digisafe_crypto_core::disable_core_dumps() {
        tracing::warn!("could not disable core dumps: {e}");
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = err
                .downcast_ref::<VaultError>()
                .map_or_else(|| format!("{err:#}"), VaultError::user_message);
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_kind() {
        let cli = Cli::try_parse_from([
            "digisafe", "add", "--kind", "image", "--name", "a.png", "--date", "today",
        ])
        .unwrap();
        match cli.command {
            Command::Add { kind, name, .. } => {
                assert_eq!(kind, EvidenceKind::Image);
                assert_eq!(name, "a.png");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let result = Cli::try_parse_from([
            "digisafe", "add", "--kind", "video", "--name", "a", "--date", "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn reset_defaults_to_unconfirmed() {
        let cli = Cli::try_parse_from(["digisafe", "--data-dir", "/tmp/x", "reset"]).unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/x"));
        assert!(matches!(cli.command, Command::Reset { yes: false }));
    }
}
