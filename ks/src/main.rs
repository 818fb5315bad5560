use std::io::Read;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use keystore::cli::{Cli, Command};
use keystore::config::Config;
use keystore::{FileStore, KeyValueStore};

fn setup_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let store_path = cli.store.unwrap_or(config.store_path);

    info!(?store_path, "keystore starting");
    let mut store = FileStore::open(&store_path)
        .context(format!("Failed to open store at {}", store_path.display()))?
        .with_quota(config.quota_bytes);

    match cli.command {
        Command::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("{} Key not found: {}", "✗".red(), key);
                std::process::exit(1);
            }
        },
        Command::Set { key, value } => {
            let value = match value {
                Some(v) => v,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read value from stdin")?;
                    buf
                }
            };
            store.set(&key, &value)?;
            println!("{} Stored {} ({} bytes)", "✓".green(), key.cyan(), value.len());
        }
        Command::List => {
            let keys = store.keys()?;
            if keys.is_empty() {
                println!("No keys found");
            } else {
                for key in keys {
                    println!("{}", key);
                }
            }
        }
        Command::Remove { key } => {
            if store.remove(&key)? {
                println!("{} Removed key: {}", "✓".green(), key);
            } else {
                println!("Key not found: {}", key);
            }
        }
    }

    Ok(())
}
