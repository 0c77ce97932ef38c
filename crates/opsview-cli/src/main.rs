//! opsview - set downtimes and reload configuration on an Opsview server.

mod args;

use std::io;

use anyhow::{bail, Context, Result};
use clap::Parser;
use opsview_core::auth::CredentialStore;
use opsview_core::{Opsview, ReloadLock};
use serde_json::to_string_pretty;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Command, CredentialsAction};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn connect(cli: &Cli) -> Result<Opsview> {
    let lock = cli
        .lock_file
        .clone()
        .map(ReloadLock::new)
        .unwrap_or_default();
    Opsview::with_reload_lock(cli.api_version, lock).context("Failed to create Opsview client")
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Downtime {
            start,
            end,
            comment,
            host,
            service,
        } => {
            let opsview = connect(&cli)?;
            let ack = opsview
                .set_downtime(*start, *end, comment, host, service.as_deref())
                .await
                .context("Failed to set downtime")?;
            println!("{}", to_string_pretty(&ack)?);
        }
        Command::Reload { at } => {
            let opsview = connect(&cli)?;
            if let Some(at) = at {
                eprintln!("Reload scheduled for {}", at.to_rfc3339());
            }
            // Dropping the reload future on Ctrl-C releases the lock marker.
            let status = tokio::select! {
                result = opsview.reload(*at) => result.context("Failed to reload Opsview")?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, reload abandoned");
                    bail!("Reload interrupted");
                }
            };
            println!("{}", to_string_pretty(&status)?);
        }
        Command::Credentials { action } => match action {
            CredentialsAction::Store { username } => {
                if CredentialStore::has_credentials(username) {
                    eprintln!("Replacing the stored password for {}", username);
                }
                let password = rpassword::prompt_password("Password: ")?;
                CredentialStore::store(username, &password)
                    .context("Failed to store password in keychain")?;
                eprintln!("Password stored for {}", username);
            }
            CredentialsAction::Delete { username } => {
                CredentialStore::delete(username)
                    .context("Failed to delete password from keychain")?;
                eprintln!("Password removed for {}", username);
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing();
    info!("opsview starting");

    run(cli).await
}
