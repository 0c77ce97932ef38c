//! Command-line arguments.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};

/// Set downtimes and reload configuration on an Opsview server.
///
/// Credentials come from OPSVIEW_USERNAME/OPSVIEW_PASSWORD/OPSVIEW_HOST,
/// a `.env` file, or `$HOME/.opsview_secret`.
#[derive(Debug, Parser)]
#[command(name = "opsview", version, about)]
pub struct Cli {
    /// Opsview API version to use (defaults to the latest supported)
    #[arg(long, global = true)]
    pub api_version: Option<u32>,

    /// Reload lock marker file (defaults to the system temp directory)
    #[arg(long, global = true, env = "OPSVIEW_RELOAD_LOCK")]
    pub lock_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Put matching hosts/services into downtime
    Downtime {
        /// Start time (RFC 3339 or local "YYYY-MM-DD HH:MM[:SS]")
        #[arg(long, value_parser = parse_time)]
        start: DateTime<Utc>,

        /// End time (RFC 3339 or local "YYYY-MM-DD HH:MM[:SS]")
        #[arg(long, value_parser = parse_time)]
        end: DateTime<Utc>,

        /// Comment recorded with the downtime
        #[arg(long)]
        comment: String,

        /// Host name pattern, `%` is the wildcard
        #[arg(long)]
        host: String,

        /// Service name pattern, `%` is the wildcard
        #[arg(long)]
        service: Option<String>,
    },

    /// Reload the Opsview configuration
    Reload {
        /// Run the reload at this time instead of now
        #[arg(long, value_parser = parse_time)]
        at: Option<DateTime<Utc>>,
    },

    /// Manage the password stored in the OS keychain
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CredentialsAction {
    /// Prompt for a password and store it in the keychain
    Store {
        #[arg(long, env = "OPSVIEW_USERNAME")]
        username: String,
    },
    /// Remove the stored password
    Delete {
        #[arg(long, env = "OPSVIEW_USERNAME")]
        username: String,
    },
}

const LOCAL_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse an RFC 3339 timestamp, or a local date and time without offset.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| format!("{} does not exist in the local time zone", input));
        }
    }

    Err(format!(
        "invalid time '{}': expected RFC 3339 or YYYY-MM-DD HH:MM[:SS]",
        input
    ))
}
