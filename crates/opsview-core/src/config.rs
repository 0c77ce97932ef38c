//! Configuration sources for the Opsview client.
//!
//! Settings come from environment variables or from a Java-style properties
//! file stored at `$HOME/.opsview_secret`:
//!
//! ```text
//! opsview.login.username=admin
//! opsview.login.password=secret
//! opsview.host=https://opsview.example.com/rest
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{OpsviewError, Result};

/// Properties file name in the user's home directory
pub const PROPERTIES_FILE: &str = ".opsview_secret";

pub const USERNAME_KEY: &str = "opsview.login.username";
pub const PASSWORD_KEY: &str = "opsview.login.password";
pub const HOST_KEY: &str = "opsview.host";

pub const USERNAME_ENV: &str = "OPSVIEW_USERNAME";
pub const PASSWORD_ENV: &str = "OPSVIEW_PASSWORD";
pub const HOST_ENV: &str = "OPSVIEW_HOST";

/// Location of the properties file, if a home directory can be determined.
pub fn properties_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(PROPERTIES_FILE))
}

/// Key/value pairs read from a properties file.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Read and parse a properties file.
    ///
    /// Any failure to read the file is reported as `PropertiesFileNotFound`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OpsviewError::PropertiesFileNotFound(format!(
                "the Opsview properties file must exist at {}: {}",
                path.display(),
                e
            ))
        })?;
        let properties = Self::parse(&contents);
        debug!(path = %path.display(), keys = properties.entries.len(), "Loaded properties file");
        Ok(properties)
    }

    /// Parse properties text.
    ///
    /// Supports `key=value`, `key: value` and `key value` lines, `#` and `!`
    /// comments and blank lines. Escapes and line continuations are not
    /// interpreted. Later duplicates win.
    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();

        for line in contents.lines() {
            let line = line.trim_start();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let key_end = line
                .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
                .unwrap_or(line.len());
            let key = &line[..key_end];

            let mut rest = line[key_end..].trim_start();
            if rest.starts_with('=') || rest.starts_with(':') {
                rest = rest[1..].trim_start();
            }

            entries.insert(key.to_string(), rest.trim_end().to_string());
        }

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
