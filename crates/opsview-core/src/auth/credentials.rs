use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::config::{
    self, Properties, HOST_ENV, HOST_KEY, PASSWORD_ENV, PASSWORD_KEY, USERNAME_ENV, USERNAME_KEY,
};
use crate::error::{OpsviewError, Result};

/// Login details and server location for one Opsview instance.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    host: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

impl Credentials {
    /// `host` is the REST base URL, e.g. `https://opsview.example.com/rest`.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        let host = host.into();
        Self {
            username: username.into(),
            password: password.into(),
            host: host.trim_end_matches('/').to_string(),
        }
    }

    /// Load credentials from the process environment, falling back to
    /// `$HOME/.opsview_secret`.
    pub fn load() -> Result<Self> {
        let path = config::properties_path();
        Self::resolve(|key| std::env::var(key).ok(), path.as_deref())
    }

    /// Resolve each setting from `env` first, then from the properties file at
    /// `properties_path`. The file is only read when a setting is still
    /// missing after the environment.
    pub fn resolve<F>(env: F, properties_path: Option<&Path>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.is_empty());

        let mut username = lookup(USERNAME_ENV);
        let mut password = lookup(PASSWORD_ENV);
        let mut host = lookup(HOST_ENV);

        if username.is_none() || password.is_none() || host.is_none() {
            let properties = match properties_path {
                Some(path) => Properties::load(path),
                None => Err(OpsviewError::PropertiesFileNotFound(
                    "could not determine the home directory".to_string(),
                )),
            };

            match properties {
                Ok(props) => {
                    let from_file = |key: &str| {
                        props
                            .get(key)
                            .filter(|value| !value.is_empty())
                            .map(str::to_string)
                    };
                    username = username.or_else(|| from_file(USERNAME_KEY));
                    password = password.or_else(|| from_file(PASSWORD_KEY));
                    host = host.or_else(|| from_file(HOST_KEY));
                }
                // Only the password is optional; anything else needs the file.
                Err(e) if username.is_none() || host.is_none() => return Err(e),
                Err(e) => debug!(error = %e, "No properties file, password not set"),
            }
        }

        let username = username.ok_or_else(|| {
            OpsviewError::CredentialsNotFound(
                "could not retrieve credentials either from environment or from the properties file"
                    .to_string(),
            )
        })?;

        #[cfg(feature = "keyring")]
        {
            if password.is_none() {
                password = super::CredentialStore::get_password(&username).ok();
                if password.is_some() {
                    debug!(username = %username, "Password loaded from keychain");
                }
            }
        }

        let host = host.ok_or_else(|| {
            OpsviewError::CredentialsNotFound(format!(
                "no Opsview host configured (set {} or {})",
                HOST_ENV, HOST_KEY
            ))
        })?;

        Ok(Self::new(username, password.unwrap_or_default(), host))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}
