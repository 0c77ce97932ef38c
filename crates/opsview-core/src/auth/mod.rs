//! Authentication module for Opsview credentials and tokens.
//!
//! This module provides:
//! - `Credentials`: username/password/host resolved from the environment or
//!   the `$HOME/.opsview_secret` properties file
//! - `TokenCache`: the auth token obtained from `POST /login`, kept for the
//!   client's lifetime
//! - `CredentialStore` (feature `keyring`): passwords in the OS keychain

pub mod credentials;
#[cfg(feature = "keyring")]
pub mod keychain;
pub mod token;

pub use credentials::Credentials;
#[cfg(feature = "keyring")]
pub use keychain::CredentialStore;
pub use token::TokenCache;
