//! Credential handling: at-rest encryption for the API key and scrubbing of
//! secrets from service error text.

mod credential;
mod scrub;

pub use credential::{CredentialStore, SecretVault};
pub use scrub::sanitize_api_error;
