//! Credential handling for oracle access.

pub mod credentials;

pub use credentials::{CredentialPool, Credentials, SecretString};
