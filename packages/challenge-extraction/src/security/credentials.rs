//! Oracle credentials with secure memory and round-robin rotation.
//!
//! Uses the `secrecy` crate to prevent accidental logging of API keys.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::SecurityError;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Short non-reversible tag for log lines, e.g. `…3No`.
    pub fn hint(&self) -> String {
        let value = self.expose();
        let tail: String = value
            .chars()
            .rev()
            .take(3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("…{}", tail)
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Ordered, interchangeable oracle credentials.
///
/// Read-only after construction. A shared cursor names the credential to try
/// next; it moves forward only when an attempt fails, so a working credential
/// keeps being used for subsequent URLs.
pub struct CredentialPool {
    credentials: Vec<SecretString>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    /// Create a pool. Fails if empty or if any credential is blank.
    pub fn new<I, S>(credentials: I) -> Result<Self, SecurityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let credentials: Vec<SecretString> = credentials
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let c = c.into();
                if c.trim().is_empty() {
                    Err(SecurityError::BlankCredential(i))
                } else {
                    Ok(SecretString::new(c.trim()))
                }
            })
            .collect::<Result<_, _>>()?;

        if credentials.is_empty() {
            return Err(SecurityError::EmptyPool);
        }

        Ok(Self {
            credentials,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Position of the credential that will be tried next.
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::Relaxed) % self.credentials.len()
    }

    /// Credential at the cursor.
    pub fn current(&self) -> &SecretString {
        &self.credentials[self.position()]
    }

    /// Move the cursor to the next credential, wrapping around.
    pub fn advance(&self) {
        self.cursor.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("len", &self.credentials.len())
            .field("position", &self.position())
            .finish()
    }
}

/// How the pipeline authenticates against the oracle.
#[derive(Debug)]
pub enum Credentials {
    /// One credential, one attempt per URL; failures are per-URL errors.
    Single(SecretString),

    /// Rotate through a pool on failure, bounded by the retry policy.
    Pool(CredentialPool),
}

impl Credentials {
    pub fn single(credential: impl Into<String>) -> Self {
        Self::Single(SecretString::new(credential))
    }

    pub fn pool<I, S>(credentials: I) -> Result<Self, SecurityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CredentialPool::new(credentials).map(Self::Pool)
    }

    pub fn is_pool(&self) -> bool {
        matches!(self, Self::Pool(_))
    }
}
