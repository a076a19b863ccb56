//! Oracle calls with credential rotation.

use tracing::{debug, error, warn};

use crate::error::{ExtractionError, Result};
use crate::security::{CredentialPool, Credentials};
use crate::traits::oracle::Oracle;
use crate::types::config::RetryPolicy;

/// Call the oracle for one URL using the configured credentials.
///
/// A single credential gets exactly one attempt and its error is returned
/// as-is. A pool is walked round-robin from its shared cursor, pausing
/// `retry.delay` between attempts, until a call succeeds or
/// `retry.max_attempts` calls have failed.
pub async fn call_oracle<O>(
    oracle: &O,
    credentials: &Credentials,
    retry: &RetryPolicy,
    url: &str,
    prompt: &str,
) -> Result<String>
where
    O: Oracle + ?Sized,
{
    match credentials {
        Credentials::Single(credential) => {
            debug!(url = %url, oracle = oracle.name(), "Calling oracle");
            oracle.generate(credential, prompt).await
        }
        Credentials::Pool(pool) => call_with_rotation(oracle, pool, retry, url, prompt).await,
    }
}

async fn call_with_rotation<O>(
    oracle: &O,
    pool: &CredentialPool,
    retry: &RetryPolicy,
    url: &str,
    prompt: &str,
) -> Result<String>
where
    O: Oracle + ?Sized,
{
    let max_attempts = retry.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let credential = pool.current();
        debug!(
            url = %url,
            attempt,
            position = pool.position(),
            credential = %credential.hint(),
            "Calling oracle"
        );

        match oracle.generate(credential, prompt).await {
            Ok(reply) => return Ok(reply),
            Err(e) => {
                warn!(
                    url = %url,
                    stage = "oracle",
                    attempt,
                    credential = %credential.hint(),
                    error = %e,
                    "Oracle attempt failed, rotating credential"
                );
                pool.advance();

                if attempt % pool.len() == 0 {
                    warn!(
                        url = %url,
                        cycles = attempt / pool.len(),
                        "Every credential failed, starting another cycle"
                    );
                }

                if attempt < max_attempts && !retry.delay.is_zero() {
                    tokio::time::sleep(retry.delay).await;
                }
            }
        }
    }

    error!(url = %url, attempts = max_attempts, "Credential pool exhausted");
    Err(ExtractionError::CredentialsExhausted {
        url: url.to_string(),
        attempts: max_attempts,
    })
}
