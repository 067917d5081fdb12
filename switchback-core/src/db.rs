//! Database connection with retry/backoff, plus SQL identifier helpers.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::error::{Result, SwitchbackError};

/// Quote a SQL identifier to prevent SQL injection.
///
/// Doubles any embedded double-quotes and wraps in double-quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Validate that a SQL identifier contains only safe characters.
///
/// Returns an error for names with characters outside `[a-zA-Z0-9_]`.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SwitchbackError::ConfigError(
            "Identifier cannot be empty".to_string(),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SwitchbackError::ConfigError(format!(
            "Identifier '{}' contains invalid characters. Only [a-zA-Z0-9_] are allowed.",
            name
        )));
    }
    Ok(())
}

/// Check if a connect error is a permanent authentication failure that should not be retried.
fn is_permanent_error(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        // 28P01 = invalid_password, 28000 = invalid_authorization_specification
        return matches!(db_err.code().as_deref(), Some("28P01") | Some("28000"));
    }
    false
}

/// Delay before retry `attempt` (1-based): `min(2^attempt, 30)s` plus up to 1s of jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let base_delay = std::cmp::min(1u64 << attempt.min(5), 30);
    Duration::from_secs(base_delay) + Duration::from_millis(fastrand::u64(0..1000))
}

/// Stand-in for "no timeout"; the pool always applies one.
const UNBOUNDED_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Pool acquire timeout for a configured number of seconds, 0 meaning none.
pub fn acquire_timeout(connect_timeout_secs: u32) -> Duration {
    if connect_timeout_secs == 0 {
        UNBOUNDED_ACQUIRE_TIMEOUT
    } else {
        Duration::from_secs(connect_timeout_secs as u64)
    }
}

/// Open a small connection pool, retrying up to `retries` times with exponential backoff + jitter.
///
/// Permanent errors (authentication failures) are not retried.
pub async fn connect_with_config(
    options: PgConnectOptions,
    retries: u32,
    connect_timeout_secs: u32,
) -> Result<PgPool> {
    let pool_options = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(acquire_timeout(connect_timeout_secs));

    let mut attempt = 0;
    loop {
        match pool_options.clone().connect_with(options.clone()).await {
            Ok(pool) => {
                if attempt > 0 {
                    log::info!(
                        "Connected successfully after retry; attempt={}, max_attempts={}",
                        attempt + 1,
                        retries + 1
                    );
                }
                return Ok(pool);
            }
            Err(e) if is_permanent_error(&e) => {
                log::error!("Permanent connection error, not retrying: {}", e);
                return Err(SwitchbackError::DatabaseError(e));
            }
            Err(e) if attempt >= retries => return Err(SwitchbackError::DatabaseError(e)),
            Err(e) => {
                attempt += 1;
                let delay = backoff_delay(attempt);
                log::info!(
                    "Connection attempt failed, retrying; attempt={}, max_attempts={}, delay_ms={}, error={}",
                    attempt + 1,
                    retries + 1,
                    delay.as_millis() as u64,
                    e
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
