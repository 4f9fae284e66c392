use crate::{api, api::handlers::pagination::PaginationConfig, token::TokenCodec};
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub jwt_duration_hours: u64,
    pub page_limit: u32,
}

/// Credential lifetime from a whole number of hours.
/// # Errors
/// Returns an error if the duration overflows.
pub fn ttl_from_hours(hours: u64) -> Result<Duration> {
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow!("credential duration of {hours} hours is too large"))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let ttl = ttl_from_hours(args.jwt_duration_hours)?;
    let codec = Arc::new(TokenCodec::new(args.jwt_secret, ttl)?);
    let pagination = PaginationConfig::new(args.page_limit).map_err(|err| anyhow!(err))?;

    debug!(?codec, page_limit = args.page_limit, "starting server");

    api::new(args.port, args.dsn, codec, pagination).await
}
