use crate::{api::handlers::auth::directory::load_identity, token::TokenCodec};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use uuid::Uuid;

use super::server::ttl_from_hours;

#[derive(Debug)]
pub struct Args {
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub jwt_duration_hours: u64,
    pub user_id: Uuid,
    pub hours: Option<u64>,
}

/// Load the user's company and roles, then print a signed credential.
/// # Errors
/// Returns an error if the user does not exist or the database is unreachable.
pub async fn execute(args: Args) -> Result<()> {
    let codec = TokenCodec::new(args.jwt_secret, ttl_from_hours(args.jwt_duration_hours)?)?;
    let ttl = match args.hours {
        Some(hours) => ttl_from_hours(hours)?,
        None => codec.ttl(),
    };

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let identity = load_identity(&pool, args.user_id)
        .await?
        .ok_or_else(|| anyhow!("user {} not found", args.user_id))?;

    let token = codec.issue_with_ttl(
        identity.user_id,
        identity.company_id,
        &identity.roles,
        ttl,
    )?;

    info!(
        user_id = %identity.user_id,
        company_id = %identity.company_id,
        roles = identity.roles.len(),
        "credential issued"
    );

    println!("{token}");

    pool.close().await;

    Ok(())
}
