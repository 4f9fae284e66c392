//! Maps parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{server, token, Action};
use crate::cli::commands::{auth, pagination, token as token_cmd, ARG_DSN, ARG_PORT};
use anyhow::{Context, Result};
use uuid::Uuid;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let auth_opts = auth::Options::parse(matches)?;

    if let Some(sub) = matches.subcommand_matches(token_cmd::CMD_TOKEN) {
        let user_id = sub
            .get_one::<Uuid>(token_cmd::ARG_USER_ID)
            .copied()
            .context("missing required argument: --user-id")?;
        return Ok(Action::Token(token::Args {
            dsn,
            jwt_secret: auth_opts.secret,
            jwt_duration_hours: auth_opts.duration_hours,
            user_id,
            hours: sub.get_one::<u64>(token_cmd::ARG_HOURS).copied(),
        }));
    }

    Ok(Action::Server(server::Args {
        port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
        dsn,
        jwt_secret: auth_opts.secret,
        jwt_duration_hours: auth_opts.duration_hours,
        page_limit: matches
            .get_one::<u32>(pagination::ARG_PAGE_LIMIT)
            .copied()
            .unwrap_or(crate::api::handlers::pagination::DEFAULT_LIMIT),
    }))
}
