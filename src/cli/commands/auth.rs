//! Credential signing configuration.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_JWT_DURATION: &str = "jwt-duration";

#[derive(Debug, Clone)]
pub struct Options {
    pub secret: SecretString,
    /// Credential lifetime in hours.
    pub duration_hours: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if either value is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;
        let duration_hours = matches
            .get_one::<u64>(ARG_JWT_DURATION)
            .copied()
            .context("missing required argument: --jwt-duration")?;
        Ok(Self {
            secret: SecretString::from(secret),
            duration_hours,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign and verify session credentials")
                .env("JWT_SECRET")
                .hide_env_values(true)
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new()),
        )
        .arg(
            Arg::new(ARG_JWT_DURATION)
                .long(ARG_JWT_DURATION)
                .help("Credential lifetime in hours")
                .env("JWT_DURATION")
                .required(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
