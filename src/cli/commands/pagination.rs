use clap::{builder::ValueParser, Arg, Command};

use crate::api::handlers::pagination::ALLOWED_LIMITS;

pub const ARG_PAGE_LIMIT: &str = "page-limit";

#[must_use]
pub fn validator_page_limit() -> ValueParser {
    ValueParser::from(move |limit: &str| -> std::result::Result<u32, String> {
        match limit.trim().parse::<u32>() {
            Ok(parsed) if ALLOWED_LIMITS.contains(&parsed) => Ok(parsed),
            _ => Err(format!("page limit must be one of {ALLOWED_LIMITS:?}")),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_PAGE_LIMIT)
            .long(ARG_PAGE_LIMIT)
            .help("Default page size for list endpoints")
            .env("HRDESK_PAGINATION_LIMIT")
            .default_value("10")
            .value_parser(validator_page_limit()),
    )
}
