use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// `HRDESK_LOG_LEVEL` takes either a level name or its index in
/// [`LEVEL_NAMES`]; `-v` flags are counted.
fn parse_log_level(level: &str) -> Result<u8, String> {
    let level = level.trim().to_lowercase();
    if let Ok(parsed) = level.parse::<u8>() {
        if usize::from(parsed) < LEVEL_NAMES.len() {
            return Ok(parsed);
        }
    }
    LEVEL_NAMES
        .iter()
        .position(|name| *name == level)
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level, expected one of {LEVEL_NAMES:?} or 0-4"))
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(parse_log_level)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level, repeat for more: -v WARN, -vv INFO, -vvv DEBUG, -vvvv TRACE")
            .env("HRDESK_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
