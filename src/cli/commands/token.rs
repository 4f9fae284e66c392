use clap::{builder::ValueParser, Arg, Command};
use uuid::Uuid;

pub const CMD_TOKEN: &str = "token";
pub const ARG_USER_ID: &str = "user-id";
pub const ARG_HOURS: &str = "hours";

#[must_use]
pub fn validator_uuid() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<Uuid, String> {
        Uuid::parse_str(value.trim()).map_err(|err| format!("invalid uuid: {err}"))
    })
}

#[must_use]
pub fn subcommand() -> Command {
    Command::new(CMD_TOKEN)
        .about("Print a signed credential for an existing user")
        .arg(
            Arg::new(ARG_USER_ID)
                .long(ARG_USER_ID)
                .help("User to issue the credential for")
                .required(true)
                .value_parser(validator_uuid()),
        )
        .arg(
            Arg::new(ARG_HOURS)
                .long(ARG_HOURS)
                .help("Credential lifetime in hours (default: --jwt-duration)")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
