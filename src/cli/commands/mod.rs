pub mod auth;
pub mod logging;
pub mod pagination;
pub mod token;

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};
use url::Url;

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";

#[must_use]
pub fn validator_dsn() -> ValueParser {
    ValueParser::from(move |dsn: &str| -> std::result::Result<String, String> {
        let url = Url::parse(dsn).map_err(|err| format!("invalid DSN: {err}"))?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(dsn.to_string()),
            scheme => Err(format!("unsupported DSN scheme: {scheme}")),
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("hrdesk")
        .about("Multi-tenant HR operations backend")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("HRDESK_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("HRDESK_DSN")
                .required(true)
                .value_parser(validator_dsn()),
        )
        .subcommand(token::subcommand());

    let command = auth::with_args(command);
    let command = pagination::with_args(command);
    logging::with_args(command)
}
