mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "embedbridge", version, about = "Embedded-page messaging bridge CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). Overridden by EMBEDBRIDGE_LOG when set.
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "embedbridge",
            "encode",
            "resize",
            "--page-id",
            "p1",
            "--height",
            "320",
        ])
        .expect("encode should parse");

        match cli.command {
            Command::Encode(args) => {
                assert_eq!(args.page_id.as_deref(), Some("p1"));
                assert_eq!(args.height, Some(320));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "embedbridge",
            "decode",
            r#"{"type":"parent_ready"}"#,
            "--format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("decode should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }

    #[test]
    fn rejects_unknown_message_type() {
        let result = Cli::try_parse_from([
            "embedbridge",
            "encode",
            "message",
            "--text",
            "hi",
            "--message-type",
            "shout",
        ]);
        assert!(result.is_err());
    }
}
