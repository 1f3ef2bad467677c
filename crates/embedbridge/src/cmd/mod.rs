use clap::{Args, Subcommand, ValueEnum};
use embedbridge_frame::MessageKind;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod replay;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build one page → host wire message.
    Encode(EncodeArgs),
    /// Validate a host → page message the way the dispatcher does.
    Decode(DecodeArgs),
    /// Run a scripted session against an in-memory host.
    Replay(ReplayArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EncodeKind {
    Ready,
    Data,
    Message,
    Resize,
    Close,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Message to build.
    pub kind: EncodeKind,
    /// Page id. Generated when omitted.
    #[arg(long)]
    pub page_id: Option<String>,
    /// JSON payload for `data`.
    #[arg(long, value_name = "JSON")]
    pub json: Option<String>,
    /// JSON object of display options for `data`.
    #[arg(long, value_name = "JSON")]
    pub options: Option<String>,
    /// Text for `message`.
    #[arg(long)]
    pub text: Option<String>,
    /// Message type for `message` (info, success, error, data).
    #[arg(long, default_value = "info")]
    pub message_type: MessageKind,
    /// Frame height in pixels for `resize`.
    #[arg(long)]
    pub height: Option<u32>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Inbound message as JSON.
    #[arg(conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the message from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON-lines script of session steps.
    pub script: PathBuf,
    /// Origin of the simulated host window.
    #[arg(long, env = "EMBEDBRIDGE_HOST_ORIGIN", default_value = "https://host.example")]
    pub host_origin: String,
    /// Referrer reported by the simulated document. Defaults to the host origin.
    #[arg(long, conflicts_with = "no_referrer")]
    pub referrer: Option<String>,
    /// Simulate a document without a referrer.
    #[arg(long)]
    pub no_referrer: bool,
    /// Simulate a page loaded top-level, with no host.
    #[arg(long)]
    pub top_level: bool,
    /// Session options as a JSON file (pageId, targetOrigin, allowWildcard, allowedOrigins).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Page id; overrides the config file.
    #[arg(long)]
    pub page_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
