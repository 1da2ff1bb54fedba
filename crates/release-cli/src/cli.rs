//! CLI argument definitions for the release pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use release_cli::config::DEFAULT_CONFIG_FILE;
use release_cli::pipeline::Stage;

#[derive(Parser)]
#[command(
    name = "data-release",
    version,
    about = "Research data release pipeline",
    long_about = "Turn a free-text data request into a release directory.\n\n\
                  Parses the request, exports the requested tables from the research\n\
                  database, filters them to the requested assessment windows and\n\
                  participants, and summarizes the released participants."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Release configuration file.
    #[arg(
        long = "config",
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_FILE,
        global = true
    )]
    pub config: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the release pipeline.
    Run(RunArgs),

    /// Parse the request document and register the manifest.
    Parse(ReleaseArgs),

    /// Show the export plan resolved against the live database.
    Plan(ReleaseArgs),

    /// List the known assessment windows.
    Windows,
}

#[derive(Parser)]
pub struct ReleaseArgs {
    /// Release name from the configuration file.
    #[arg(value_name = "RELEASE")]
    pub release: String,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Release name from the configuration file.
    #[arg(value_name = "RELEASE")]
    pub release: String,

    /// First stage to run; earlier stages must have left their files.
    #[arg(long = "from", value_enum, default_value = "parse")]
    pub from: StageArg,

    /// Last stage to run.
    #[arg(long = "to", value_enum, default_value = "headerless")]
    pub to: StageArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StageArg {
    Parse,
    Export,
    Window,
    Exclude,
    Include,
    Summary,
    Headerless,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Parse => Stage::Parse,
            StageArg::Export => Stage::Export,
            StageArg::Window => Stage::Window,
            StageArg::Exclude => Stage::Exclude,
            StageArg::Include => Stage::Include,
            StageArg::Summary => Stage::Summary,
            StageArg::Headerless => Stage::Headerless,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
