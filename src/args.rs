use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use sevlog::Severity;

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "Write severity-tagged log records locally and to a remote error-reporting backend.", long_about = None, disable_help_subcommand = true)]
pub struct Args {
    #[arg(
        global = true,
        long,
        default_value = "sevlog",
        help = "Logger name, reported with every remote event.",
        display_order = 0
    )]
    pub name: String,

    #[arg(
        global = true,
        long,
        short = 'v',
        help = "Also write Info/Warning to stdout and Error/Fatal to stderr.",
        display_order = 0
    )]
    pub verbose: bool,

    #[arg(
        global = true,
        long,
        env = "SEVLOG_LOG_FILE",
        help = "Append every record to this file.",
        display_order = 1
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        global = true,
        long,
        help = "Without --log-file, append to <data dir>/<name>/<name>.log.",
        display_order = 1
    )]
    pub persist: bool,

    #[arg(
        global = true,
        long,
        env = "SEVLOG_DSN",
        help = "Remote backend destination, e.g. https://<key>@<host>/<project>.",
        display_order = 2
    )]
    pub dsn: Option<String>,

    #[arg(global = true, long, value_parser = parse_duration, default_value = "3s", display_order = 2)]
    pub flush_timeout: Duration,

    #[arg(global = true, long, value_parser = parse_duration, default_value = "10s", display_order = 2)]
    pub request_timeout: Duration,

    #[arg(
        global = true,
        long,
        help = "Print remote delivery diagnostics to stderr.",
        display_order = 999
    )]
    pub trace_remote: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Info { message: Vec<String> },

    Warning { message: Vec<String> },

    Error { message: Vec<String> },

    /// Log, flush, and exit with status 1.
    Fatal { message: Vec<String> },

    /// Log every line read from stdin.
    Pipe {
        #[arg(long, short, value_enum, default_value_t = Level::Info)]
        severity: Level,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Info => Severity::Info,
            Level::Warning => Severity::Warning,
            Level::Error => Severity::Error,
        }
    }
}

fn parse_duration(value: &str) -> eyre::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}
