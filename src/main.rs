mod args;
mod config;

use std::{
    io::{self, BufRead},
    process::ExitCode,
    sync::Arc,
};

use clap::Parser;
use eyre::Context;
use sevlog::{remote, Caller, FileSink, LogSink, Severity};
use yansi::Paint;

use crate::{
    args::{Args, Command},
    config::Config,
};

fn main() -> ExitCode {
    yansi::whenever(yansi::Condition::STDERR_IS_TTY);
    let args = Args::parse();

    match run(args) {
        Err(err) => {
            let root = err.root_cause();

            eprintln!("{}", format!("Error: {}", err).red());
            eprintln!();
            eprintln!("{}", "Caused by:".red());
            eprintln!("{}", format!("  {}", root).red());
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::from(0),
    }
}

fn run(args: Args) -> eyre::Result<()> {
    if args.trace_remote {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(io::stderr)
            .init();
    }

    let config = Config::from_args(&args)?;

    let log_file = match &config.log_file {
        Some(path) => {
            let sink = FileSink::open(path).context("Failed setting up the log file")?;
            Some(Arc::new(sink) as Arc<dyn LogSink>)
        }
        None => None,
    };
    let logger = sevlog::init(&config.name, config.verbose, log_file);

    if let Some(dsn) = &config.dsn {
        // Remote reporting is optional; keep logging locally when it can't be set up.
        if let Err(err) = remote::connect_with_config(dsn, config.remote.clone()) {
            sevlog::error!("remote reporting disabled: {}", err);
        }
    }

    match args.cmd {
        Command::Info { message } => sevlog::info(message.join(" ")),
        Command::Warning { message } => sevlog::warning(message.join(" ")),
        Command::Error { message } => sevlog::error(message.join(" ")),
        Command::Fatal { message } => sevlog::fatal(message.join(" ")),
        Command::Pipe { severity } => {
            let severity = Severity::from(severity);
            for line in io::stdin().lock().lines() {
                let line = line.context("Failed reading stdin")?;
                logger.output(severity, &Caller::here(), &line);
            }
        }
    }

    logger.close();
    Ok(())
}
