mod app;
mod cli;
mod config;
mod counter;
mod frame;
mod gpu;
mod ui;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, anyhow};
use clap::{CommandFactory, Parser, error::ErrorKind};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use winit::event_loop::EventLoop;

use tracemon_core::CancelToken;

use crate::app::App;
use crate::cli::Args;
use crate::counter::HostCounter;

/// Exit status for failures after the arguments were accepted.
const EXIT_FATAL: u8 = 1;

/// Console logging on stderr, plus a plain-text copy when `log_file` is set.
/// The returned guard flushes the file writer on drop.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("log file '{}' has no file name", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy())
                .build(dir)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(guard)
}

fn run(args: &Args, source: HostCounter) -> anyhow::Result<()> {
    let config_path = args.config.clone().unwrap_or_else(config::default_path);
    let settings = config::load(&config_path)?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
            tracing::warn!("cannot install interrupt handler: {e}");
        }
    }

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(settings, Box::new(source), args.interval(), cancel);
    event_loop
        .run_app(&mut app)
        .context("event loop error")?;
    app.into_result()
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.list_counters {
        for line in counter::describe_counters() {
            println!("{line}");
        }
        return ExitCode::SUCCESS;
    }

    let Some(identifier) = args.counter.as_deref() else {
        Args::command()
            .error(ErrorKind::MissingRequiredArgument, "a counter identifier is required")
            .exit();
    };

    // Validate the counter before any thread (the log writer included) exists.
    let source = match HostCounter::open(identifier, args.interval()) {
        Ok(source) => source,
        Err(e) => Args::command().error(ErrorKind::InvalidValue, e).exit(),
    };

    let _log_guard = match init_logging(args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("tracemon: {e:#}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    tracing::info!(
        counter = identifier,
        interval_ms = args.interval_ms,
        rate = source.is_rate(),
        window_ms = source.sample_window().as_millis() as u64,
        "opened host counter"
    );

    match run(&args, source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
