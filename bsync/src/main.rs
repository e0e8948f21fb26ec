// bsync/src/main.rs
use std::fs;
use std::process;

use bsync_common::config::Config;
use bsync_common::error::{BsyncError, Result as BsyncResult};
use clap::Parser;
use colored::Colorize;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::CliArgs;

fn init_logging(config: &Config, verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let max_log_level = level_filter.into_level().unwrap_or(tracing::Level::INFO);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("BSYNC_LOG")
        .from_env_lossy();

    let log_dir = config.logs_dir();
    if verbose == 0 {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .without_time()
            .try_init();
        return;
    }

    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!(
            "{} Failed to create log directory {}: {}",
            "Warning:".yellow(),
            log_dir.display(),
            e
        );
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .without_time()
            .try_init();
        return;
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "bsync.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_writer = std::io::stderr.with_max_level(max_log_level);
    let file_writer = non_blocking_appender.with_max_level(max_log_level);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr_writer.and(file_writer))
        .with_ansi(true)
        .without_time()
        .try_init();

    // Flushes the file writer; must live until exit.
    Box::leak(Box::new(guard));

    debug!(
        "Verbose logging enabled. Writing logs to: {}/bsync.log",
        log_dir.display()
    );
}

#[tokio::main]
async fn main() -> BsyncResult<()> {
    let cli_args = CliArgs::parse();

    let mut config = Config::load()
        .map_err(|e| BsyncError::Config(format!("Could not load config: {e}")))?;
    if let Some(file) = &cli_args.file {
        config = config.with_manifest(file.clone());
    }

    init_logging(&config, cli_args.verbose);
    debug!("Using Brewfile {}", config.manifest_path().display());

    if let Err(e) = cli_args.command.run(&config).await {
        if e.is_interrupted() {
            debug!("Command interrupted: {}", e);
        } else {
            error!("Command failed: {:#}", e);
        }
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(e.exit_code());
    }

    debug!("Command completed successfully.");
    Ok(())
}
