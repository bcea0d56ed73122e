//! CLI entrypoint for colloquy
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colloquy_application::{ConversationManager, ErrorSink, NoErrorSink, NoProgress};
use colloquy_domain::SessionId;
use colloquy_infrastructure::{
    ConfigIssueCode, ConfigLoader, EchoProviderGateway, FileConfig, InMemorySessionStore,
    JsonlErrorSink, RoutingProviderGateway,
};
use colloquy_presentation::{Cli, ConsoleFormatter, OutputConfig, OutputFormat, ProgressReporter};
use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const STATS_POLL: Duration = Duration::from_millis(250);

const DEFAULT_PROMPT: &str = "Introduce yourselves and pick a topic worth discussing.";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    check_config(&config, cli.dry_run)?;

    let output = OutputConfig {
        color: config.output.color && !cli.no_color,
        show_skips: config.output.show_skips,
        show_stats: config.output.show_stats,
    };
    if !output.color {
        colored::control::set_override(false);
    }

    info!("Starting colloquy");

    // === Dependency Injection ===
    let session_id = SessionId::new(cli.session.clone().unwrap_or(config.session.id.clone()));
    let roster = config.roster()?;

    let store = Arc::new(InMemorySessionStore::new());
    store.create_session(session_id.clone());
    for participant in &roster {
        store.add_participant(&session_id, participant.clone())?;
    }

    let gateway = if cli.dry_run {
        RoutingProviderGateway::new()
            .with_backend("echo", Arc::new(EchoProviderGateway::new()))
            .with_default("echo")
    } else {
        RoutingProviderGateway::from_config(&config.providers)
    };

    // JsonlErrorSink::new logs why the file could not be opened
    let sink: Arc<dyn ErrorSink> = match config
        .error_log
        .resolved_path()
        .filter(|_| config.error_log.enabled)
        .and_then(|path| JsonlErrorSink::new(path))
    {
        Some(sink) => Arc::new(sink),
        None => Arc::new(NoErrorSink),
    };

    let mut manager = ConversationManager::new(
        store,
        Arc::new(gateway),
        sink,
        config.to_engine_config(),
    );
    if cli.quiet {
        manager = manager.with_progress(Arc::new(NoProgress));
    } else {
        manager = manager.with_progress(Arc::new(ProgressReporter::new(output.clone())));
    }

    let prompt = cli
        .prompt
        .clone()
        .or_else(|| config.session.prompt.clone())
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());
    let max_turns = cli.max_turns.or(config.session.max_turns);

    if !cli.quiet {
        println!("{}", ConsoleFormatter::header(&session_id, &prompt, &roster));
    }

    manager.start(&session_id, Some(&prompt)).await?;

    let mut ticker = tokio::time::interval(STATS_POLL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping session {}", session_id);
                break;
            }
            _ = ticker.tick() => {
                if !manager.is_active(&session_id) {
                    break;
                }
                let reached = manager
                    .stats(&session_id)
                    .zip(max_turns)
                    .is_some_and(|(stats, max)| stats.message_count >= max);
                if reached {
                    info!("Reached {} messages, stopping", max_turns.unwrap_or_default());
                    break;
                }
            }
        }
    }

    // Stats are gone once stop() unregisters the session
    let stats = manager.stats(&session_id);
    manager.shutdown().await;

    if let Some(stats) = stats
        && (output.show_stats || cli.quiet)
    {
        match cli.output {
            OutputFormat::Text => println!("{}", ConsoleFormatter::stats(&stats)),
            OutputFormat::Json => println!("{}", ConsoleFormatter::stats_json(&stats)),
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level.
///
/// `RUST_LOG` wins over `-v` when set.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

/// Print config issues and bail on errors.
///
/// Provider routing problems don't matter for `--dry-run`.
fn check_config(config: &FileConfig, dry_run: bool) -> Result<()> {
    let issues: Vec<_> = config
        .validate()
        .into_iter()
        .filter(|issue| {
            !(dry_run
                && matches!(
                    issue.code,
                    ConfigIssueCode::UnknownProvider { .. } | ConfigIssueCode::MissingCommand { .. }
                ))
        })
        .collect();

    for issue in &issues {
        if issue.is_error() {
            eprintln!("error: {}", issue.message);
        } else {
            eprintln!("warning: {}", issue.message);
        }
    }

    let errors = issues.iter().filter(|issue| issue.is_error()).count();
    if errors > 0 {
        bail!("Configuration has {} error(s)", errors);
    }
    Ok(())
}
