//! Binary entrypoint for the flashcard trainer.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use flashcards::app::App;
use flashcards::config::Configuration;
use flashcards::playback::PlaybackDriver;
use flashcards::playback::audio::default_output;
use flashcards::playback::presenter::TerminalPresenter;
use flashcards::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "flashcards", version, about = "Timed image and audio flashcards")]
struct Cli {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Start straight into a deck (name, number or `all`) instead of the selection screen
    #[arg(long, value_name = "DECK")]
    deck: Option<String>,

    /// Deterministic RNG seed for card selection
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the settings file display time (ms)
    #[arg(long, value_name = "MILLIS")]
    display_time: Option<u64>,

    /// Override the settings file repeat count
    #[arg(long, value_name = "COUNT")]
    repeat_count: Option<u32>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive(format!("flashcards={level}").parse()?)
        .add_directive("symphonia=warn".parse()?);
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = Configuration::load(&cli.config)?;
    cfg.shuffle_seed = cli.seed.or(cfg.shuffle_seed);
    tracing::debug!("Loaded configuration from {}:\n{:#?}", cli.config.display(), cfg);

    let mut settings = Settings::load(&cfg.settings_file).with_context(|| {
        format!("invalid settings file {}", cfg.settings_file.display())
    })?;
    if let Some(ms) = cli.display_time {
        settings.display_time = ms;
    }
    if let Some(count) = cli.repeat_count {
        settings.repeat_count = count;
    }
    let settings = settings
        .validated()
        .context("invalid command-line settings")?;

    let playback = PlaybackDriver::new(
        default_output(),
        Box::new(TerminalPresenter::new(cfg.frame_output.clone())),
        cfg.frame_size,
    );
    let mut app = App::new(&cfg, settings, playback)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    // Stdin is read on a dedicated OS thread, not a runtime blocking task, so a
    // pending read never holds up runtime shutdown.
    let (line_tx, line_rx) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!("stdin read failed: {err}");
                    break;
                }
            }
        }
    });

    match cli.deck.as_deref() {
        Some(deck) => app.choose(deck),
        None => app.show_selection(),
    }
    app.run(line_rx, cancel).await
}
