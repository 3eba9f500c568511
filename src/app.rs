//! Application state machine: deck selection screen or an active session.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::catalog::{Deck, DeckChoice, discover_decks};
use crate::config::Configuration;
use crate::error::ResourceError;
use crate::events::{SESSION_HELP, SelectionCommand, SessionCommand};
use crate::playback::PlaybackDriver;
use crate::session::{Session, SessionReport};
use crate::settings::Settings;

pub enum AppState {
    SelectionScreen,
    ActiveSession(Session),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    library: PathBuf,
    settings: Settings,
    seed: Option<u64>,
    decks: Vec<Deck>,
    playback: PlaybackDriver,
    state: AppState,
    /// Menus and help text; stdout unless replaced.
    screen: Box<dyn Write>,
}

impl App {
    pub fn new(cfg: &Configuration, settings: Settings, playback: PlaybackDriver) -> Result<Self> {
        let decks = discover_decks(&cfg.library_path)?;
        info!(
            library = %cfg.library_path.display(),
            decks = decks.len(),
            "library opened"
        );
        Ok(Self {
            library: cfg.library_path.clone(),
            settings,
            seed: cfg.shuffle_seed,
            decks,
            playback,
            state: AppState::SelectionScreen,
            screen: Box::new(std::io::stdout()),
        })
    }

    /// Send menus and help text to `screen` instead of stdout.
    pub fn with_screen(mut self, screen: Box<dyn Write>) -> Self {
        self.screen = screen;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    /// Drive the app from operator input lines until quit, EOF or cancellation.
    pub async fn run(
        mut self,
        mut lines: Receiver<String>,
        cancel: CancellationToken,
    ) -> Result<()> {
        loop {
            select! {
                _ = cancel.cancelled() => break,

                maybe_line = lines.recv() => match maybe_line {
                    Some(line) => {
                        if self.handle_line(&line) == Flow::Quit {
                            break;
                        }
                    }
                    None => {
                        info!("input closed; shutting down");
                        break;
                    }
                },

                _ = self.tick_due() => self.on_tick(),
            }
        }
        self.shutdown();
        Ok(())
    }

    async fn tick_due(&mut self) {
        match &mut self.state {
            AppState::ActiveSession(session) => session.next_tick().await,
            AppState::SelectionScreen => std::future::pending().await,
        }
    }

    fn on_tick(&mut self) {
        if let AppState::ActiveSession(session) = &mut self.state
            && let Err(err) = session.on_tick(&mut self.playback)
        {
            notice(&format!("{err:#}"));
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Flow {
        match self.state {
            AppState::SelectionScreen => match line.parse::<SelectionCommand>() {
                Ok(SelectionCommand::Quit) => Flow::Quit,
                Ok(SelectionCommand::Choose(choice)) => {
                    self.choose(&choice);
                    Flow::Continue
                }
                Err(err) => {
                    notice(&err.to_string());
                    self.show_selection();
                    Flow::Continue
                }
            },
            AppState::ActiveSession(_) => match line.parse::<SessionCommand>() {
                Ok(cmd) => self.handle_session_command(cmd),
                Err(err) => {
                    notice(&err.to_string());
                    Flow::Continue
                }
            },
        }
    }

    /// Start a session for a deck picked on the selection screen.
    pub fn choose(&mut self, input: &str) {
        let directories = match DeckChoice::parse(input, &self.decks)
            .and_then(|choice| choice.resolve(&self.decks))
        {
            Ok(dirs) => dirs,
            Err(err) => {
                notice(&err.to_string());
                self.show_selection();
                return;
            }
        };
        self.return_to_selection();
        match Session::start(directories, &self.settings, self.seed, &mut self.playback) {
            Ok((session, report)) => {
                report_session(&report);
                self.say(SESSION_HELP);
                self.state = AppState::ActiveSession(session);
            }
            Err(err) => {
                report_resource_error(&err);
                self.show_selection();
            }
        }
    }

    fn handle_session_command(&mut self, cmd: SessionCommand) -> Flow {
        let AppState::ActiveSession(session) = &mut self.state else {
            return Flow::Continue;
        };
        match cmd {
            SessionCommand::Replay => {
                if let Err(err) = session.on_replay_requested(&mut self.playback) {
                    notice(&format!("{err:#}"));
                }
            }
            SessionCommand::SetInterval(ms) => {
                if let Err(err) = session.on_interval_changed(ms) {
                    notice(&err.to_string());
                }
            }
            SessionCommand::SetRepeat(count) => {
                if let Err(err) = session.on_repeat_count_changed(count) {
                    notice(&err.to_string());
                }
            }
            SessionCommand::ChangeDeck(input) => {
                match DeckChoice::parse(&input, &self.decks)
                    .and_then(|choice| choice.resolve(&self.decks))
                {
                    Ok(dirs) => match session.on_directory_changed(dirs, &mut self.playback) {
                        Ok(report) => report_session(&report),
                        Err(err) => report_resource_error(&err),
                    },
                    Err(err) => notice(&err.to_string()),
                }
            }
            SessionCommand::MainMenu => {
                self.return_to_selection();
                self.show_selection();
            }
            SessionCommand::Help => self.say(SESSION_HELP),
            SessionCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Tear down any running session and go back to the selection screen.
    pub fn return_to_selection(&mut self) {
        if let AppState::ActiveSession(session) =
            std::mem::replace(&mut self.state, AppState::SelectionScreen)
        {
            session.teardown(&mut self.playback);
            info!("returned to deck selection");
        }
    }

    pub fn show_selection(&mut self) {
        let mut menu = format!("decks in {}:\n", self.library.display());
        for (i, deck) in self.decks.iter().enumerate() {
            menu.push_str(&format!("  {}) {}\n", i + 1, deck.name));
        }
        menu.push_str("  all) every deck\nchoose a deck (q to quit):");
        self.say(&menu);
    }

    fn say(&mut self, text: &str) {
        if let Err(err) = writeln!(self.screen, "{text}").and_then(|()| self.screen.flush()) {
            warn!("screen write failed: {err}");
        }
    }

    fn shutdown(&mut self) {
        self.return_to_selection();
        self.playback.stop();
    }
}

/// Operator-facing message. Always logged as well as printed.
fn notice(message: &str) {
    warn!("{message}");
    eprintln!("! {message}");
}

fn report_session(report: &SessionReport) {
    for problem in &report.problems {
        notice(&problem.to_string());
    }
    if let Some(err) = &report.render_error {
        notice(&format!("{err:#}"));
    }
}

fn report_resource_error(err: &ResourceError) {
    if let ResourceError::EmptyCatalog { problems } = err {
        for problem in problems {
            notice(&problem.to_string());
        }
    }
    notice(&err.to_string());
}
