//! One running training session: catalog, rotation and the tick timer.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{ConfigError, PlaybackError, ResourceError};
use crate::playback::PlaybackDriver;
use crate::rotation::RotationScheduler;
use crate::settings::Settings;
use crate::timer::TickTimer;

/// Owns everything that lives for one deck selection. Playback is borrowed
/// per call so the audio device outlives sessions.
#[derive(Debug)]
pub struct Session {
    directories: Vec<PathBuf>,
    catalog: Catalog,
    scheduler: RotationScheduler,
    timer: TickTimer,
}

/// What starting or reloading a session produced besides the session itself.
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Directories that were skipped during the scan.
    pub problems: Vec<ResourceError>,
    /// The first render failed; the session still runs.
    pub render_error: Option<PlaybackError>,
}

impl Session {
    /// Load the catalog, show the first card and arm the tick timer.
    ///
    /// Fails when no card could be loaded; nothing is left running then.
    #[instrument(skip_all, fields(directories = directories.len()))]
    pub fn start(
        directories: Vec<PathBuf>,
        settings: &Settings,
        seed: Option<u64>,
        playback: &mut PlaybackDriver,
    ) -> Result<(Self, SessionReport), ResourceError> {
        let scan = Catalog::load(&directories)?;
        let mut scheduler = RotationScheduler::from_settings(settings, seed);
        let len = nonzero_len(&scan.catalog)?;
        let first = scheduler.start(len);

        let mut session = Self {
            directories,
            catalog: scan.catalog,
            scheduler,
            timer: TickTimer::new(),
        };
        let render_error = session.render(first, playback).err();
        session.timer.arm(session.scheduler.interval());
        info!(
            cards = session.catalog.len(),
            interval_ms = session.scheduler.interval().as_millis() as u64,
            repeat = session.scheduler.repeat_target(),
            "session started"
        );
        Ok((
            session,
            SessionReport {
                problems: scan.problems,
                render_error,
            },
        ))
    }

    /// Resolves when the rotation is due for its next tick.
    pub async fn next_tick(&mut self) {
        self.timer.fired().await;
    }

    pub fn on_tick(&mut self, playback: &mut PlaybackDriver) -> Result<(), PlaybackError> {
        match self.scheduler.tick() {
            Some(index) => self.render(index, playback),
            None => Ok(()),
        }
    }

    /// Show the current card again without touching the rotation or the timer.
    pub fn on_replay_requested(
        &mut self,
        playback: &mut PlaybackDriver,
    ) -> Result<(), PlaybackError> {
        match self.scheduler.replay() {
            Some(index) => self.render(index, playback),
            None => Ok(()),
        }
    }

    /// Replace the catalog with one loaded from `directories` and restart the rotation.
    ///
    /// On failure the current catalog keeps running untouched.
    #[instrument(skip_all, fields(directories = directories.len()))]
    pub fn on_directory_changed(
        &mut self,
        directories: Vec<PathBuf>,
        playback: &mut PlaybackDriver,
    ) -> Result<SessionReport, ResourceError> {
        let scan = Catalog::load(&directories)?;
        let len = nonzero_len(&scan.catalog)?;
        self.timer.cancel();
        self.catalog = scan.catalog;
        self.directories = directories;
        let first = self.scheduler.restart(len);
        let render_error = self.render(first, playback).err();
        self.timer.arm(self.scheduler.interval());
        info!(cards = self.catalog.len(), "catalog reloaded");
        Ok(SessionReport {
            problems: scan.problems,
            render_error,
        })
    }

    /// Validate `ms`, then replace the pending tick with one at the new interval.
    pub fn on_interval_changed(&mut self, ms: u64) -> Result<(), ConfigError> {
        self.scheduler.set_interval(ms)?;
        self.timer.arm(self.scheduler.interval());
        info!(interval_ms = ms, "display time changed");
        Ok(())
    }

    pub fn on_repeat_count_changed(&mut self, count: u32) -> Result<(), ConfigError> {
        self.scheduler.set_repeat_target(count)?;
        info!(repeat = count, "repeat count changed");
        Ok(())
    }

    /// Stop the timer before the audio, then drop the catalog.
    pub fn teardown(mut self, playback: &mut PlaybackDriver) {
        self.timer.cancel();
        playback.stop();
        debug!(cards = self.catalog.len(), "session torn down");
    }

    fn render(
        &mut self,
        index: usize,
        playback: &mut PlaybackDriver,
    ) -> Result<(), PlaybackError> {
        match playback.render(&self.catalog, index) {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(index, "render skipped: {err:#}");
                Err(err)
            }
        }
    }

    pub fn current_entry(&self) -> Option<&CatalogEntry> {
        self.scheduler.current().and_then(|i| self.catalog.get(i))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }
}

fn nonzero_len(catalog: &Catalog) -> Result<NonZeroUsize, ResourceError> {
    NonZeroUsize::new(catalog.len()).ok_or_else(|| ResourceError::EmptyCatalog {
        problems: Vec::new(),
    })
}
