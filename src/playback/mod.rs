//! Presents one catalog entry: scaled image, label and audio clip.

pub mod audio;
pub mod frame;
pub mod presenter;

use tracing::debug;

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::PlaybackError;
use audio::AudioOutput;
use presenter::Presenter;

pub struct PlaybackDriver {
    audio: Box<dyn AudioOutput>,
    presenter: Box<dyn Presenter>,
    frame_size: [u32; 2],
}

impl PlaybackDriver {
    pub fn new(
        audio: Box<dyn AudioOutput>,
        presenter: Box<dyn Presenter>,
        frame_size: [u32; 2],
    ) -> Self {
        Self {
            audio,
            presenter,
            frame_size,
        }
    }

    /// Show `catalog[index]` and restart audio with its clip.
    ///
    /// An image that fails to decode leaves the display and the audio as they were.
    pub fn render<'a>(
        &mut self,
        catalog: &'a Catalog,
        index: usize,
    ) -> Result<&'a CatalogEntry, PlaybackError> {
        let entry = catalog.get(index).ok_or(PlaybackError::NoSuchEntry {
            index,
            len: catalog.len(),
        })?;
        let [width, height] = self.frame_size;
        let scaled = frame::prepare_frame(&entry.image, width, height).map_err(|source| {
            PlaybackError::Image {
                path: entry.image.clone(),
                source,
            }
        })?;
        self.presenter
            .present(&entry.label, &scaled)
            .map_err(|source| PlaybackError::Present {
                label: entry.label.clone(),
                source,
            })?;

        self.audio.stop();
        self.audio
            .play(&entry.audio)
            .map_err(|source| PlaybackError::Audio {
                path: entry.audio.clone(),
                source,
            })?;
        debug!(index, label = %entry.label, "rendered");
        Ok(entry)
    }

    pub fn stop(&mut self) {
        self.audio.stop();
    }
}
