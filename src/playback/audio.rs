use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, warn};

/// The single audio channel cards play through.
pub trait AudioOutput {
    /// Silence whatever is playing. Safe to call when idle.
    fn stop(&mut self);
    /// Start `path` from the beginning.
    fn play(&mut self, path: &Path) -> Result<()>;
}

/// Plays clips on the default output device, one `Sink` at a time.
pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
}

impl RodioOutput {
    pub fn open_default() -> Result<Self> {
        let stream =
            OutputStreamBuilder::open_default_stream().context("no audio output device")?;
        Ok(Self { stream, sink: None })
    }
}

impl AudioOutput for RodioOutput {
    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn play(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)?;
        let decoder = Decoder::new(BufReader::new(file)).context("unsupported audio data")?;
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(decoder);
        sink.play();
        debug!(path = %path.display(), "audio started");
        self.sink = Some(sink);
        Ok(())
    }
}

/// Stand-in when no output device is available; cards are shown without sound.
#[derive(Debug, Default)]
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn stop(&mut self) {}

    fn play(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "audio muted; skipping clip");
        Ok(())
    }
}

/// Open the default device, falling back to [`SilentOutput`].
pub fn default_output() -> Box<dyn AudioOutput> {
    match RodioOutput::open_default() {
        Ok(out) => Box::new(out),
        Err(err) => {
            warn!("audio disabled: {err:#}");
            Box::new(SilentOutput)
        }
    }
}
