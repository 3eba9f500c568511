use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::{debug, info};

/// Where a prepared card ends up.
pub trait Presenter {
    fn present(&mut self, label: &str, frame: &RgbaImage) -> Result<()>;
}

/// Announces each card on stdout and optionally mirrors the frame to a PNG.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    frame_output: Option<PathBuf>,
}

impl TerminalPresenter {
    pub fn new(frame_output: Option<PathBuf>) -> Self {
        Self { frame_output }
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, label: &str, frame: &RgbaImage) -> Result<()> {
        if let Some(out) = &self.frame_output {
            // Write next to the target then rename so viewers never see a partial file.
            let tmp = out.with_extension("tmp.png");
            frame
                .save(&tmp)
                .with_context(|| format!("failed to write frame to {}", tmp.display()))?;
            std::fs::rename(&tmp, out)
                .with_context(|| format!("failed to replace {}", out.display()))?;
            debug!(path = %out.display(), "frame written");
        }
        info!(label, "showing card");
        println!("\n    {label}\n");
        Ok(())
    }
}
