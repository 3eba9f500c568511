use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Directory holding one subdirectory per deck, or a single flat deck.
    pub library_path: PathBuf,
    /// `key=value` training settings; relative paths resolve against the config file.
    pub settings_file: PathBuf,
    /// Fixed size every card image is scaled to, `[width, height]`.
    pub frame_size: [u32; 2],
    /// When set, each scaled frame is also written to this PNG path.
    pub frame_output: Option<PathBuf>,
    /// Optional deterministic seed for card selection.
    pub shuffle_seed: Option<u64>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)?;
        let mut cfg: Self = serde_yaml::from_str(&s)?;
        if let Some(base) = path.parent() {
            cfg.resolve_relative_to(base);
        }
        Ok(cfg)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.library_path.as_os_str().is_empty(),
            "library-path must be set"
        );
        ensure!(
            self.frame_size[0] > 0 && self.frame_size[1] > 0,
            "frame-size must be positive in both dimensions"
        );
        if let Some(out) = &self.frame_output {
            let ext = out
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            ensure!(
                ext.as_deref() == Some("png"),
                "frame-output must be a .png path"
            );
        }
        Ok(self)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.library_path, &mut self.settings_file] {
            if path.is_relative() && !path.as_os_str().is_empty() {
                *path = base.join(&*path);
            }
        }
        if let Some(out) = self.frame_output.as_mut().filter(|p| p.is_relative()) {
            *out = base.join(&*out);
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?
            .validated()
            .context("invalid configuration values")
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            library_path: PathBuf::new(),
            settings_file: PathBuf::from("settings.txt"),
            frame_size: [700, 700],
            frame_output: None,
            shuffle_seed: None,
        }
    }
}
