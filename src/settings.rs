//! Training settings read once at startup from a plain `key=value` file.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::ConfigError;

pub const MIN_DISPLAY_TIME_MS: u64 = 1_000;
pub const MAX_DISPLAY_TIME_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// How long each tick lasts, in milliseconds.
    pub display_time: u64,
    /// Consecutive ticks a card is held before the rotation advances.
    pub repeat_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_time: 5_000,
            repeat_count: 1,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let settings = Self::parse(&text)?;
                info!(
                    path = %path.display(),
                    display_time = settings.display_time,
                    repeat_count = settings.repeat_count,
                    "loaded settings"
                );
                Ok(settings)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "settings file not found; using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::Parse {
                    line,
                    reason: format!("expected key=value, found {trimmed:?}"),
                });
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "" => {
                    return Err(ConfigError::Parse {
                        line,
                        reason: "empty key".into(),
                    });
                }
                "display_time" => settings.display_time = parse_int(line, key, value)?,
                "repeat_count" => settings.repeat_count = parse_int(line, key, value)?,
                other => warn!(line, key = other, "ignoring unknown settings key"),
            }
        }
        settings.validated()
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        validate_display_time(self.display_time)?;
        validate_repeat_count(self.repeat_count)?;
        Ok(self)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.display_time)
    }
}

pub fn validate_display_time(ms: u64) -> Result<(), ConfigError> {
    if (MIN_DISPLAY_TIME_MS..=MAX_DISPLAY_TIME_MS).contains(&ms) {
        Ok(())
    } else {
        Err(ConfigError::IntervalOutOfRange {
            ms,
            min: MIN_DISPLAY_TIME_MS,
            max: MAX_DISPLAY_TIME_MS,
        })
    }
}

pub fn validate_repeat_count(count: u32) -> Result<(), ConfigError> {
    if count >= 1 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRepeatCount(count))
    }
}

fn parse_int<T: std::str::FromStr>(line: usize, key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    debug!(line, key, value, "settings entry");
    value.parse().map_err(|err| ConfigError::Parse {
        line,
        reason: format!("{key}: {value:?} is not an integer ({err})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_keys() {
        let settings = Settings::parse("display_time=3000\nrepeat_count=2").unwrap();
        assert_eq!(
            settings,
            Settings {
                display_time: 3000,
                repeat_count: 2
            }
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# trainer\n\n  display_time = 1500 \n";
        let settings = Settings::parse(text).unwrap();
        assert_eq!(settings.display_time, 1500);
        assert_eq!(settings.repeat_count, 1);
    }

    #[test]
    fn missing_equals_is_a_parse_error() {
        let err = Settings::parse("display_time=3000\nrepeat_count 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn non_integer_value_is_rejected() {
        let err = Settings::parse("display_time=soon").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            Settings::parse("display_time=500"),
            Err(ConfigError::IntervalOutOfRange { ms: 500, .. })
        ));
        assert!(matches!(
            Settings::parse("repeat_count=0"),
            Err(ConfigError::InvalidRepeatCount(0))
        ));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let settings = Settings::parse("volume=7\nrepeat_count=3").unwrap();
        assert_eq!(settings.repeat_count, 3);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.txt")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
