//! Configuration
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! JSON file, then `STEGO_`-prefixed environment variables. The result is
//! validated before use.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::audio::{AudioLimits, MAX_AUDIO_DURATION_SECS, MAX_FRAME_RATE, MIN_FRAME_RATE};
use crate::error::{Result, StegoError};
use crate::payload::ParseMode;

/// Prefix for environment overrides (`STEGO_MAX_FRAME_RATE=44100`)
pub const ENV_PREFIX: &str = "STEGO_";

/// Default maximum accepted input file size (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lowest accepted sample rate in Hz
    pub min_frame_rate: u32,
    /// Highest accepted sample rate in Hz
    pub max_frame_rate: u32,
    /// Longest accepted clip in seconds
    pub max_audio_duration_secs: f64,
    /// Largest accepted input file in bytes
    pub max_file_size: u64,
    pub allowed_image_extensions: BTreeSet<String>,
    pub allowed_audio_extensions: BTreeSet<String>,
    /// Where outputs without an explicit path are written
    pub output_dir: PathBuf,
    /// Default log filter for the CLI
    pub log_level: String,
    /// Fail extraction when the declared audio length disagrees with the payload
    pub strict_length_check: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_frame_rate: MIN_FRAME_RATE,
            max_frame_rate: MAX_FRAME_RATE,
            max_audio_duration_secs: MAX_AUDIO_DURATION_SECS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_image_extensions: ["png", "jpg", "jpeg", "bmp"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_audio_extensions: std::iter::once("wav".to_string()).collect(),
            output_dir: PathBuf::from("output"),
            log_level: "info".to_string(),
            strict_length_check: true,
        }
    }
}

impl Config {
    /// Resolve configuration from defaults, an optional file and the process
    /// environment.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                warn!(
                    "Configuration file {} not found, using defaults",
                    path.display()
                );
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env(std::env::vars_os())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents).map_err(|e| StegoError::InvalidConfig {
            reason: format!("{}: {}", path.display(), e),
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Apply `STEGO_*` overrides from an iterator of environment pairs.
    ///
    /// List values are comma separated. Unknown `STEGO_` keys and keys that
    /// are not valid UTF-8 are ignored; a `STEGO_` value that is not valid
    /// UTF-8 is an error.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        for (key, value) in vars {
            let Ok(key) = key.into_string() else {
                continue;
            };
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value
                .into_string()
                .map_err(|raw| StegoError::InvalidConfig {
                    reason: format!("{} is not valid UTF-8: {:?}", key, raw),
                })?;

            match name {
                "MIN_FRAME_RATE" => self.min_frame_rate = parse_env(&key, &value)?,
                "MAX_FRAME_RATE" => self.max_frame_rate = parse_env(&key, &value)?,
                "MAX_AUDIO_DURATION" => self.max_audio_duration_secs = parse_env(&key, &value)?,
                "MAX_FILE_SIZE" => self.max_file_size = parse_env(&key, &value)?,
                "ALLOWED_IMAGE_EXTENSIONS" => self.allowed_image_extensions = parse_list(&value),
                "ALLOWED_AUDIO_EXTENSIONS" => self.allowed_audio_extensions = parse_list(&value),
                "OUTPUT_FOLDER" => self.output_dir = PathBuf::from(value),
                "LOG_LEVEL" => self.log_level = value,
                "STRICT_LENGTH_CHECK" => self.strict_length_check = parse_env(&key, &value)?,
                _ => continue,
            }
            debug!("Loaded {} from environment", key);
        }
        Ok(())
    }

    /// Check that the settings are usable together
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(StegoError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.max_file_size == 0 {
            return invalid("max_file_size must be positive");
        }
        if self.min_frame_rate == 0 {
            return invalid("min_frame_rate must be positive");
        }
        if self.max_frame_rate <= self.min_frame_rate {
            return invalid("max_frame_rate must be greater than min_frame_rate");
        }
        if self.max_frame_rate > u32::from(u16::MAX) {
            return invalid("max_frame_rate must fit the 16-bit sample rate field");
        }
        if !(self.max_audio_duration_secs > 0.0) {
            return invalid("max_audio_duration_secs must be positive");
        }
        if self.allowed_image_extensions.is_empty() {
            return invalid("allowed_image_extensions cannot be empty");
        }
        if self.allowed_audio_extensions.is_empty() {
            return invalid("allowed_audio_extensions cannot be empty");
        }
        if self.log_level.parse::<LevelFilter>().is_err() {
            return invalid("log_level must be one of off, error, warn, info, debug, trace");
        }
        Ok(())
    }

    pub fn audio_limits(&self) -> AudioLimits {
        AudioLimits {
            min_frame_rate: self.min_frame_rate,
            max_frame_rate: self.max_frame_rate,
            max_duration_secs: self.max_audio_duration_secs,
        }
    }

    /// Maximum log level named by `log_level`, `Info` if it does not parse
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn parse_mode(&self) -> ParseMode {
        if self.strict_length_check {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| StegoError::InvalidConfig {
        reason: format!("{} has an invalid value: {:?}", key, value),
    })
}

fn parse_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(|item| item.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(*k), OsString::from(*v)))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.audio_limits(), AudioLimits::default());
        assert_eq!(config.parse_mode(), ParseMode::Strict);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("STEGO_MAX_FRAME_RATE", "44100"),
                ("STEGO_ALLOWED_AUDIO_EXTENSIONS", "wav, .WAVE"),
                ("STEGO_STRICT_LENGTH_CHECK", "false"),
                ("STEGO_UNKNOWN", "ignored"),
                ("PATH", "/usr/bin"),
            ]))
            .unwrap();

        assert_eq!(config.max_frame_rate, 44100);
        assert_eq!(
            config.allowed_audio_extensions,
            ["wav", "wave"].into_iter().map(String::from).collect()
        );
        assert_eq!(config.parse_mode(), ParseMode::Lenient);
    }

    #[test]
    fn test_env_bad_value() {
        let mut config = Config::default();
        let result = config.apply_env(env(&[("STEGO_MIN_FRAME_RATE", "fast")]));
        assert!(matches!(result, Err(StegoError::InvalidConfig { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let binary = || OsString::from_vec(vec![0xff, 0xfe]);
        let mut config = Config::default();

        config
            .apply_env(vec![
                (OsString::from("UNRELATED_BINARY_VAR"), binary()),
                (binary(), OsString::from("x")),
                (OsString::from("STEGO_MAX_FRAME_RATE"), OsString::from("22050")),
            ])
            .unwrap();
        assert_eq!(config.max_frame_rate, 22050);

        let result = config.apply_env(vec![(OsString::from("STEGO_LOG_LEVEL"), binary())]);
        assert!(matches!(result, Err(StegoError::InvalidConfig { .. })));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "max_audio_duration_secs": 60.0 }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.max_audio_duration_secs, 60.0);
        assert_eq!(config.min_frame_rate, MIN_FRAME_RATE);
    }

    #[test]
    fn test_log_filter() {
        let config = Config {
            log_level: "WARN".to_string(),
            ..Config::default()
        };
        config.validate().unwrap();
        assert_eq!(config.log_filter(), LevelFilter::Warn);
        assert_eq!(Config::default().log_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.output_dir, Config::default().output_dir);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            log_level: "debug".to_string(),
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            Config {
                max_frame_rate: 8000,
                ..Config::default()
            },
            Config {
                max_frame_rate: 96000,
                ..Config::default()
            },
            Config {
                max_audio_duration_secs: 0.0,
                ..Config::default()
            },
            Config {
                allowed_image_extensions: BTreeSet::new(),
                ..Config::default()
            },
            Config {
                log_level: "loud".to_string(),
                ..Config::default()
            },
            Config {
                max_file_size: 0,
                ..Config::default()
            },
        ];

        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(StegoError::InvalidConfig { .. })
            ));
        }
    }
}
