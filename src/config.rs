// ⚙️ Configuration - animation timings, cost defaults, export and server settings
//
// Everything has a default, so a missing config file is not an error.
// A present but malformed file is.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub animation: AnimationConfig,

    #[serde(default)]
    pub cost: CostDefaults,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Typing and counter timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// When false, players skip every sleep and jump to the final frame
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Per-character delay of the hosted API panel
    #[serde(default = "default_api_char_delay")]
    pub api_char_delay_ms: u64,

    /// Per-character delay of the self-hosted panel (it "types" faster)
    #[serde(default = "default_slm_char_delay")]
    pub slm_char_delay_ms: u64,

    #[serde(default = "default_counter_tick")]
    pub counter_tick_ms: u64,

    /// Bounds of the randomized "analyzing..." loader delay
    #[serde(default = "default_loader_min")]
    pub loader_min_ms: u64,

    #[serde(default = "default_loader_max")]
    pub loader_max_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            enabled: true,
            api_char_delay_ms: default_api_char_delay(),
            slm_char_delay_ms: default_slm_char_delay(),
            counter_tick_ms: default_counter_tick(),
            loader_min_ms: default_loader_min(),
            loader_max_ms: default_loader_max(),
        }
    }
}

impl AnimationConfig {
    /// A scripted delay as played: unchanged, or zero when animation is off
    pub fn scale(&self, duration: Duration) -> Duration {
        if self.enabled {
            duration
        } else {
            Duration::ZERO
        }
    }

    fn millis(&self, ms: u64) -> Duration {
        self.scale(Duration::from_millis(ms))
    }

    pub fn api_char_delay(&self) -> Duration {
        self.millis(self.api_char_delay_ms)
    }

    pub fn slm_char_delay(&self) -> Duration {
        self.millis(self.slm_char_delay_ms)
    }

    pub fn counter_tick(&self) -> Duration {
        Duration::from_millis(self.counter_tick_ms)
    }
}

/// Defaults for the cost ticker's selection state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostDefaults {
    #[serde(default = "default_daily_volume")]
    pub daily_volume: u64,

    #[serde(default = "default_avg_input_tokens")]
    pub avg_input_tokens: u64,

    #[serde(default = "default_avg_output_tokens")]
    pub avg_output_tokens: u64,

    #[serde(default = "default_api_model")]
    pub api_model: String,

    #[serde(default = "default_slm_model")]
    pub slm_model: String,
}

impl Default for CostDefaults {
    fn default() -> Self {
        CostDefaults {
            daily_volume: default_daily_volume(),
            avg_input_tokens: default_avg_input_tokens(),
            avg_output_tokens: default_avg_output_tokens(),
            api_model: default_api_model(),
            slm_model: default_slm_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory that receives exported JSON snapshots
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            dir: default_export_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: default_addr(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_char_delay() -> u64 {
    15
}

fn default_slm_char_delay() -> u64 {
    10
}

fn default_counter_tick() -> u64 {
    50
}

fn default_loader_min() -> u64 {
    3000
}

fn default_loader_max() -> u64 {
    5000
}

fn default_daily_volume() -> u64 {
    10_000
}

fn default_avg_input_tokens() -> u64 {
    500
}

fn default_avg_output_tokens() -> u64 {
    200
}

fn default_api_model() -> String {
    "gpt-4".to_string()
}

fn default_slm_model() -> String {
    "mistral-7b".to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("config file {:?} not found, using defaults", path);
            Ok(Config::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.loader_min_ms > self.animation.loader_max_ms {
            return Err(ConfigError::Invalid(format!(
                "animation.loader_min_ms ({}) exceeds animation.loader_max_ms ({})",
                self.animation.loader_min_ms, self.animation.loader_max_ms
            )));
        }
        if self.animation.counter_tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "animation.counter_tick_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn example() -> &'static str {
        r#"# slm-command-center configuration file

[animation]
enabled = true
api_char_delay_ms = 15      # hosted API panel typing speed
slm_char_delay_ms = 10      # self-hosted panel types faster
counter_tick_ms = 50
loader_min_ms = 3000        # randomized "analyzing..." delay
loader_max_ms = 5000

[cost]
daily_volume = 10000
avg_input_tokens = 500
avg_output_tokens = 200
api_model = "gpt-4"
slm_model = "mistral-7b"

[export]
dir = "exports"

[server]
addr = "0.0.0.0:3000"
"#
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.animation.enabled);
        assert_eq!(config.animation.api_char_delay_ms, 15);
        assert_eq!(config.animation.slm_char_delay_ms, 10);
        assert_eq!(config.cost.daily_volume, 10_000);
        assert_eq!(config.cost.api_model, "gpt-4");
        assert_eq!(config.export.dir, PathBuf::from("exports"));
    }

    #[test]
    fn test_example_parses() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.addr, "0.0.0.0:3000");
        assert_eq!(config.animation.loader_max_ms, 5000);
    }

    #[test]
    fn test_disabled_animation_zeroes_delays() {
        let mut animation = AnimationConfig::default();
        assert_eq!(animation.scale(Duration::from_millis(600)), Duration::from_millis(600));

        animation.enabled = false;
        assert!(animation.scale(Duration::from_millis(600)).is_zero());
        assert!(animation.api_char_delay().is_zero());
        assert!(animation.slm_char_delay().is_zero());
    }

    #[test]
    fn test_example_lists_only_read_fields() {
        assert!(!Config::example().contains("typing_delay_ms"));
        // older files that still carry it load fine
        let config: Config = toml::from_str("[animation]\ntyping_delay_ms = 20\n").unwrap();
        assert!(config.animation.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cost]\ndaily_volume = 250000").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.cost.daily_volume, 250_000);
        assert_eq!(config.cost.avg_input_tokens, 500);
        assert_eq!(config.animation.counter_tick_ms, 50);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.cost.slm_model, "mistral-7b");
    }

    #[test]
    fn test_invalid_loader_bounds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[animation]\nloader_min_ms = 9000\nloader_max_ms = 100").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cost\ndaily_volume = ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
