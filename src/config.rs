use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "hostsnap.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub collection: CollectionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Length of the CPU utilization window.
    pub cpu_interval_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cpu_interval_ms: 1000,
        }
    }
}

impl SamplingConfig {
    pub fn cpu_interval(&self) -> Duration {
        Duration::from_millis(self.cpu_interval_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Run readers on the blocking pool in parallel instead of one after another.
    pub concurrent: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            pretty: true,
        }
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE`, or `hostsnap.toml` in the working directory.
    /// Only the default file may be absent, in which case defaults apply.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::load_from_path(Path::new(&path)),
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_path(Path::new(DEFAULT_CONFIG_FILE))
            }
            Err(_) => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("config {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampling.cpu_interval_ms > 0,
            "sampling.cpu_interval_ms must be > 0, got {}",
            self.sampling.cpu_interval_ms
        );
        anyhow::ensure!(
            self.sampling.cpu_interval_ms <= 60_000,
            "sampling.cpu_interval_ms must be <= 60000, got {}",
            self.sampling.cpu_interval_ms
        );
        Ok(())
    }
}
