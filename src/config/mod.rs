use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::theme::ThemeName;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeName,
    /// Engine volume, 0.0 to 1.0, applied at startup and again whenever media is opened.
    pub initial_volume: f32,
    /// Slider percentage moved per arrow key on the seek slider.
    pub seek_step: f64,
    pub volume_step: f64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeName::default(),
            initial_volume: 0.2,
            seek_step: 5.0,
            volume_step: 5.0,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    fn sanitized(mut self) -> Self {
        let defaults = Config::default();

        self.initial_volume = if self.initial_volume.is_finite() {
            self.initial_volume.clamp(0.0, 1.0)
        } else {
            defaults.initial_volume
        };
        if !(self.seek_step.is_finite() && self.seek_step > 0.0) {
            self.seek_step = defaults.seek_step;
        }
        if !(self.volume_step.is_finite() && self.volume_step > 0.0) {
            self.volume_step = defaults.volume_step;
        }
        self.seek_step = self.seek_step.min(100.0);
        self.volume_step = self.volume_step.min(100.0);

        self
    }
}

fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not find config directory")?
        .join("triton");

    Ok(config_dir.join("config.yml"))
}

pub fn load_or_create_config() -> Result<Config> {
    let config_path = get_config_path()?;
    load_or_create_config_at(&config_path)
}

pub fn load_or_create_config_at(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = Config::default();
        let yaml =
            serde_yaml::to_string(&default_config).context("Failed to serialize default config")?;

        fs::write(config_path, yaml).context("Failed to write default config file")?;

        return Ok(default_config);
    }

    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

    let config: Config = serde_yaml::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

    Ok(config.sanitized())
}
