mod theme;

pub use theme::Theme;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::BaseDirs;

use crate::error::{DialerError, Result};

const CONFIG_DIR: &str = "ridge-dialer";
const MAIN_CONFIG_FILE: &str = "config.toml";
const THEME_FILE: &str = "theme.toml";
const LOG_DIR: &str = "logs";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub backend: BackendConfig,
    pub form: FormConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_interval_ms: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub theme: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            log_level: "info".to_string(),
            log_file: None,
            theme: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the voice-agent service; `/api/call` is resolved against it
    pub base_url: String,
    pub connect_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            connect_timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Initial state of the "wait for answer" checkbox
    pub wait_for_answer: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            wait_for_answer: true,
        }
    }
}

pub struct ConfigManager {
    config_dir: PathBuf,
    app_config: AppConfig,
    theme: Theme,
    /// Fallbacks taken while loading; logged once a subscriber exists
    warnings: Vec<String>,
}

impl ConfigManager {
    /// Load from the platform config directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self::from_dir(config_dir))
    }

    /// Load from an explicit directory. Missing or broken files fall back to defaults.
    pub fn from_dir(config_dir: PathBuf) -> Self {
        let mut warnings = Vec::new();
        let app_config: AppConfig =
            Self::load_toml_file(&config_dir.join(MAIN_CONFIG_FILE), &mut warnings)
                .unwrap_or_default();
        let theme = Self::load_theme(&config_dir, &app_config.general.theme, &mut warnings);

        Self {
            config_dir,
            app_config,
            theme,
            warnings,
        }
    }

    /// Load an explicitly named config file. Unlike the default location, a missing
    /// or unparseable file is an error here.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DialerError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let app_config: AppConfig =
            toml::from_str(&content).map_err(|e| DialerError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let mut warnings = Vec::new();
        let theme = Self::load_theme(&config_dir, &app_config.general.theme, &mut warnings);

        Ok(Self {
            config_dir,
            app_config,
            theme,
            warnings,
        })
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Report load fallbacks. Config is read before logging is set up, so call this
    /// right after the subscriber is installed.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }

    /// Command-line values win over the file
    pub fn apply_overrides(&mut self, api_url: Option<&str>, log_level: Option<&str>) {
        if let Some(url) = api_url {
            self.app_config.backend.base_url = url.to_string();
        }
        if let Some(level) = log_level {
            self.app_config.general.log_level = level.to_string();
        }
    }

    /// Where the interactive UI writes its log file
    pub fn log_dir(&self) -> PathBuf {
        if let Some(parent) = self
            .app_config
            .general
            .log_file
            .as_deref()
            .and_then(Path::parent)
        {
            return parent.to_path_buf();
        }
        BaseDirs::new()
            .map(|dirs| dirs.data_local_dir().join(CONFIG_DIR).join(LOG_DIR))
            .unwrap_or_else(|| self.config_dir.join(LOG_DIR))
    }

    pub fn write_default_config(&self) -> Result<PathBuf> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)
                .map_err(|e| DialerError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        let main_path = self.config_dir.join(MAIN_CONFIG_FILE);
        if !main_path.exists() {
            let content = toml::to_string_pretty(&AppConfig::default())
                .map_err(|e| DialerError::Config(format!("Failed to serialize config: {}", e)))?;
            std::fs::write(&main_path, content)
                .map_err(|e| DialerError::Config(format!("Failed to write config: {}", e)))?;
        }
        Ok(main_path)
    }

    fn get_config_dir() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR))
            .ok_or_else(|| DialerError::Config("Could not determine config directory".to_string()))
    }

    fn load_theme(config_dir: &Path, name: &str, warnings: &mut Vec<String>) -> Theme {
        if let Some(theme) = Self::load_toml_file(&config_dir.join(THEME_FILE), warnings) {
            return theme;
        }
        Theme::builtin(name).unwrap_or_else(|| {
            warnings.push(format!("Unknown theme '{}', using default", name));
            Theme::default()
        })
    }

    fn load_toml_file<T: for<'de> Deserialize<'de>>(
        path: &Path,
        warnings: &mut Vec<String>,
    ) -> Option<T> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    warnings.push(format!(
                        "Failed to parse {}, using defaults: {}",
                        path.display(),
                        e
                    ));
                    None
                }
            },
            Err(e) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), e));
                None
            }
        }
    }
}
