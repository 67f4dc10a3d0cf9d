use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Data directory - resolved at load time, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Endpoint override, mainly for test servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_generation_model() -> String {
    "gemini-2.0-flash-preview-image-generation".into()
}

fn default_classifier_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            generation_model: default_generation_model(),
            classifier_model: default_classifier_model(),
            temperature: default_temperature(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// When the service call fails, complete with the unmodified avatar as
    /// a degraded stand-in instead of failing the attempt.
    #[serde(default = "default_true")]
    pub placeholder_on_failure: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            placeholder_on_failure: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

fn default_max_file_size_mb() -> u64 {
    25
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    #[serde(default = "default_true")]
    pub encrypt: bool,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self { encrypt: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Data directory override; `~` expands to the home directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load `~/.garderobe/config.toml`, creating the directory tree and a
    /// default config on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        Self::load_or_init_at(&home.join(".garderobe"))
    }

    /// Same as [`load_or_init`], rooted at an explicit directory (tests).
    ///
    /// [`load_or_init`]: Config::load_or_init
    pub fn load_or_init_at(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.toml");
        fs::create_dir_all(root)?;

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            toml::from_str::<Self>(&contents)
                .map_err(|e| ConfigError::Load(format!("failed to parse config file: {e}")))?
        } else {
            let config = Self::default();
            let toml_str = toml::to_string_pretty(&config)
                .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
            fs::write(&config_path, toml_str)?;
            config
        };

        config.config_path = config_path;
        config.data_dir = match config.storage.data_dir.as_deref() {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).into_owned()),
            None => root.join("data"),
        };
        fs::create_dir_all(&config.data_dir)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::Validation(format!(
                "provider.temperature must be within 0.0..=2.0, got {}",
                self.provider.temperature
            )));
        }
        if self.media.max_file_size_mb == 0 {
            return Err(ConfigError::Validation(
                "media.max_file_size_mb must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use tempfile::TempDir;

    #[test]
    fn first_run_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_init_at(dir.path()).unwrap();

        assert!(dir.path().join("config.toml").exists());
        assert!(config.data_dir.exists());
        assert!(config.generation.placeholder_on_failure);
        assert!(config.secrets.encrypt);
        assert_eq!(config.media.max_file_size_mb, 25);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[generation]\nplaceholder_on_failure = false\n",
        )
        .unwrap();

        let config = Config::load_or_init_at(dir.path()).unwrap();
        assert!(!config.generation.placeholder_on_failure);
        assert_eq!(config.provider.classifier_model, "gemini-2.0-flash");
    }

    #[test]
    fn data_dir_override_is_honored() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("elsewhere");
        std::fs::write(
            dir.path().join("config.toml"),
            format!("[storage]\ndata_dir = \"{}\"\n", custom.display()),
        )
        .unwrap();

        let config = Config::load_or_init_at(dir.path()).unwrap();
        assert_eq!(config.data_dir, custom);
        assert!(custom.exists());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[provider]\ntemperature = 3.5\n",
        )
        .unwrap();

        assert!(Config::load_or_init_at(dir.path()).is_err());
    }

    #[test]
    fn save_roundtrips() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load_or_init_at(dir.path()).unwrap();
        config.generation.placeholder_on_failure = false;
        config.save().unwrap();

        let reloaded = Config::load_or_init_at(dir.path()).unwrap();
        assert!(!reloaded.generation.placeholder_on_failure);
    }
}
