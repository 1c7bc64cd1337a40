use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "BRAINSCAN_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub upload: UploadConfig,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub device: DevicePreference,
    pub input_layout: InputLayout,
    pub output: OutputActivation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    Auto,
    Cpu,
    Cuda,
}

/// Axis order the artifact expects for its single input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLayout {
    Nhwc,
    Nchw,
}

/// Whether the artifact already ends in a softmax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputActivation {
    Probabilities,
    Logits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            upload: UploadConfig::default(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            workers: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/brain_tumor.pt"),
            device: DevicePreference::Auto,
            input_layout: InputLayout::Nhwc,
            output: OutputActivation::Probabilities,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

fn default_static_dir() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        PathBuf::from(manifest_dir).join("static")
    } else {
        PathBuf::from("/usr/src/app/backend/static")
    }
}

fn default_config_path() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        PathBuf::from(manifest_dir).join("../config/brainscan.yaml")
    } else {
        PathBuf::from("config/brainscan.yaml")
    }
}

impl AppConfig {
    /// Loads the YAML file named by `BRAINSCAN_CONFIG` (or the default path),
    /// then applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());

        let mut config = if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::from_file(&path)?
        } else {
            log::warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Self::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Relative paths inside the file resolve against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&config_str).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(config_str)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.model.path.is_relative() {
            self.model.path = base.join(&self.model.path);
        }
        if self.static_dir.is_relative() {
            self.static_dir = base.join(&self.static_dir);
        }
    }

    /// Applies `HOST`, `PORT`, `MODEL_PATH`, `MODEL_DEVICE` and `STATIC_DIR`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value: port })?;
        }
        if let Some(path) = lookup("MODEL_PATH") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(device) = lookup("MODEL_DEVICE") {
            self.model.device = match device.to_ascii_lowercase().as_str() {
                "auto" => DevicePreference::Auto,
                "cpu" => DevicePreference::Cpu,
                "cuda" => DevicePreference::Cuda,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        name: "MODEL_DEVICE",
                        value: device,
                    })
                }
            };
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            "server:\n  port: 9000\nmodel:\n  path: /models/mri.pt\n  input_layout: nchw\n",
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.model.path, PathBuf::from("/models/mri.pt"));
        assert_eq!(config.model.input_layout, InputLayout::Nchw);
        assert_eq!(config.model.output, OutputActivation::Probabilities);
        assert_eq!(config.upload.max_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn unknown_device_in_yaml_is_rejected() {
        assert!(AppConfig::from_yaml("model:\n  device: tpu\n").is_err());
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(env(&[
                ("PORT", "9090"),
                ("MODEL_PATH", "artifacts/model.pt"),
                ("MODEL_DEVICE", "CPU"),
            ]))
            .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.model.path, PathBuf::from("artifacts/model.pt"));
        assert_eq!(config.model.device, DevicePreference::Cpu);
    }

    #[test]
    fn invalid_port_override_is_an_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "PORT", .. }));
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let dir = std::env::temp_dir().join(format!("brainscan-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("brainscan.yaml");
        std::fs::write(&path, "model:\n  path: ../models/mri.pt\nstatic_dir: /srv/static\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.model.path, dir.join("../models/mri.pt"));
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
    }

    #[test]
    fn env_model_path_is_taken_as_given() {
        let mut config = AppConfig::default();
        config.resolve_paths(Path::new("/etc/brainscan"));
        config
            .apply_overrides(env(&[("MODEL_PATH", "artifacts/model.pt")]))
            .unwrap();
        assert_eq!(config.model.path, PathBuf::from("artifacts/model.pt"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::from_file(Path::new("/nonexistent/brainscan.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/brainscan.yaml"));
    }
}
