use std::{env, path::PathBuf};

use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::core::{ConnectionParams, PageSize, TransformLanguage};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub transform_language: TransformLanguage,
    #[serde(default = "default_port")]
    pub default_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            page_size: PageSize::default(),
            transform_language: TransformLanguage::default(),
            default_port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    ConnectionParams::DEFAULT_PORT
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Layer embedded defaults, the user's JSON5 file and `JSONL_VIEWER_*`
    /// environment variables, in that order.
    ///
    /// An explicit `config_path` must exist; the default home file is optional.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        let selected_path = match config_path {
            Some(p) => expand_tilde(p),
            None => default_home_config_path(),
        };
        builder = builder.add_source(
            config::File::from(selected_path)
                .format(config::FileFormat::Json5)
                .required(config_path.is_some()),
        );
        builder = builder.add_source(config::Environment::with_prefix(&PROJECT_NAME));

        builder.build()?.try_deserialize()
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with('~') {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen('~', base.home_dir().to_str().unwrap_or(""), 1));
            }
        }
    }
    path.clone()
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".jsonl-viewer-config.json5");
    }
    PathBuf::from(".jsonl-viewer-config.json5")
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else {
        PathBuf::from(".").join(".config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_defaults_parse() {
        let cfg: Config = json5::from_str(CONFIG).unwrap();
        assert_eq!(cfg.page_size, PageSize::Ten);
        assert_eq!(cfg.transform_language, TransformLanguage::Sql);
        assert_eq!(cfg.default_port, 22);
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json5");
        std::fs::write(&path, "{ page_size: 50, transform_language: 'jmes' }").unwrap();
        let cfg = Config::from_path(Some(&path)).unwrap();
        assert_eq!(cfg.page_size, PageSize::Fifty);
        assert_eq!(cfg.transform_language, TransformLanguage::Jmes);
        assert_eq!(cfg.default_port, 22);
    }

    #[test]
    fn test_invalid_page_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json5");
        std::fs::write(&path, "{ page_size: 7 }").unwrap();
        assert!(Config::from_path(Some(&path)).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::from_path(Some(&dir.path().join("missing.json5"))).is_err());
    }
}
