use crate::core::derive::DayZone;
use crate::errors::{AppError, AppResult};
use crate::models::CategoryId;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Keys every config file is expected to carry.
pub const CONFIG_KEYS: [&str; 5] = [
    "database",
    "cache_file",
    "utc_offset",
    "default_category",
    "log_filter",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_cache_file() -> String {
    Config::config_dir()
        .join("cache.json")
        .to_string_lossy()
        .to_string()
}
fn default_utc_offset() -> String {
    "local".to_string()
}
fn default_category() -> String {
    CategoryId::Other.code().to_string()
}
fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            cache_file: default_cache_file(),
            utc_offset: default_utc_offset(),
            default_category: default_category(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform.
    /// `DAYCLOCK_HOME` overrides it.
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var("DAYCLOCK_HOME")
            && !dir.trim().is_empty()
        {
            return PathBuf::from(dir);
        }
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("dayclock")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".dayclock")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("dayclock.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("dayclock.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        let mut cfg = Self::parse(&content)?;
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        cfg.cache_file = expand_tilde(&cfg.cache_file).to_string_lossy().to_string();
        Ok(cfg)
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("cannot parse configuration: {e}")))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AppError::Config(format!("cannot serialize configuration: {e}")))
    }

    /// Keys from [`CONFIG_KEYS`] absent in `content`.
    pub fn missing_keys(content: &str) -> AppResult<Vec<&'static str>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("cannot parse configuration: {e}")))?;
        let Some(map) = value.as_mapping() else {
            return Ok(CONFIG_KEYS.to_vec());
        };
        Ok(CONFIG_KEYS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(serde_yaml::Value::String((*k).to_string())))
            .collect())
    }

    pub fn zone(&self) -> AppResult<DayZone> {
        DayZone::parse(&self.utc_offset)
    }

    pub fn default_category_id(&self) -> AppResult<CategoryId> {
        CategoryId::from_code(&self.default_category)
            .ok_or_else(|| AppError::InvalidCategory(self.default_category.clone()))
    }

    pub fn save(&self) -> AppResult<()> {
        fs::create_dir_all(Self::config_dir())?;
        fs::write(Self::config_file(), self.to_yaml()?)?;
        Ok(())
    }

    /// Initialize configuration and database directory.
    /// In test mode the config file is left alone.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let mut config = if is_test {
            Config::default()
        } else {
            Self::load()?
        };

        if let Some(name) = custom_db {
            let p = Path::new(&name);
            let db_path = if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            };
            config.database = db_path.to_string_lossy().to_string();
        }

        if let Some(parent) = Path::new(&config.database).parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        if !is_test {
            config.save()?;
        }

        Ok(config)
    }
}
