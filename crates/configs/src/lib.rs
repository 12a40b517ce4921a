use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

pub const BASE_URL_ENV: &str = "SPENDARIO_API_BASE_URL";
pub const DATA_DIR_ENV: &str = "SPENDARIO_DATA_DIR";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transport timeout; unset keeps the HTTP client's default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_secs: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_storage_file")]
    pub file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), file: default_storage_file() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_base_url() -> String { "http://localhost:8000".into() }
fn default_data_dir() -> String { "data".into() }
fn default_storage_file() -> String { "local_storage.json".into() }
fn default_log_format() -> String { "compact".into() }

/// Read `CONFIG_PATH` (default `config.toml`); a missing file yields the defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if std::fs::metadata(&path).is_err() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env_overrides();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.storage.data_dir = dir;
            }
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.api.normalize()?;
        self.storage.validate()?;
        self.logging.normalize();
        Ok(())
    }
}

impl ApiConfig {
    fn normalize(&mut self) -> Result<()> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            self.base_url = default_base_url();
        } else {
            let lower = trimmed.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("api.base_url must start with http:// or https://"));
            }
            self.base_url = trimmed;
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("api.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.file.trim().is_empty() {
            return Err(anyhow!("storage.file is empty"));
        }
        Ok(())
    }

    /// Full path of the local storage blob file.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.file)
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        let lower = self.format.trim().to_lowercase();
        self.format = if lower == "json" { lower } else { default_log_format() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let mut cfg = parse("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert_eq!(cfg.api.timeout_secs, None);
        assert_eq!(cfg.storage.path(), PathBuf::from("data").join("local_storage.json"));
        assert_eq!(cfg.logging.format, "compact");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let mut cfg = parse("[api]\nbase_url = \"https://api.spendario.dev/\"\n").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.api.base_url, "https://api.spendario.dev");
    }

    #[test]
    fn rejects_bad_scheme_and_zero_timeout() {
        let mut cfg = parse("[api]\nbase_url = \"ftp://x\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = parse("[api]\ntimeout_secs = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn unknown_log_format_falls_back_to_compact() {
        let mut cfg = parse("[logging]\nformat = \"JSON\"\n").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.logging.format, "json");

        let mut cfg = parse("[logging]\nformat = \"xml\"\n").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.logging.format, "compact");
    }

    #[test]
    fn load_from_file_reads_toml() -> Result<()> {
        let tmp = std::env::temp_dir().join(format!("spendario_cfg_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&tmp, "[storage]\ndata_dir = \"/tmp/spendario\"\nfile = \"ls.json\"\n")?;
        let cfg = load_from_file(tmp.to_str().ok_or_else(|| anyhow!("non-utf8 path"))?)?;
        assert_eq!(cfg.storage.path(), PathBuf::from("/tmp/spendario/ls.json"));
        let _ = std::fs::remove_file(&tmp);
        Ok(())
    }
}
