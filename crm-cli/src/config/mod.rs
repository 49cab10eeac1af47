//! Configuration
//!
//! Settings come from a TOML file (`--config` or the per-user config
//! directory) and are then overridden by environment variables. A `.env`
//! file is loaded into the environment by the binary before this runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::api::{HttpRecordStore, LocalStore, RecordStore, StoreCredentials};

pub const ENV_BACKEND: &str = "CRM_BACKEND";
pub const ENV_STORE_URL: &str = "CRM_STORE_URL";
pub const ENV_PROJECT_ID: &str = "CRM_PROJECT_ID";
pub const ENV_PUBLIC_KEY: &str = "CRM_PUBLIC_KEY";
pub const ENV_LOCAL_PATH: &str = "CRM_LOCAL_PATH";

/// Which record store the composition root builds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Http,
    /// JSON file on this machine
    Local,
}

/// Connection settings for the remote record store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
}

/// Settings for the file-backed store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Store file (defaults to <data dir>/crm-cli/store.json)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub store: StoreConfig,
    pub local: LocalConfig,
}

impl Config {
    /// `<config_dir>/crm-cli/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crm-cli")
            .join("config.toml")
    }

    /// Load the file at `path` (required to exist) or the default file
    /// (optional), then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!("No config file at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Override settings from variables looked up through `var`; empty
    /// values are ignored
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(backend) = lookup(ENV_BACKEND) {
            match backend.trim().to_lowercase().as_str() {
                "http" => self.backend = Backend::Http,
                "local" => self.backend = Backend::Local,
                other => debug!("Ignoring unknown {} value '{}'", ENV_BACKEND, other),
            }
        }
        if let Some(url) = lookup(ENV_STORE_URL) {
            self.store.url = Some(url);
        }
        if let Some(project_id) = lookup(ENV_PROJECT_ID) {
            self.store.project_id = Some(project_id);
        }
        if let Some(public_key) = lookup(ENV_PUBLIC_KEY) {
            self.store.public_key = Some(public_key);
        }
        if let Some(path) = lookup(ENV_LOCAL_PATH) {
            self.local.path = Some(PathBuf::from(path));
        }
    }

    /// Build the configured record store
    pub fn build_store(&self) -> Result<Arc<dyn RecordStore>> {
        match self.backend {
            Backend::Local => {
                let path = self.local.path.clone().unwrap_or_else(LocalStore::default_path);
                Ok(Arc::new(LocalStore::open(path)?))
            }
            Backend::Http => {
                let Some(url) = self.store.url.clone() else {
                    bail!("No store URL configured. Set {} or store.url", ENV_STORE_URL);
                };
                let Some(project_id) = self.store.project_id.clone() else {
                    bail!("No project id configured. Set {} or store.project_id", ENV_PROJECT_ID);
                };
                let Some(public_key) = self.store.public_key.clone() else {
                    bail!("No public key configured. Set {} or store.public_key", ENV_PUBLIC_KEY);
                };

                let store = HttpRecordStore::new(
                    url,
                    StoreCredentials {
                        project_id,
                        public_key,
                    },
                )?;
                Ok(Arc::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Deals;
    use crate::repository::LogNotifier;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_file() {
        let config = Config::from_toml(
            r#"
            backend = "http"

            [store]
            url = "https://store.example.com/api"
            project_id = "proj-1"
            public_key = "pk-123"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, Backend::Http);
        assert_eq!(config.store.url.as_deref(), Some("https://store.example.com/api"));
        assert_eq!(config.store.public_key.as_deref(), Some("pk-123"));
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Config::from_toml("backend = \"sqlite\"").is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut config = Config::from_toml(
            r#"
            [store]
            url = "https://file.example.com"
            project_id = "from-file"
            "#,
        )
        .unwrap();
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_PROJECT_ID, "from-env"),
            (ENV_PUBLIC_KEY, "pk-env"),
            (ENV_STORE_URL, "  "),
            (ENV_BACKEND, "Local"),
            (ENV_LOCAL_PATH, "/tmp/crm.json"),
        ]);

        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.backend, Backend::Local);
        assert_eq!(config.local.path, Some(PathBuf::from("/tmp/crm.json")));
        assert_eq!(config.store.url.as_deref(), Some("https://file.example.com"));
        assert_eq!(config.store.project_id.as_deref(), Some("from-env"));
        assert_eq!(config.store.public_key.as_deref(), Some("pk-env"));
    }

    #[test]
    fn test_http_backend_requires_credentials() {
        let config = Config {
            backend: Backend::Http,
            store: StoreConfig {
                url: Some("https://store.example.com".to_string()),
                project_id: Some("proj-1".to_string()),
                public_key: None,
            },
            ..Default::default()
        };

        let err = config.build_store().err().unwrap();
        assert!(err.to_string().contains(ENV_PUBLIC_KEY));
    }

    #[tokio::test]
    async fn test_local_backend_persists_between_runs() {
        let path = std::env::temp_dir()
            .join(format!("crm-cli-config-local-{}", std::process::id()))
            .join("store.json");
        let _ = fs::remove_file(&path);
        let config = Config {
            backend: Backend::Local,
            local: LocalConfig {
                path: Some(path.clone()),
            },
            ..Default::default()
        };
        let mut deal = crate::schema::Record::new();
        deal.insert("title".to_string(), serde_json::json!("Pilot"));

        let first = Deals::new(config.build_store().unwrap(), Arc::new(LogNotifier));
        let created = first.create(&deal).await.unwrap();

        let second = Deals::new(config.build_store().unwrap(), Arc::new(LogNotifier));
        let listed = second.get_all().await.unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], created["id"]);
        assert_eq!(listed[0]["title"], serde_json::json!("Pilot"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let path = std::env::temp_dir().join("crm-cli-missing-config.toml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("crm-cli-config-{}.toml", std::process::id()));
        fs::write(&path, "backend = \"local\"\n[local]\npath = \"deals.json\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.backend, Backend::Local);
        assert_eq!(config.local.path, Some(PathBuf::from("deals.json")));
    }
}
