//! Configuration Management
//!
//! Persistent settings for vstui, stored as JSON under the user's config
//! directory. Endpoint and API key resolve as CLI > environment > file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const ENV_ENDPOINT: &str = "VSTUI_ENDPOINT";
pub const ENV_API_KEY: &str = "VSTUI_API_KEY";

fn default_page_size() -> u32 {
    20
}

fn default_stale_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_toast_duration_secs() -> u64 {
    5
}

fn default_max_history() -> usize {
    50
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer credential; cleared when the session ends
    #[serde(default)]
    pub api_key: Option<String>,
    /// Last viewed list ("files" or "vector_stores")
    #[serde(default)]
    pub last_view: Option<String>,
    /// Hidden column ids per view
    #[serde(default)]
    pub hidden_columns: HashMap<String, HashSet<String>>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_toast_duration_secs")]
    pub toast_duration_secs: u64,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            last_view: None,
            hidden_columns: HashMap::new(),
            page_size: default_page_size(),
            stale_secs: default_stale_secs(),
            timeout_secs: default_timeout_secs(),
            toast_duration_secs: default_toast_duration_secs(),
            max_history: default_max_history(),
            path: None,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vstui").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; missing or malformed files yield
    /// defaults that still save back to `path`
    pub fn load_from(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.path = Some(path.to_path_buf());
        config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective endpoint (CLI > env > config)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> Option<String> {
        resolve(cli, ENV_ENDPOINT, self.endpoint.as_deref())
    }

    /// Get effective API key (CLI > env > config)
    pub fn effective_api_key(&self, cli: Option<&str>) -> Option<String> {
        resolve(cli, ENV_API_KEY, self.api_key.as_deref())
    }

    /// Remember the key entered at sign-in
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        self.api_key = Some(key.to_string());
        self.save()
    }

    /// Forget the stored key (session ended)
    pub fn clear_api_key(&mut self) -> Result<()> {
        self.api_key = None;
        self.save()
    }

    pub fn set_last_view(&mut self, view: &str) -> Result<()> {
        self.last_view = Some(view.to_string());
        self.save()
    }

    pub fn get_hidden_columns(&self, view: &str) -> HashSet<String> {
        self.hidden_columns.get(view).cloned().unwrap_or_default()
    }

    pub fn set_hidden_columns(&mut self, view: &str, hidden: HashSet<String>) -> Result<()> {
        if hidden.is_empty() {
            self.hidden_columns.remove(view);
        } else {
            self.hidden_columns.insert(view.to_string(), hidden);
        }
        self.save()
    }
}

fn resolve(cli: Option<&str>, env_key: &str, file: Option<&str>) -> Option<String> {
    let set = |v: &String| !v.trim().is_empty();
    cli.map(str::to_string)
        .filter(set)
        .or_else(|| std::env::var(env_key).ok().filter(set))
        .or_else(|| file.map(str::to_string).filter(set))
}
