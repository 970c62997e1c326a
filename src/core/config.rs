//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::workspace::Workspace;

/// DPT configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend API
    pub api_url: Option<String>,

    /// Bearer token for the backend API
    pub api_token: Option<String>,

    /// User recorded on queries
    pub user: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/dpt/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Workspace config (.dpt/config.yaml)
        if let Some(workspace) = workspace {
            let workspace_path = workspace.config_path();
            if workspace_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&workspace_path) {
                    if let Ok(local) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(local);
                    }
                }
            }
        }

        // 4. Environment variables
        if let Ok(url) = std::env::var("DPT_API_URL") {
            config.api_url = Some(url);
        }
        if let Ok(token) = std::env::var("DPT_API_TOKEN") {
            config.api_token = Some(token);
        }
        if let Ok(user) = std::env::var("DPT_USER") {
            config.user = Some(user);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "dpt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.api_token.is_some() {
            self.api_token = other.api_token;
        }
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// The user name to record, falling back to the OS account
    pub fn user(&self) -> String {
        if let Some(ref user) = self.user {
            return user.clone();
        }
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "Sistema".to_string())
    }

    /// API base URL with the trailing slash trimmed
    pub fn api_url(&self) -> Option<String> {
        self.api_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_precedence() {
        let mut base = Config {
            api_url: Some("https://a.example".to_string()),
            user: Some("ana".to_string()),
            ..Config::default()
        };
        base.merge(Config {
            api_url: Some("https://b.example".to_string()),
            ..Config::default()
        });
        assert_eq!(base.api_url.as_deref(), Some("https://b.example"));
        assert_eq!(base.user.as_deref(), Some("ana"));
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let config = Config {
            api_url: Some("https://a.example/api/".to_string()),
            ..Config::default()
        };
        assert_eq!(config.api_url().as_deref(), Some("https://a.example/api"));
    }

    #[test]
    fn test_parse_yaml() {
        let config: Config =
            serde_yml::from_str("api_url: https://despensa.example/api\nuser: caja1\n").unwrap();
        assert_eq!(config.user.as_deref(), Some("caja1"));
    }
}
