//! Board configuration file and environment overrides

use anyhow::{Context, Result};
use boardflow_core::ClassifierConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "board-details.yaml";

/// Contents of `board-details.yaml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardConfig {
    /// Miro access token
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub board_id: Option<String>,

    /// API root, for proxies and tests
    #[serde(default)]
    pub api_url: Option<String>,

    /// Board-specific classification rules
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl BoardConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file is a valid, empty config
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load the config file, then apply environment overrides.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = if path.exists() {
            info!("Using config at: {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else if required {
            anyhow::bail!("Config file not found: {}", path.display());
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override file values with `MIRO_API_KEY`, `MIRO_BOARD_ID` and `MIRO_API_URL`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("MIRO_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(board) = non_empty("MIRO_BOARD_ID") {
            self.board_id = Some(board);
        }
        if let Some(url) = non_empty("MIRO_API_URL") {
            self.api_url = Some(url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
api_key: abc
board_id: "uXjVKtest="
classifier:
  start_item_id: "3458764635301875090"
  conclusion_labels:
    "3458764636475175262": LREC Approval required
    "3458764635302888442": Continue to Research
"#;
        let config = BoardConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.board_id.as_deref(), Some("uXjVKtest="));
        assert!(config.api_url.is_none());
        assert_eq!(
            config.classifier.start_item_id.as_deref(),
            Some("3458764635301875090")
        );
        assert_eq!(config.classifier.conclusion_labels.len(), 2);
        assert_eq!(config.classifier.start_label, "Start");
    }

    #[test]
    fn test_empty_config() {
        let config = BoardConfig::from_yaml("").unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = BoardConfig::from_yaml("api_key: file\nboard_id: file-board\n").unwrap();
        config.apply_overrides(|key| match key {
            "MIRO_API_KEY" => Some("env".to_string()),
            "MIRO_BOARD_ID" => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.api_key.as_deref(), Some("env"));
        assert_eq!(config.board_id.as_deref(), Some("file-board"));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let err = BoardConfig::load(Some(Path::new("/nonexistent/board-details.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
