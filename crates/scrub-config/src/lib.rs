use anyhow::{Context, bail};
use scrub_core::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for scrub
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    /// JSON or TOML vault file. No path means an empty vault.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Merge the built-in secret patterns under the vault's own patterns.
    #[serde(default)]
    pub builtin_patterns: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_exact_categories")]
    pub exact_categories: Vec<String>,

    #[serde(default = "default_true")]
    pub patterns: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default = "default_token")]
    pub token: String,

    #[serde(default)]
    pub overlap: OverlapPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,

    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exact_categories: default_exact_categories(),
            patterns: true,
        }
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            token: default_token(),
            overlap: OverlapPolicy::default(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_exact_categories() -> Vec<String> {
    vec!["api_keys".to_string(), "emails".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_token() -> String {
    "[REDACTED]".to_string()
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("detections.log.jsonl")
}

fn default_preview_chars() -> usize {
    200
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::from_path(&path)
        } else {
            let config = Config::default();
            config.save(&path)?;
            Ok(config)
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.redaction.token.is_empty() {
            bail!("redaction.token must not be empty");
        }
        if self.audit.preview_chars == 0 {
            bail!("audit.preview_chars must be greater than zero");
        }
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "scrub", "scrub") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.scrub/config.toml")
        }
    }
}
