//! Vault: named sets of literal secrets and named regex patterns.
//!
//! Serialized form (JSON, or TOML for `.toml` files) is a single object:
//!
//! ```json
//! {
//!   "api_keys": ["sk-live-abc123"],
//!   "emails": ["admin@example.com"],
//!   "regexes": { "ssn": "\\d{3}-\\d{2}-\\d{4}" }
//! }
//! ```
//!
//! `regexes` holds the patterns; every other key is an exact set.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Reserved top-level key holding the named patterns.
pub const PATTERNS_KEY: &str = "regexes";

/// Read-only detection ground truth. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vault {
    exact_sets: BTreeMap<String, Vec<String>>,
    patterns: BTreeMap<String, String>,
}

impl Vault {
    pub fn builder() -> VaultBuilder {
        VaultBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Literal values for `category`, or an empty slice if it is absent.
    pub fn list_for(&self, category: &str) -> &[String] {
        match self.exact_sets.get(category) {
            Some(values) => values,
            None => &[],
        }
    }

    /// All named patterns, ordered by name.
    pub fn patterns_all(&self) -> &BTreeMap<String, String> {
        &self.patterns
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.exact_sets.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.exact_sets.is_empty() && self.patterns.is_empty()
    }

    /// Overlay this vault onto `base`. Entries in `self` replace entries in
    /// `base` with the same name.
    pub fn merged_under(&self, base: &Vault) -> Vault {
        let mut merged = base.clone();
        merged.exact_sets.extend(self.exact_sets.clone());
        merged.patterns.extend(self.patterns.clone());
        merged
    }

    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        Self::from_json_value(value)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        let value: toml::Value = toml::from_str(content)?;
        let json = serde_json::to_value(value)?;
        Self::from_json_value(json)
    }

    /// Load from a file; `.toml` files are parsed as TOML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    fn from_json_value(value: serde_json::Value) -> Result<Self, LoadError> {
        let serde_json::Value::Object(map) = value else {
            return Err(LoadError::Malformed("top level must be an object".to_string()));
        };

        let mut builder = VaultBuilder::default();
        for (key, value) in map {
            if key == PATTERNS_KEY {
                let serde_json::Value::Object(patterns) = value else {
                    return Err(LoadError::Malformed(format!(
                        "'{PATTERNS_KEY}' must map pattern names to strings"
                    )));
                };
                for (name, source) in patterns {
                    let serde_json::Value::String(source) = source else {
                        return Err(LoadError::Malformed(format!(
                            "pattern '{name}' must be a string"
                        )));
                    };
                    builder = builder.pattern(name, source);
                }
            } else {
                let serde_json::Value::Array(items) = value else {
                    return Err(LoadError::Malformed(format!("'{key}' must be a list of strings")));
                };
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let serde_json::Value::String(item) = item else {
                        return Err(LoadError::Malformed(format!(
                            "'{key}' must contain only strings"
                        )));
                    };
                    values.push(item);
                }
                builder = builder.exact_set(key, values);
            }
        }

        Ok(builder.build())
    }
}

/// In-memory construction. Later writes to the same name replace earlier ones.
#[derive(Debug, Default)]
pub struct VaultBuilder {
    exact_sets: BTreeMap<String, Vec<String>>,
    patterns: BTreeMap<String, String>,
}

impl VaultBuilder {
    pub fn exact_set<I, S>(mut self, category: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.exact_sets.insert(category.into(), values);
        self
    }

    pub fn pattern(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.patterns.insert(name.into(), source.into());
        self
    }

    pub fn patterns<I, K, V>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let patterns = patterns.into_iter().map(|(k, v)| (k.into(), v.into()));
        self.patterns.extend(patterns);
        self
    }

    pub fn build(self) -> Vault {
        Vault {
            exact_sets: self.exact_sets,
            patterns: self.patterns,
        }
    }
}

/// Abstract vault source. The concrete backing is chosen by configuration.
pub trait VaultLoader: Send + Sync {
    fn load(&self) -> Result<Vault, LoadError>;
}

/// Loads a vault from a JSON or TOML file.
#[derive(Debug, Clone)]
pub struct FileVaultLoader {
    path: PathBuf,
}

impl FileVaultLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VaultLoader for FileVaultLoader {
    fn load(&self) -> Result<Vault, LoadError> {
        Vault::from_file(&self.path)
    }
}

/// Hands out a copy of a vault built in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticVaultLoader {
    vault: Vault,
}

impl StaticVaultLoader {
    pub fn new(vault: Vault) -> Self {
        Self { vault }
    }
}

impl VaultLoader for StaticVaultLoader {
    fn load(&self) -> Result<Vault, LoadError> {
        Ok(self.vault.clone())
    }
}
