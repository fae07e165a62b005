//! Load configuration.
//!
//! The built-in [`LoadConfig::default`] reproduces the meta-rules-dat layout;
//! a YAML file with the same shape replaces it:
//!
//! ```yaml
//! database: ./ipdomain.db
//! storage:
//!   journal_mode: WAL
//!   synchronous: OFF
//!   temp_store: MEMORY
//! sources:
//!   - name: geoip
//!     dir: meta-rules-dat/geo/geoip
//!     kind: ip_cidr
//!     table_prefix: geoip_
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::{Result, SourceKind};

/// Default output database path.
pub const DEFAULT_DATABASE: &str = "./ipdomain.db";

/// SQLite `journal_mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

/// SQLite `synchronous` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Synchronous {
    Off,
    Normal,
    Full,
    Extra,
}

/// SQLite `temp_store` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TempStore {
    Default,
    File,
    Memory,
}

impl JournalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Memory => "MEMORY",
            JournalMode::Wal => "WAL",
            JournalMode::Off => "OFF",
        }
    }
}

impl Synchronous {
    pub fn as_str(&self) -> &'static str {
        match self {
            Synchronous::Off => "OFF",
            Synchronous::Normal => "NORMAL",
            Synchronous::Full => "FULL",
            Synchronous::Extra => "EXTRA",
        }
    }
}

impl TempStore {
    pub fn as_str(&self) -> &'static str {
        match self {
            TempStore::Default => "DEFAULT",
            TempStore::File => "FILE",
            TempStore::Memory => "MEMORY",
        }
    }
}

/// Connection-level storage settings, applied once when the database opens.
///
/// The defaults trade crash safety for bulk-load speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub journal_mode: JournalMode,
    pub synchronous: Synchronous,
    pub temp_store: TempStore,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            journal_mode: JournalMode::Wal,
            synchronous: Synchronous::Off,
            temp_store: TempStore::Memory,
        }
    }
}

/// One directory of rule files loaded with a common schema and table prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name used to select the source from the command line
    pub name: String,
    /// Directory walked recursively for rule files
    pub dir: PathBuf,
    /// Schema of every file in the directory
    pub kind: SourceKind,
    /// Prepended to each file stem before sanitizing
    #[serde(default)]
    pub table_prefix: String,
}

impl SourceConfig {
    /// Create a new SourceConfig.
    pub fn new(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        kind: SourceKind,
        table_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            kind,
            table_prefix: table_prefix.into(),
        }
    }
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {:?})", self.name, self.kind, self.dir)
    }
}

/// Full configuration of a load run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Output SQLite database
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Sources in processing order
    pub sources: Vec<SourceConfig>,
}

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE)
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            storage: StorageConfig::default(),
            sources: vec![
                SourceConfig::new("geoip", "meta-rules-dat/geo/geoip", SourceKind::IpCidr, "geoip_"),
                SourceConfig::new(
                    "geoip-lite",
                    "meta-rules-dat/geo-lite/geoip",
                    SourceKind::IpCidr,
                    "geoip_lite_",
                ),
                SourceConfig::new(
                    "geosite-lite",
                    "meta-rules-dat/geo-lite/geosite",
                    SourceKind::Domain,
                    "domain_lite_",
                ),
                SourceConfig::new("geosite", "meta-rules-dat/geo/geosite", SourceKind::Domain, "domain_"),
                SourceConfig::new("asn", "meta-rules-dat/asn", SourceKind::IpCidr, ""),
            ],
        }
    }
}

impl LoadConfig {
    /// Parse a configuration from YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Look up a source by name.
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Keep only the named sources, in configuration order.
    ///
    /// An empty selection keeps every source.
    pub fn select(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names.iter().find(|n| self.source(n).is_none()) {
            return Err(Error::UnknownSource(unknown.clone()));
        }
        self.sources.retain(|s| names.contains(&s.name));
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (i, source) in self.sources.iter().enumerate() {
            if source.name.is_empty() {
                return Err(Error::Config(format!("source #{} has an empty name", i)));
            }
            if self.sources[..i].iter().any(|s| s.name == source.name) {
                return Err(Error::Config(format!("duplicate source name: {}", source.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources() {
        let config = LoadConfig::default();
        assert_eq!(config.database, PathBuf::from("./ipdomain.db"));
        assert_eq!(config.sources.len(), 5);

        let geosite = config.source("geosite").unwrap();
        assert_eq!(geosite.kind, SourceKind::Domain);
        assert_eq!(geosite.table_prefix, "domain_");

        let asn = config.source("asn").unwrap();
        assert_eq!(asn.kind, SourceKind::IpCidr);
        assert!(asn.table_prefix.is_empty());
    }

    #[test]
    fn test_default_storage() {
        let storage = StorageConfig::default();
        assert_eq!(storage.journal_mode, JournalMode::Wal);
        assert_eq!(storage.synchronous, Synchronous::Off);
        assert_eq!(storage.temp_store, TempStore::Memory);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
storage:
  synchronous: NORMAL
sources:
  - name: cn
    dir: rules/cn
    kind: domain
    table_prefix: domain_
  - name: asn
    dir: rules/asn
    kind: ip_cidr
"#;
        let config = LoadConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.database, PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(config.storage.synchronous, Synchronous::Normal);
        assert_eq!(config.storage.journal_mode, JournalMode::Wal);
        assert_eq!(config.sources[1].table_prefix, "");
        assert_eq!(config.sources[1].kind, SourceKind::IpCidr);
    }

    #[test]
    fn test_yaml_roundtrip_of_default() {
        let config = LoadConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("journal_mode: WAL"));
        assert_eq!(LoadConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let yaml = r#"
sources:
  - { name: a, dir: x, kind: domain }
  - { name: a, dir: y, kind: ip_cidr }
"#;
        assert!(matches!(LoadConfig::from_yaml(yaml), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_kind_rejected() {
        let yaml = "sources:\n  - { name: a, dir: x, kind: process }\n";
        assert!(matches!(LoadConfig::from_yaml(yaml), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_select() {
        let mut config = LoadConfig::default();
        config
            .select(&["asn".to_string(), "geoip".to_string()])
            .unwrap();
        let names: Vec<_> = config.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["geoip", "asn"]);

        let mut config = LoadConfig::default();
        assert!(matches!(
            config.select(&["nope".to_string()]),
            Err(Error::UnknownSource(_))
        ));
        config.select(&[]).unwrap();
        assert_eq!(config.sources.len(), 5);
    }
}
