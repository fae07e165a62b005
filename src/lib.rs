//! ruledb - load rule-set files into SQLite.
//!
//! This crate reads sing-box style rule-set source files (as published by
//! meta-rules-dat) and bulk-loads them into one SQLite table per file, so
//! the rules can be queried with plain SQL.
//!
//! # Features
//!
//! - **IP-CIDR rule-sets**: `{"rules": [{"ip_cidr": [...]}]}` into `(id, ip_cidr)` tables
//! - **Domain rule-sets**: `domain`, `domain_suffix`, `domain_keyword` and
//!   `domain_regex` lists into `(id, domain, domain_suffix, domain_keyword, domain_regex)` tables
//! - **Transactional bulk load**: one transaction and one prepared statement per file
//! - **Table naming**: file stems such as `geolocation-!cn` become `domain_geolocation_not_cn`
//! - **YAML configuration**: source directories, table prefixes and SQLite settings
//!
//! # Quick Start
//!
//! ```ignore
//! use ruledb::{Database, LoadConfig, Pipeline};
//!
//! let config = LoadConfig::default();
//! let mut db = Database::open(&config.database, &config.storage)?;
//! let report = Pipeline::new(&mut db).run(&config)?;
//! println!("{} rows in {:?}", report.total_rows(), report.elapsed);
//! ```
//!
//! Loading a single file:
//!
//! ```ignore
//! use ruledb::{read_cidr_file, Database, StorageConfig};
//!
//! let mut db = Database::open("ipdomain.db", &StorageConfig::default())?;
//! let cidrs = read_cidr_file("meta-rules-dat/geo/geoip/cn.json")?;
//! db.load_cidrs("geoip_cn", &cidrs)?;
//! ```
//!
//! # Errors
//!
//! Every error is fatal for a run: the pipeline returns the first one and
//! processes no further files.

mod error;
mod rule_type;

pub mod config;
pub mod pipeline;
pub mod ruleset;
pub mod store;
pub mod table;

// Re-export core types
pub use error::{Error, Result};
pub use rule_type::{DomainKind, SourceKind};

pub use config::{JournalMode, LoadConfig, SourceConfig, StorageConfig, Synchronous, TempStore};
pub use pipeline::{list_files, Pipeline, RunReport, SourceReport, TableReport};
pub use ruleset::{
    read_cidr_file, read_domain_file, read_rule_file, CidrRuleSet, DomainEntry, DomainRuleSet,
    Records, RuleSet,
};
pub use store::{Database, TableRow};
pub use table::{sanitize_table_name, table_name};
