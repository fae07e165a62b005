//! Rule-set file readers.
//!
//! A rule file is decoded against one fixed schema, chosen by the caller
//! through [`SourceKind`]. There is no schema inference: fields belonging to
//! the other kind are ignored, and anything that does not fit the chosen
//! schema is a decode error.
//!
//! Absent or null fields take their zero value, and every rule list also
//! accepts a single string in place of a one-element list.

mod cidr;
mod domain;

pub use cidr::{CidrRuleGroup, CidrRuleSet};
pub use domain::{DomainEntry, DomainRuleGroup, DomainRuleSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::{Result, SourceKind};

/// A decoded rule-set file of either kind.
#[derive(Debug, Clone)]
pub enum RuleSet {
    IpCidr(CidrRuleSet),
    Domain(DomainRuleSet),
}

/// Flattened records of a rule-set, ready for the bulk loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Records {
    Cidrs(Vec<String>),
    Domains(Vec<DomainEntry>),
}

impl RuleSet {
    /// Decode rule-set content already held in memory.
    pub fn parse(content: &str, kind: SourceKind) -> serde_json::Result<Self> {
        Ok(match kind {
            SourceKind::IpCidr => RuleSet::IpCidr(serde_json::from_str(content)?),
            SourceKind::Domain => RuleSet::Domain(serde_json::from_str(content)?),
        })
    }

    /// Read and decode a rule-set file.
    pub fn from_file(path: impl AsRef<Path>, kind: SourceKind) -> Result<Self> {
        let path = path.as_ref();
        Ok(match kind {
            SourceKind::IpCidr => RuleSet::IpCidr(decode_file(path)?),
            SourceKind::Domain => RuleSet::Domain(decode_file(path)?),
        })
    }

    /// The kind this rule-set was decoded as.
    pub fn kind(&self) -> SourceKind {
        match self {
            RuleSet::IpCidr(_) => SourceKind::IpCidr,
            RuleSet::Domain(_) => SourceKind::Domain,
        }
    }

    /// Format version declared by the file.
    pub fn version(&self) -> i64 {
        match self {
            RuleSet::IpCidr(set) => set.version,
            RuleSet::Domain(set) => set.version,
        }
    }

    /// Entries that will be stored verbatim but are not valid CIDRs or regexes.
    pub fn lint(&self) -> Vec<String> {
        match self {
            RuleSet::IpCidr(set) => set
                .invalid_cidrs()
                .into_iter()
                .map(|c| format!("invalid CIDR {:?}", c))
                .collect(),
            RuleSet::Domain(set) => set
                .invalid_regexes()
                .into_iter()
                .map(|r| format!("invalid domain_regex {:?}", r))
                .collect(),
        }
    }

    /// Flatten into loader records.
    pub fn into_records(self) -> Records {
        match self {
            RuleSet::IpCidr(set) => Records::Cidrs(set.into_cidrs()),
            RuleSet::Domain(set) => Records::Domains(set.into_entries()),
        }
    }
}

impl Records {
    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            Records::Cidrs(v) => v.len(),
            Records::Domains(v) => v.len(),
        }
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

/// Decode a rule list written as a list, a single string, or null.
fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::One(value)) => vec![value],
        Some(StringOrList::Many(values)) => values,
    })
}

/// Decode `T`, mapping null to `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read the whole file and decode it as `T`.
fn decode_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read an IP-CIDR rule file and flatten it to its CIDR strings.
pub fn read_cidr_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let set: CidrRuleSet = decode_file(path.as_ref())?;
    Ok(set.into_cidrs())
}

/// Read a domain rule file and flatten it to `(kind, value)` entries.
pub fn read_domain_file(path: impl AsRef<Path>) -> Result<Vec<DomainEntry>> {
    let set: DomainRuleSet = decode_file(path.as_ref())?;
    Ok(set.into_entries())
}

/// Read a rule file of the given kind and flatten it.
pub fn read_rule_file(path: impl AsRef<Path>, kind: SourceKind) -> Result<Records> {
    Ok(RuleSet::from_file(path, kind)?.into_records())
}
