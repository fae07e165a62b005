//! Rule kind definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a rule file, selecting both the JSON schema and the table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `{"rules": [{"ip_cidr": [...]}]}`
    IpCidr,
    /// `{"rules": [{"domain": [...], "domain_suffix": [...], ...}]}`
    Domain,
}

impl SourceKind {
    /// Parse a source kind from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ip_cidr" | "ip-cidr" | "ipcidr" | "geoip" | "asn" => Some(SourceKind::IpCidr),
            "domain" | "geosite" => Some(SourceKind::Domain),
            _ => None,
        }
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::IpCidr => "ip_cidr",
            SourceKind::Domain => "domain",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a single domain rule entry.
///
/// The string form doubles as the JSON field name and the table column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    /// Exact domain match
    Domain,
    /// Domain suffix match
    DomainSuffix,
    /// Substring match
    DomainKeyword,
    /// Regular expression match
    DomainRegex,
}

impl DomainKind {
    /// All kinds, in column order.
    pub const ALL: [DomainKind; 4] = [
        DomainKind::Domain,
        DomainKind::DomainSuffix,
        DomainKind::DomainKeyword,
        DomainKind::DomainRegex,
    ];

    /// Column name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainKind::Domain => "domain",
            DomainKind::DomainSuffix => "domain_suffix",
            DomainKind::DomainKeyword => "domain_keyword",
            DomainKind::DomainRegex => "domain_regex",
        }
    }

    /// Position of this kind's column among the domain columns.
    pub fn index(&self) -> usize {
        match self {
            DomainKind::Domain => 0,
            DomainKind::DomainSuffix => 1,
            DomainKind::DomainKeyword => 2,
            DomainKind::DomainRegex => 3,
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
