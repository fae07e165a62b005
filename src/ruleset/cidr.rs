//! IP-CIDR rule-set files.

use ipnet::IpNet;
use serde::Deserialize;

use super::{null_as_default, string_or_list};

/// An IP-CIDR rule-set file.
///
/// ```json
/// { "version": 1, "rules": [ { "ip_cidr": ["5.62.60.5/32", "34.99.208.0/23"] } ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CidrRuleSet {
    /// Format version as written by the producer, 0 when absent
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: i64,
    /// Rule groups in file order
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<CidrRuleGroup>,
}

/// One element of the `rules` array of an IP-CIDR rule-set.
///
/// `ip_cidr` may be a list, a single string, null or absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CidrRuleGroup {
    #[serde(default, deserialize_with = "string_or_list")]
    pub ip_cidr: Vec<String>,
}

impl CidrRuleSet {
    /// Total number of CIDR entries across all groups.
    pub fn len(&self) -> usize {
        self.rules.iter().map(|r| r.ip_cidr.len()).sum()
    }

    /// Check if the rule-set has no CIDR entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten all groups into one list, keeping file order and duplicates.
    ///
    /// Entries are passed through verbatim.
    pub fn into_cidrs(self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len());
        for group in self.rules {
            out.extend(group.ip_cidr);
        }
        out
    }

    /// Entries that do not parse as an IPv4 or IPv6 network.
    pub fn invalid_cidrs(&self) -> Vec<&str> {
        self.rules
            .iter()
            .flat_map(|r| r.ip_cidr.iter())
            .filter(|c| c.trim().parse::<IpNet>().is_err())
            .map(String::as_str)
            .collect()
    }
}
