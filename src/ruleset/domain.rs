//! Domain rule-set files.

use regex::Regex;
use serde::Deserialize;

use super::{null_as_default, string_or_list};
use crate::DomainKind;

/// A domain rule-set file.
///
/// Every group may carry any subset of the four domain lists.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainRuleSet {
    /// Format version as written by the producer, 0 when absent
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: i64,
    /// Rule groups in file order
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<DomainRuleGroup>,
}

/// One element of the `rules` array of a domain rule-set.
///
/// Each list may also be written as a single string, or be null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainRuleGroup {
    #[serde(default, deserialize_with = "string_or_list")]
    pub domain: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub domain_suffix: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub domain_keyword: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub domain_regex: Vec<String>,
}

impl DomainRuleGroup {
    /// The group's lists paired with their kind, in column order.
    fn lists(&self) -> [(DomainKind, &Vec<String>); 4] {
        [
            (DomainKind::Domain, &self.domain),
            (DomainKind::DomainSuffix, &self.domain_suffix),
            (DomainKind::DomainKeyword, &self.domain_keyword),
            (DomainKind::DomainRegex, &self.domain_regex),
        ]
    }

    fn len(&self) -> usize {
        self.lists().iter().map(|(_, l)| l.len()).sum()
    }
}

/// A flattened domain rule: the kind selects the column, the value fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    pub kind: DomainKind,
    pub value: String,
}

impl DomainEntry {
    /// Create a new entry.
    pub fn new(kind: DomainKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl DomainRuleSet {
    /// Total number of entries across all groups and lists.
    pub fn len(&self) -> usize {
        self.rules.iter().map(DomainRuleGroup::len).sum()
    }

    /// Check if the rule-set has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into `(kind, value)` entries.
    ///
    /// Groups are visited in file order; within a group all `domain`
    /// entries come first, then `domain_suffix`, `domain_keyword` and
    /// `domain_regex`.
    pub fn into_entries(self) -> Vec<DomainEntry> {
        let mut out = Vec::with_capacity(self.len());
        for group in self.rules {
            let DomainRuleGroup {
                domain,
                domain_suffix,
                domain_keyword,
                domain_regex,
            } = group;
            for (kind, list) in [
                (DomainKind::Domain, domain),
                (DomainKind::DomainSuffix, domain_suffix),
                (DomainKind::DomainKeyword, domain_keyword),
                (DomainKind::DomainRegex, domain_regex),
            ] {
                out.extend(list.into_iter().map(|value| DomainEntry { kind, value }));
            }
        }
        out
    }

    /// Number of entries of one kind.
    pub fn count(&self, kind: DomainKind) -> usize {
        self.rules
            .iter()
            .map(|g| g.lists()[kind.index()].1.len())
            .sum()
    }

    /// `domain_regex` entries that do not compile.
    pub fn invalid_regexes(&self) -> Vec<&str> {
        self.rules
            .iter()
            .flat_map(|g| g.domain_regex.iter())
            .filter(|r| Regex::new(r).is_err())
            .map(String::as_str)
            .collect()
    }
}
