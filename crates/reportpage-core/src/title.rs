//! Title info for emitted rows
//!
//! Rows identify their subject by `(namespace_id, local_name)`. Callers get
//! both the numeric namespace and a display title with the namespace prefix
//! applied.

use serde::Serialize;
use std::collections::BTreeMap;

/// Namespace id paired with the prefixed display title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleInfo {
    pub ns: i32,
    pub title: String,
}

/// Namespace id → display prefix table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    prefixes: BTreeMap<i32, String>,
}

const DEFAULT_NAMESPACES: &[(i32, &str)] = &[
    (-2, "Media"),
    (-1, "Special"),
    (0, ""),
    (1, "Talk"),
    (2, "User"),
    (3, "User talk"),
    (4, "Project"),
    (5, "Project talk"),
    (6, "File"),
    (7, "File talk"),
    (8, "MediaWiki"),
    (9, "MediaWiki talk"),
    (10, "Template"),
    (11, "Template talk"),
    (12, "Help"),
    (13, "Help talk"),
    (14, "Category"),
    (15, "Category talk"),
];

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_NAMESPACES
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
        }
    }
}

impl Namespaces {
    /// Default table with `overrides` layered on top
    pub fn with_overrides(overrides: &BTreeMap<i32, String>) -> Self {
        let mut namespaces = Self::default();
        for (id, prefix) in overrides {
            namespaces.prefixes.insert(*id, prefix.clone());
        }
        namespaces
    }

    /// Display prefix for a namespace id
    pub fn prefix(&self, ns: i32) -> String {
        match self.prefixes.get(&ns) {
            Some(prefix) => prefix.clone(),
            None => format!("ns{}", ns),
        }
    }

    /// Build title info for a row's `(namespace_id, local_name)`
    pub fn title_info(&self, ns: i32, local_name: &str) -> TitleInfo {
        let text = local_name.replace('_', " ");
        let prefix = self.prefix(ns);
        let title = if prefix.is_empty() {
            text
        } else {
            format!("{}:{}", prefix, text)
        };
        TitleInfo { ns, title }
    }
}
