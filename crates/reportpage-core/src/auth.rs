//! Identity and capability checks
//!
//! The permission subsystem lives outside this crate; the runner only asks
//! an [`Authorizer`] whether an identity holds a named capability.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Group every identity belongs to implicitly.
pub const EVERYONE_GROUP: &str = "*";

/// The caller a page is run on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub name: String,
    pub groups: BTreeSet<String>,
}

impl Identity {
    /// Anonymous caller with no explicit group membership.
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
            groups: BTreeSet::new(),
        }
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: BTreeSet::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }
}

/// Capability check used to gate reports.
pub trait Authorizer: Send + Sync {
    fn has_capability(&self, identity: &Identity, capability: &str) -> bool;
}

/// Grants every capability. For trusted local tooling and tests.
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn has_capability(&self, _: &Identity, _: &str) -> bool {
        true
    }
}

/// Group → capabilities table.
///
/// Capabilities granted to [`EVERYONE_GROUP`] apply to all identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct GroupPermissions {
    grants: BTreeMap<String, BTreeSet<String>>,
}

impl GroupPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, group: impl Into<String>, capability: impl Into<String>) -> Self {
        self.grants
            .entry(group.into())
            .or_default()
            .insert(capability.into());
        self
    }

    fn group_has(&self, group: &str, capability: &str) -> bool {
        self.grants
            .get(group)
            .is_some_and(|caps| caps.contains(capability))
    }
}

impl Authorizer for GroupPermissions {
    fn has_capability(&self, identity: &Identity, capability: &str) -> bool {
        self.group_has(EVERYONE_GROUP, capability)
            || identity
                .groups
                .iter()
                .any(|group| self.group_has(group, capability))
    }
}
