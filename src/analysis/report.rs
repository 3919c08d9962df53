//! Per-host defect records, the handoff between analysis and cleanup.
//!
//! Records hold structured findings. The sentinel strings below are only
//! produced by the `*_display` methods used at export time.

use super::consistency::Consistency;
use super::crossref::{CrossReference, DuplicatedVariable, InconsistentVariable};
use crate::inventory::Inventory;
use crate::vars::{display_value, LoadIssue};
use serde::Serialize;
use std::fmt;

pub const NO_GROUP_ASSIGNED: &str = "No group assigned";
pub const NO_DUPLICATED_VARIABLES: &str = "No duplicated variables";
pub const NO_INCONSISTENT_VARIABLES: &str = "No inconsistent variables";
pub const NO_DUPLICATION_IN_GROUPS: &str = "No duplication in groups";
pub const NOT_APPLICABLE: &str = "N/A";
pub const YES: &str = "Yes";
pub const NO: &str = "No";

impl fmt::Display for DuplicatedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in {} and {})", self.key, self.group_file, self.host)
    }
}

impl fmt::Display for InconsistentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} value = {}, {} value = {})",
            self.key,
            self.group_file,
            display_value(&self.group_value),
            self.host,
            display_value(&self.host_value)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectRecord {
    pub host: String,
    /// Declared groups in membership order; empty for orphans.
    pub groups: Vec<String>,
    pub duplicated_variables: Vec<DuplicatedVariable>,
    pub inconsistent_variables: Vec<InconsistentVariable>,
    /// Every declared group when the host is declared more than once.
    pub duplicated_host: Vec<String>,
    pub missing_file: bool,
    pub orphaned_host_var: bool,
}

impl DefectRecord {
    pub fn orphan(host: &str) -> Self {
        Self {
            host: host.to_string(),
            groups: Vec::new(),
            duplicated_variables: Vec::new(),
            inconsistent_variables: Vec::new(),
            duplicated_host: Vec::new(),
            missing_file: false,
            orphaned_host_var: true,
        }
    }

    pub fn is_duplicated_host(&self) -> bool {
        !self.duplicated_host.is_empty()
    }

    /// Membership lines for this host should be dropped.
    pub fn drops_membership(&self) -> bool {
        self.is_duplicated_host() || self.missing_file
    }

    /// Keys to delete from the host's variable file, as found in group files.
    pub fn flagged_keys(&self) -> impl Iterator<Item = &str> {
        self.duplicated_variables
            .iter()
            .map(|d| d.key.as_str())
            .chain(self.inconsistent_variables.iter().map(|i| i.key.as_str()))
    }

    pub fn has_defects(&self) -> bool {
        self.drops_membership()
            || self.orphaned_host_var
            || !self.duplicated_variables.is_empty()
            || !self.inconsistent_variables.is_empty()
    }

    pub fn groups_display(&self) -> String {
        if self.orphaned_host_var {
            NO_GROUP_ASSIGNED.to_string()
        } else {
            self.groups.join(", ")
        }
    }

    pub fn duplicated_variables_display(&self) -> String {
        if self.orphaned_host_var {
            return NOT_APPLICABLE.to_string();
        }
        join_or(&self.duplicated_variables, "; ", NO_DUPLICATED_VARIABLES)
    }

    pub fn inconsistent_variables_display(&self) -> String {
        if self.orphaned_host_var {
            return NOT_APPLICABLE.to_string();
        }
        join_or(&self.inconsistent_variables, "; ", NO_INCONSISTENT_VARIABLES)
    }

    pub fn duplicated_host_display(&self) -> String {
        join_or(&self.duplicated_host, ", ", NO_DUPLICATION_IN_GROUPS)
    }

    pub fn missing_file_display(&self) -> &'static str {
        yes_no(self.missing_file)
    }

    pub fn orphaned_host_var_display(&self) -> &'static str {
        yes_no(self.orphaned_host_var)
    }
}

fn join_or<T: fmt::Display>(items: &[T], sep: &str, empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        YES
    } else {
        NO
    }
}

/// Defect records for modeled hosts (sorted), followed by orphans (sorted).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DefectReport {
    pub records: Vec<DefectRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub load_issues: Vec<LoadIssue>,
}

impl DefectReport {
    pub fn get(&self, host: &str) -> Option<&DefectRecord> {
        self.records.iter().find(|r| r.host == host)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DefectRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn defect_count(&self) -> usize {
        self.records.iter().filter(|r| r.has_defects()).count()
    }
}

pub fn build_report(
    inventory: &Inventory,
    xref: &CrossReference,
    consistency: &Consistency,
) -> DefectReport {
    let mut records = Vec::with_capacity(inventory.hosts.len() + consistency.orphans.len());

    for (name, host) in &inventory.hosts {
        records.push(DefectRecord {
            host: name.clone(),
            groups: host.groups.clone(),
            duplicated_variables: xref.duplicates_for(name).cloned().collect(),
            inconsistent_variables: xref.inconsistencies_for(name).cloned().collect(),
            duplicated_host: consistency
                .duplicated_hosts
                .get(name)
                .cloned()
                .unwrap_or_default(),
            missing_file: consistency.missing_files.contains(name),
            orphaned_host_var: false,
        });
    }

    records.extend(consistency.orphans.iter().map(|o| DefectRecord::orphan(o)));

    DefectReport {
        records,
        load_issues: Vec::new(),
    }
}
