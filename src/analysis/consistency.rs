use crate::error::Result;
use crate::inventory::Inventory;
use crate::layout::{var_file_stem, InventoryLayout};
use crate::vars::list_var_files;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Consistency {
    /// Modeled hosts whose variable file is gone at check time.
    pub missing_files: BTreeSet<String>,
    /// Host variable file stems with no membership declaration.
    pub orphans: BTreeSet<String>,
    /// Hosts declared more than once, with every declared group.
    pub duplicated_hosts: BTreeMap<String, Vec<String>>,
}

pub fn check(inventory: &Inventory, layout: &InventoryLayout) -> Result<Consistency> {
    Ok(Consistency {
        missing_files: missing_files(inventory, layout),
        orphans: orphans(inventory, &list_var_files(&layout.host_vars_dir())?),
        duplicated_hosts: duplicated_hosts(inventory),
    })
}

/// Re-probes `host_vars/` for every modeled host. Empty unless files were
/// removed after the membership file was parsed.
pub fn missing_files(inventory: &Inventory, layout: &InventoryLayout) -> BTreeSet<String> {
    inventory
        .hosts
        .keys()
        .filter(|host| !layout.has_host_vars_file(host))
        .cloned()
        .collect()
}

pub fn orphans(inventory: &Inventory, host_var_files: &[String]) -> BTreeSet<String> {
    host_var_files
        .iter()
        .filter_map(|name| var_file_stem(name))
        .filter(|stem| !inventory.contains_host(stem))
        .map(str::to_string)
        .collect()
}

pub fn duplicated_hosts(inventory: &Inventory) -> BTreeMap<String, Vec<String>> {
    inventory
        .hosts
        .values()
        .filter(|host| host.groups.len() > 1)
        .map(|host| (host.name.clone(), host.groups.clone()))
        .collect()
}
