use crate::error::{InventoryError, Result};
use crate::layout::InventoryLayout;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^\[(.*)\]$").expect("header pattern is valid"))
}

/// One classified line of the membership file.
#[derive(Debug, PartialEq)]
pub enum Line<'a> {
    Blank,
    Comment,
    Header(&'a str),
    Host(&'a str),
}

/// Classifies a raw line. Inline `key=value` tokens after the host are ignored.
pub fn classify_line(line: &str) -> Line<'_> {
    let line = line.trim();

    if line.is_empty() {
        return Line::Blank;
    }
    if line.starts_with('#') {
        return Line::Comment;
    }
    if let Some(caps) = header_regex().captures(line) {
        let name = caps.get(1).map_or("", |m| m.as_str().trim());
        return Line::Header(name);
    }

    match line.split_whitespace().next() {
        Some(host) => Line::Host(host),
        None => Line::Blank,
    }
}

#[derive(Debug, Default, PartialEq, Clone, Serialize)]
pub struct Host {
    pub name: String,
    /// Every accepted declaration appends its group, duplicates included.
    pub groups: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize)]
pub struct Group {
    pub name: String,
    pub hosts: Vec<String>,
}

/// Group membership as declared in the membership file, restricted to hosts
/// that have a backing variable file.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub hosts: BTreeMap<String, Host>,
    pub groups: BTreeMap<String, Group>,
}

impl Inventory {
    /// Reads the membership file named by `layout`, probing `host_vars/` for
    /// every declared host.
    pub fn load(layout: &InventoryLayout) -> Result<Self> {
        let path = layout.membership_path();
        let content = std::fs::read_to_string(&path)
            .map_err(|source| InventoryError::Membership { path, source })?;

        Ok(Self::from_ini(&content, |host| layout.has_host_vars_file(host)))
    }

    pub fn from_ini<F>(content: &str, has_host_file: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let mut inventory = Inventory::default();
        let mut current_group: Option<String> = None;

        for (idx, raw) in content.lines().enumerate() {
            match classify_line(raw) {
                Line::Blank | Line::Comment => {}
                Line::Header("") => current_group = None,
                Line::Header(name) => {
                    // A repeated header starts the group's host list over;
                    // per-host group lists keep every declaration.
                    current_group = Some(name.to_string());
                    inventory.groups.insert(
                        name.to_string(),
                        Group {
                            name: name.to_string(),
                            ..Default::default()
                        },
                    );
                }
                Line::Host(host_name) => {
                    let Some(group) = current_group.as_ref() else {
                        debug!(line = idx + 1, host = host_name, "host outside any group, ignored");
                        continue;
                    };

                    if !has_host_file(host_name) {
                        debug!(line = idx + 1, host = host_name, "no host_vars file, excluded");
                        continue;
                    }

                    if let Some(g) = inventory.groups.get_mut(group) {
                        g.hosts.push(host_name.to_string());
                    }

                    inventory
                        .hosts
                        .entry(host_name.to_string())
                        .or_insert_with(|| Host {
                            name: host_name.to_string(),
                            ..Default::default()
                        })
                        .groups
                        .push(group.clone());
                }
            }
        }

        inventory
    }

    pub fn contains_host(&self, name: &str) -> bool {
        self.hosts.contains_key(name)
    }
}
