//! Group-file against host-file variable comparison.
//!
//! Every group file is compared with every host file, whether or not the host
//! belongs to that group.

use crate::vars::{display_value, VarsCollection};
use serde::Serialize;
use serde_yaml::Value;

/// A key defined both in a group file and in a host file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicatedVariable {
    pub key: String,
    pub group_file: String,
    pub host: String,
}

/// A key defined in both files with different values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InconsistentVariable {
    pub key: String,
    pub group_file: String,
    pub host: String,
    pub group_value: Value,
    pub host_value: Value,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CrossReference {
    pub duplicates: Vec<DuplicatedVariable>,
    pub inconsistencies: Vec<InconsistentVariable>,
}

impl CrossReference {
    pub fn duplicates_for<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a DuplicatedVariable> {
        self.duplicates.iter().filter(move |d| d.host == host)
    }

    pub fn inconsistencies_for<'a>(
        &'a self,
        host: &'a str,
    ) -> impl Iterator<Item = &'a InconsistentVariable> {
        self.inconsistencies.iter().filter(move |i| i.host == host)
    }
}

pub fn cross_reference(group_vars: &VarsCollection, host_vars: &VarsCollection) -> CrossReference {
    CrossReference {
        duplicates: find_duplicates(group_vars, host_vars),
        inconsistencies: find_inconsistencies(group_vars, host_vars),
    }
}

pub fn find_duplicates(
    group_vars: &VarsCollection,
    host_vars: &VarsCollection,
) -> Vec<DuplicatedVariable> {
    let mut found = Vec::new();

    for (group_file, group_doc) in &group_vars.files {
        for (_, host, host_doc) in host_vars.iter_stems() {
            for key in group_doc.keys() {
                if host_doc.contains_key(key) {
                    found.push(DuplicatedVariable {
                        key: display_value(key),
                        group_file: group_file.clone(),
                        host: host.to_string(),
                    });
                }
            }
        }
    }

    found
}

pub fn find_inconsistencies(
    group_vars: &VarsCollection,
    host_vars: &VarsCollection,
) -> Vec<InconsistentVariable> {
    let mut found = Vec::new();

    for (group_file, group_doc) in &group_vars.files {
        for (_, host, host_doc) in host_vars.iter_stems() {
            for (key, group_value) in group_doc {
                match host_doc.get(key) {
                    Some(host_value) if !values_equal(group_value, host_value) => {
                        found.push(InconsistentVariable {
                            key: display_value(key),
                            group_file: group_file.clone(),
                            host: host.to_string(),
                            group_value: group_value.clone(),
                            host_value: host_value.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    found
}

/// Structural equality where an integer equals a float of the same value.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if x.is_f64() || y.is_f64() {
                x.as_f64() == y.as_f64()
            } else {
                x == y
            }
        }
        (Value::Sequence(xs), Value::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Mapping(xm), Value::Mapping(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
