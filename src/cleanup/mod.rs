//! Rewrites the membership file and host variable files from a defect report.
//!
//! Each file is replaced on its own (write to a sibling temp file, then
//! rename). A run interrupted halfway leaves some files cleaned and others
//! not; running again finishes the job.

use crate::analysis::{DefectRecord, DefectReport};
use crate::error::{InventoryError, Result};
use crate::inventory::{classify_line, Line};
use crate::layout::InventoryLayout;
use crate::vars::{display_value, load_file};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    DuplicatedHost,
    MissingFile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovedLine {
    /// 1-based line number in the original file.
    pub line: usize,
    pub host: String,
    pub reason: DropReason,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostFileChange {
    pub host: String,
    pub path: PathBuf,
    /// Keys as spelled in the host file.
    pub removed_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedHost {
    pub host: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CleanupSummary {
    pub check_mode: bool,
    pub removed_lines: Vec<RemovedLine>,
    pub host_files: Vec<HostFileChange>,
    pub skipped: Vec<SkippedHost>,
}

impl CleanupSummary {
    pub fn is_noop(&self) -> bool {
        self.removed_lines.is_empty() && self.host_files.is_empty()
    }
}

/// Applies a defect report to the inventory described by a layout.
#[derive(Debug)]
pub struct Cleaner<'a> {
    layout: &'a InventoryLayout,
    check_mode: bool,
}

impl<'a> Cleaner<'a> {
    pub fn new(layout: &'a InventoryLayout) -> Self {
        Self {
            layout,
            check_mode: false,
        }
    }

    /// Compute every change without writing anything.
    pub fn check_mode(mut self, enabled: bool) -> Self {
        self.check_mode = enabled;
        self
    }

    pub fn run(&self, report: &DefectReport) -> Result<CleanupSummary> {
        let removed_lines = self.clean_membership(report)?;
        let (host_files, skipped) = self.clean_host_vars(report)?;

        Ok(CleanupSummary {
            check_mode: self.check_mode,
            removed_lines,
            host_files,
            skipped,
        })
    }

    pub fn clean_membership(&self, report: &DefectReport) -> Result<Vec<RemovedLine>> {
        let path = self.layout.membership_path();
        let content = std::fs::read_to_string(&path).map_err(|source| {
            InventoryError::Membership {
                path: path.clone(),
                source,
            }
        })?;

        let (cleaned, removed) = filter_membership(&content, report);

        for r in &removed {
            match r.reason {
                DropReason::DuplicatedHost => info!(
                    host = %r.host,
                    line = r.line,
                    "removing duplicated host from group definitions"
                ),
                DropReason::MissingFile => info!(
                    host = %r.host,
                    line = r.line,
                    "removing host without a host_vars file"
                ),
            }
        }

        if !removed.is_empty() && !self.check_mode {
            write_atomic(&path, cleaned.as_bytes())?;
        }

        Ok(removed)
    }

    pub fn clean_host_vars(
        &self,
        report: &DefectReport,
    ) -> Result<(Vec<HostFileChange>, Vec<SkippedHost>)> {
        let mut changes = Vec::new();
        let mut skipped = Vec::new();

        for record in report.iter() {
            let Some(path) = self.layout.host_vars_file(&record.host) else {
                warn!(host = %record.host, "host file not found, skipping");
                skipped.push(SkippedHost {
                    host: record.host.clone(),
                    reason: "host_vars file not found".to_string(),
                });
                continue;
            };

            if record.flagged_keys().next().is_none() {
                debug!(host = %record.host, "no flagged variables");
                continue;
            }

            let document = match load_file(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "cannot load host file, skipping");
                    skipped.push(SkippedHost {
                        host: record.host.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let (cleaned, removed_keys) = remove_flagged_keys(document, record);
            if removed_keys.is_empty() {
                continue;
            }

            for key in &removed_keys {
                info!(key = %key, file = %path.display(), "removing variable");
            }

            if !self.check_mode {
                let rendered = serde_yaml::to_string(&Value::Mapping(cleaned)).map_err(|source| {
                    InventoryError::Serialize {
                        path: path.clone(),
                        source,
                    }
                })?;
                write_atomic(&path, rendered.as_bytes())?;
            }

            changes.push(HostFileChange {
                host: record.host.clone(),
                path,
                removed_keys,
            });
        }

        Ok((changes, skipped))
    }
}

/// Cleans the inventory rooted at `root` using the default layout.
pub fn clean(root: impl AsRef<Path>, report: &DefectReport) -> Result<CleanupSummary> {
    let layout = InventoryLayout::new(root.as_ref());
    Cleaner::new(&layout).run(report)
}

/// Drops host lines whose record is a duplicated host or has a missing file.
/// Every other line is kept byte for byte.
pub fn filter_membership(content: &str, report: &DefectReport) -> (String, Vec<RemovedLine>) {
    let droppable: HashMap<&str, DropReason> = report
        .iter()
        .filter_map(|r| drop_reason(r).map(|reason| (r.host.as_str(), reason)))
        .collect();

    let mut kept = String::with_capacity(content.len());
    let mut removed = Vec::new();

    for (idx, raw) in content.split_inclusive('\n').enumerate() {
        if let Line::Host(host) = classify_line(raw) {
            if let Some(&reason) = droppable.get(host) {
                removed.push(RemovedLine {
                    line: idx + 1,
                    host: host.to_string(),
                    reason,
                    text: raw.trim_end().to_string(),
                });
                continue;
            }
        }
        kept.push_str(raw);
    }

    (kept, removed)
}

fn drop_reason(record: &DefectRecord) -> Option<DropReason> {
    if record.is_duplicated_host() {
        Some(DropReason::DuplicatedHost)
    } else if record.missing_file {
        Some(DropReason::MissingFile)
    } else {
        None
    }
}

/// Removes every key flagged in `record`, matching names case-insensitively.
/// Returns the remaining document and the removed keys as spelled in it.
pub fn remove_flagged_keys(document: Mapping, record: &DefectRecord) -> (Mapping, Vec<String>) {
    let mut lookup: HashMap<String, Vec<Value>> = HashMap::new();
    for key in document.keys() {
        lookup
            .entry(display_value(key).to_lowercase())
            .or_default()
            .push(key.clone());
    }

    let mut doomed: HashSet<Value> = HashSet::new();
    let mut removed_keys = Vec::new();
    for flagged in record.flagged_keys() {
        let Some(originals) = lookup.get(&flagged.to_lowercase()) else {
            continue;
        };
        for original in originals {
            if doomed.insert(original.clone()) {
                removed_keys.push(display_value(original));
            }
        }
    }

    let kept = document
        .into_iter()
        .filter(|(k, _)| !doomed.contains(k))
        .collect();

    (kept, removed_keys)
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    let write_err = |source| InventoryError::Write {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp, contents).map_err(write_err)?;
    if let Ok(meta) = std::fs::metadata(path) {
        std::fs::set_permissions(&tmp, meta.permissions()).map_err(write_err)?;
    }
    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        InventoryError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}
