pub mod consistency;
pub mod crossref;
pub mod report;

pub use consistency::Consistency;
pub use crossref::{CrossReference, DuplicatedVariable, InconsistentVariable};
pub use report::{DefectRecord, DefectReport};

use crate::error::Result;
use crate::inventory::Inventory;
use crate::layout::InventoryLayout;
use crate::vars::VarsCollection;
use std::path::Path;
use tracing::info;

/// Analyzes the inventory rooted at `root` using the default layout.
pub fn analyze(root: impl AsRef<Path>) -> Result<DefectReport> {
    analyze_layout(&InventoryLayout::new(root.as_ref()))
}

pub fn analyze_layout(layout: &InventoryLayout) -> Result<DefectReport> {
    let inventory = Inventory::load(layout)?;
    let group_vars = VarsCollection::load_dir(&layout.group_vars_dir())?;
    let host_vars = VarsCollection::load_dir(&layout.host_vars_dir())?;

    info!(
        hosts = inventory.hosts.len(),
        groups = inventory.groups.len(),
        group_files = group_vars.len(),
        host_files = host_vars.len(),
        "inventory loaded"
    );

    let xref = crossref::cross_reference(&group_vars, &host_vars);
    let consistency = consistency::check(&inventory, layout)?;

    let mut report = report::build_report(&inventory, &xref, &consistency);
    report.load_issues = group_vars.issues;
    report.load_issues.extend(host_vars.issues);

    info!(
        records = report.len(),
        with_defects = report.defect_count(),
        "analysis complete"
    );

    Ok(report)
}
