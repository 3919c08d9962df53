pub mod analysis;
pub mod cleanup;
pub mod error;
pub mod export;
pub mod inventory;
pub mod layout;
pub mod vars;

#[cfg(test)]
mod testutil;

pub use analysis::{analyze, analyze_layout, DefectRecord, DefectReport};
pub use cleanup::{clean, Cleaner, CleanupSummary};
pub use error::{InventoryError, Result};
pub use layout::InventoryLayout;
