use crate::layout::{InventoryLayout, GROUP_VARS_DIR, HOST_VARS_DIR};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Throwaway inventory on disk with empty `group_vars/` and `host_vars/`.
pub struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        fs::create_dir_all(tmp.path().join(GROUP_VARS_DIR)).expect("create group_vars");
        fs::create_dir_all(tmp.path().join(HOST_VARS_DIR)).expect("create host_vars");
        Self { tmp }
    }

    pub fn hosts(self, content: &str) -> Self {
        fs::write(self.root().join("hosts"), content).expect("write hosts");
        self
    }

    pub fn group_var(self, name: &str, content: &str) -> Self {
        fs::write(self.root().join(GROUP_VARS_DIR).join(name), content).expect("write group var");
        self
    }

    pub fn host_var(self, name: &str, content: &str) -> Self {
        fs::write(self.root().join(HOST_VARS_DIR).join(name), content).expect("write host var");
        self
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn layout(&self) -> InventoryLayout {
        InventoryLayout::new(self.root())
    }

    pub fn host_var_path(&self, name: &str) -> PathBuf {
        self.root().join(HOST_VARS_DIR).join(name)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).expect("read fixture file")
    }
}
