use std::path::{Path, PathBuf};

pub const DEFAULT_MEMBERSHIP_FILE: &str = "hosts";
pub const GROUP_VARS_DIR: &str = "group_vars";
pub const HOST_VARS_DIR: &str = "host_vars";

/// Extensions accepted for variable files, in resolution order.
pub const VAR_FILE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Where the pieces of one inventory live on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryLayout {
    root: PathBuf,
    membership_file: String,
}

impl InventoryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            membership_file: DEFAULT_MEMBERSHIP_FILE.to_string(),
        }
    }

    pub fn with_membership_file(mut self, name: &str) -> Self {
        self.membership_file = name.to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn membership_path(&self) -> PathBuf {
        self.root.join(&self.membership_file)
    }

    pub fn group_vars_dir(&self) -> PathBuf {
        self.root.join(GROUP_VARS_DIR)
    }

    pub fn host_vars_dir(&self) -> PathBuf {
        self.root.join(HOST_VARS_DIR)
    }

    /// Path of `<host>.yaml`, else `<host>.yml`, if either exists.
    pub fn host_vars_file(&self, host: &str) -> Option<PathBuf> {
        resolve_var_file(&self.host_vars_dir(), host)
    }

    pub fn has_host_vars_file(&self, host: &str) -> bool {
        self.host_vars_file(host).is_some()
    }
}

pub fn resolve_var_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    VAR_FILE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|p| p.is_file())
}

/// File name stem when `name` carries a variable-file extension (case-sensitive).
pub fn var_file_stem(name: &str) -> Option<&str> {
    VAR_FILE_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext)?.strip_suffix('.'))
        .filter(|stem| !stem.is_empty())
}
