//! Loading of `group_vars/` and `host_vars/` documents.
//!
//! Values are kept as opaque `serde_yaml::Value`s; nothing downstream looks
//! at them beyond equality and display.

use crate::error::{InventoryError, Result, VarFileError};
use crate::layout::var_file_stem;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A variable file that could not be used and was treated as empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadIssue {
    pub file: PathBuf,
    pub message: String,
}

/// File name to document, for every `.yaml`/`.yml` file of one directory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VarsCollection {
    pub files: BTreeMap<String, Mapping>,
    pub issues: Vec<LoadIssue>,
}

impl VarsCollection {
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut collection = VarsCollection::default();

        for name in list_var_files(dir)? {
            let path = dir.join(&name);
            let document = match load_file(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "error loading variable file");
                    collection.issues.push(LoadIssue {
                        file: path,
                        message: e.to_string(),
                    });
                    Mapping::new()
                }
            };
            debug!(file = %name, keys = document.len(), "loaded variable file");
            collection.files.insert(name, document);
        }

        Ok(collection)
    }

    pub fn insert(&mut self, file_name: &str, document: Mapping) {
        self.files.insert(file_name.to_string(), document);
    }

    pub fn get(&self, file_name: &str) -> Option<&Mapping> {
        self.files.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// (file name, stem, document) for every file.
    pub fn iter_stems(&self) -> impl Iterator<Item = (&str, &str, &Mapping)> {
        self.files.iter().map(|(name, doc)| {
            let name = name.as_str();
            (name, var_file_stem(name).unwrap_or(name), doc)
        })
    }
}

/// Names of the `.yaml`/`.yml` entries of `dir`, sorted.
pub fn list_var_files(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|source| InventoryError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InventoryError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;
        if let Some(name) = entry.file_name().to_str() {
            if var_file_stem(name).is_some() {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

/// Reads one document. An empty file is an empty mapping.
pub fn load_file(path: &Path) -> std::result::Result<Mapping, VarFileError> {
    let content = std::fs::read_to_string(path)?;
    parse_document(&content)
}

pub fn parse_document(content: &str) -> std::result::Result<Mapping, VarFileError> {
    match serde_yaml::from_str::<Value>(content)? {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(map) => Ok(map),
        other => Err(VarFileError::NotAMapping(kind_name(&other))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Display form of a key or value: scalars bare, collections as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_mapping() {
        let doc = parse_document("port: 80\nusers:\n  - alice\n").unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("port"), Some(&Value::from(80)));
    }

    #[test]
    fn empty_document_is_empty_mapping() {
        assert!(parse_document("").unwrap().is_empty());
        assert!(parse_document("---\n").unwrap().is_empty());
    }

    #[test]
    fn scalar_document_rejected() {
        let err = parse_document("just a string").unwrap_err();
        assert!(matches!(err, VarFileError::NotAMapping("string")));
    }

    #[test]
    fn load_dir_filters_extensions_and_tolerates_bad_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("web.yml"), "port: 80\n").unwrap();
        std::fs::write(tmp.path().join("db.yaml"), "port: [unclosed\n").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "port: 1\n").unwrap();
        std::fs::write(tmp.path().join("upper.YML"), "port: 1\n").unwrap();

        let vars = VarsCollection::load_dir(tmp.path()).unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("web.yml").unwrap().len(), 1);
        assert!(vars.get("db.yaml").unwrap().is_empty());
        assert_eq!(vars.issues.len(), 1);
        assert!(vars.issues[0].file.ends_with("db.yaml"));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = VarsCollection::load_dir(&tmp.path().join("host_vars")).unwrap_err();
        assert!(matches!(err, InventoryError::Directory { .. }));
    }

    #[test]
    fn stems_strip_extension() {
        let mut vars = VarsCollection::default();
        vars.insert("app1.yml", Mapping::new());
        vars.insert("db.example.com.yaml", Mapping::new());
        let stems: Vec<&str> = vars.iter_stems().map(|(_, stem, _)| stem).collect();
        assert_eq!(stems, vec!["app1", "db.example.com"]);
    }

    #[test]
    fn display_values() {
        assert_eq!(display_value(&Value::from(80)), "80");
        assert_eq!(display_value(&Value::from("nginx")), "nginx");
        assert_eq!(display_value(&Value::from(true)), "true");
        let seq: Value = serde_yaml::from_str("[a, b]").unwrap();
        assert_eq!(display_value(&seq), r#"["a","b"]"#);
    }
}
