//! Vault storage seam. Every path is relative to a single root and is
//! rejected if it would resolve outside of it.

use crate::error::{CanvasError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultEntry {
    pub path: String,
    pub name: String,
    pub extension: Option<String>,
}

impl VaultEntry {
    fn from_path(path: String) -> Self {
        let as_path = Path::new(&path);
        let name = as_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = as_path.extension().map(|e| e.to_string_lossy().into_owned());
        Self {
            path,
            name,
            extension,
        }
    }
}

pub trait Vault {
    fn read_file(&self, path: &str) -> Result<String>;
    /// Creates missing parent folders.
    fn write_file(&self, path: &str, contents: &str) -> Result<()>;
    /// Files directly inside `folder`, sorted by path.
    fn list_files(&self, folder: &str) -> Result<Vec<VaultEntry>>;
    fn file_exists(&self, path: &str) -> Result<bool>;
    fn folder_exists(&self, path: &str) -> Result<bool>;
    fn create_folder(&self, path: &str) -> Result<()>;
}

/// Lexically normalizes a vault-relative path to `a/b/c` form.
pub fn normalize_relative(path: &str) -> Result<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(&path.replace('\\', "/")).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(CanvasError::PathTraversal(PathBuf::from(path)));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(CanvasError::PathTraversal(PathBuf::from(path)));
            }
        }
    }
    Ok(parts.join("/"))
}

#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = normalize_relative(path)?;
        if relative.is_empty() {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(relative))
    }
}

impl Vault for FsVault {
    fn read_file(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(CanvasError::NotFound(path.to_string()));
        }
        Ok(std::fs::read_to_string(full)?)
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, contents)?;
        Ok(())
    }

    fn list_files(&self, folder: &str) -> Result<Vec<VaultEntry>> {
        let relative = normalize_relative(folder)?;
        let full = self.resolve(folder)?;
        if !full.is_dir() {
            return Err(CanvasError::NotFound(folder.to_string()));
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(full)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = if relative.is_empty() {
                name
            } else {
                format!("{relative}/{name}")
            };
            entries.push(VaultEntry::from_path(path));
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn file_exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path)?.is_file())
    }

    fn folder_exists(&self, path: &str) -> Result<bool> {
        Ok(self.resolve(path)?.is_dir())
    }

    fn create_folder(&self, path: &str) -> Result<()> {
        std::fs::create_dir_all(self.resolve(path)?)?;
        Ok(())
    }
}

/// In-memory vault for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryVault {
    files: Mutex<BTreeMap<String, String>>,
    folders: Mutex<BTreeSet<String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn files(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn folders(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.folders.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Vault for MemoryVault {
    fn read_file(&self, path: &str) -> Result<String> {
        let key = normalize_relative(path)?;
        self.files()
            .get(&key)
            .cloned()
            .ok_or_else(|| CanvasError::NotFound(path.to_string()))
    }

    fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        let key = normalize_relative(path)?;
        if let Some((parent, _)) = key.rsplit_once('/') {
            self.create_folder(parent)?;
        }
        self.files().insert(key, contents.to_string());
        Ok(())
    }

    fn list_files(&self, folder: &str) -> Result<Vec<VaultEntry>> {
        let folder = normalize_relative(folder)?;
        if !folder.is_empty() && !self.folder_exists(&folder)? {
            return Err(CanvasError::NotFound(folder));
        }
        let prefix = if folder.is_empty() { String::new() } else { format!("{folder}/") };
        Ok(self
            .files()
            .keys()
            .filter(|path| {
                path.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
            })
            .map(|path| VaultEntry::from_path(path.clone()))
            .collect())
    }

    fn file_exists(&self, path: &str) -> Result<bool> {
        let key = normalize_relative(path)?;
        Ok(self.files().contains_key(&key))
    }

    fn folder_exists(&self, path: &str) -> Result<bool> {
        let key = normalize_relative(path)?;
        Ok(key.is_empty() || self.folders().contains(&key))
    }

    fn create_folder(&self, path: &str) -> Result<()> {
        let key = normalize_relative(path)?;
        let mut folders = self.folders();
        let mut prefix = String::new();
        for part in key.split('/').filter(|p| !p.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(part);
            folders.insert(prefix.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_relative_paths() {
        assert_eq!(normalize_relative("a/./b/../c.md").unwrap(), "a/c.md");
        assert_eq!(normalize_relative("a\\b.md").unwrap(), "a/b.md");
        assert_eq!(normalize_relative("").unwrap(), "");
    }

    #[test]
    fn rejects_escapes() {
        assert!(matches!(normalize_relative("../secret"), Err(CanvasError::PathTraversal(_))));
        assert!(matches!(normalize_relative("a/../../b"), Err(CanvasError::PathTraversal(_))));
        assert!(matches!(normalize_relative("/etc/passwd"), Err(CanvasError::PathTraversal(_))));
    }

    #[test]
    fn fs_vault_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        vault.write_file("Boards/nested/plan.canvas", "{}").unwrap();
        assert!(vault.folder_exists("Boards/nested").unwrap());
        assert!(vault.file_exists("Boards/nested/plan.canvas").unwrap());
        assert_eq!(vault.read_file("Boards/nested/plan.canvas").unwrap(), "{}");

        vault.write_file("Boards/a.md", "x").unwrap();
        let listed = vault.list_files("Boards").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, "Boards/a.md");
        assert_eq!(listed[0].name, "a.md");
        assert_eq!(listed[0].extension.as_deref(), Some("md"));

        assert!(matches!(vault.read_file("missing.md"), Err(CanvasError::NotFound(_))));
        assert!(matches!(
            vault.write_file("../outside.md", "x"),
            Err(CanvasError::PathTraversal(_))
        ));
    }

    #[test]
    fn memory_vault_lists_direct_children() {
        let vault = MemoryVault::new();
        vault.write_file("Tasks/one.md", "1").unwrap();
        vault.write_file("Tasks/sub/two.md", "2").unwrap();
        vault.write_file("root.md", "r").unwrap();

        let tasks = vault.list_files("Tasks").unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "one.md");
        assert!(vault.folder_exists("Tasks/sub").unwrap());
        assert_eq!(vault.list_files("").unwrap().len(), 1);
        assert!(vault.list_files("Nope").is_err());

        vault.create_folder("Empty/inner").unwrap();
        assert!(vault.folder_exists("Empty").unwrap());
        assert!(vault.list_files("Empty/inner").unwrap().is_empty());
        assert_eq!(vault.len(), 3);
    }
}
