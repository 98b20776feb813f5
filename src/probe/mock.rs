//! In-memory probe for tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::ProbeError;
use crate::probe::PathProbe;

#[derive(Debug, Clone, PartialEq, Eq)]
enum MockKind {
    File,
    Directory,
}

#[derive(Debug, Clone)]
struct MockEntry {
    kind: MockKind,
    content: String,
}

/// Scriptable [`PathProbe`] backed by in-memory maps.
///
/// Entries are kept sorted so wildcard matches are deterministic. Paths are
/// matched exactly as given; tests should stick to absolute paths.
#[derive(Debug, Default)]
pub struct MockPathProbe {
    entries: RwLock<BTreeMap<PathBuf, MockEntry>>,
    registry: RwLock<BTreeMap<(String, String), String>>,
}

impl MockPathProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.write().unwrap();
        ensure_parents(&mut entries, &path);
        entries.insert(
            path,
            MockEntry {
                kind: MockKind::Directory,
                content: String::new(),
            },
        );
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.add_file_with_content(path, "");
    }

    pub fn add_file_with_content(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.write().unwrap();
        ensure_parents(&mut entries, &path);
        entries.insert(
            path,
            MockEntry {
                kind: MockKind::File,
                content: content.to_string(),
            },
        );
    }

    pub fn add_registry_value(&self, key: &str, value_name: &str, value: &str) {
        self.registry
            .write()
            .unwrap()
            .insert((key.to_string(), value_name.to_string()), value.to_string());
    }

    fn kind_of(&self, path: &Path) -> Option<MockKind> {
        self.entries
            .read()
            .unwrap()
            .get(path)
            .map(|e| e.kind.clone())
    }
}

fn ensure_parents(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
    let mut current = path.parent();
    while let Some(parent) = current {
        if parent.as_os_str().is_empty() {
            break;
        }
        entries.entry(parent.to_path_buf()).or_insert(MockEntry {
            kind: MockKind::Directory,
            content: String::new(),
        });
        current = parent.parent();
    }
}

impl PathProbe for MockPathProbe {
    fn dir_exists(&self, path: &Path) -> bool {
        self.kind_of(path) == Some(MockKind::Directory)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.kind_of(path) == Some(MockKind::File)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, ProbeError> {
        let entries = self.entries.read().unwrap();
        match entries.get(path) {
            Some(entry) if entry.kind == MockKind::File => Ok(entry.content.clone()),
            _ => Err(ProbeError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such mock entry"),
            }),
        }
    }

    fn first_wildcard_match(&self, pattern: &str) -> Result<Option<PathBuf>, ProbeError> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| ProbeError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        let entries = self.entries.read().unwrap();
        let mut first_file = None;
        for (path, entry) in entries.iter() {
            if !compiled.matches_path(path) {
                continue;
            }
            if entry.kind == MockKind::Directory {
                return Ok(Some(path.clone()));
            }
            if first_file.is_none() {
                first_file = Some(path.clone());
            }
        }
        Ok(first_file)
    }

    fn read_registry_value(
        &self,
        key: &str,
        value_name: &str,
    ) -> Result<Option<String>, ProbeError> {
        let registry = self.registry.read().unwrap();
        Ok(registry
            .get(&(key.to_string(), value_name.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_and_dirs_are_distinct() {
        let probe = MockPathProbe::new();
        probe.add_dir("/opt/gcc");
        probe.add_file("/opt/gcc/bin/gcc");

        assert!(probe.dir_exists(Path::new("/opt/gcc")));
        assert!(!probe.file_exists(Path::new("/opt/gcc")));
        assert!(probe.file_exists(Path::new("/opt/gcc/bin/gcc")));
        assert!(!probe.dir_exists(Path::new("/opt/gcc/bin/gcc")));
    }

    #[test]
    fn adding_a_file_creates_parent_dirs() {
        let probe = MockPathProbe::new();
        probe.add_file("/a/b/c/tool");
        assert!(probe.dir_exists(Path::new("/a/b/c")));
        assert!(probe.dir_exists(Path::new("/a")));
    }

    #[test]
    fn reads_file_content() {
        let probe = MockPathProbe::new();
        probe.add_file_with_content("/etc/conf", "alpha\nbeta\n");
        assert_eq!(
            probe.read_to_string(Path::new("/etc/conf")).unwrap(),
            "alpha\nbeta\n"
        );
        assert!(probe.read_to_string(Path::new("/etc/other")).is_err());
    }

    #[test]
    fn wildcard_prefers_directories_in_sorted_order() {
        let probe = MockPathProbe::new();
        probe.add_file("/opt/llvm-1");
        probe.add_dir("/opt/llvm-3");
        probe.add_dir("/opt/llvm-2");

        let found = probe.first_wildcard_match("/opt/llvm-*").unwrap().unwrap();
        assert_eq!(found, PathBuf::from("/opt/llvm-2"));
    }

    #[test]
    fn registry_values_are_scriptable() {
        let probe = MockPathProbe::new();
        probe.add_registry_value("HKEY_LOCAL_MACHINE\\SOFTWARE\\Acme", "InstallDir", "/acme");

        let value = probe
            .read_registry_value("HKEY_LOCAL_MACHINE\\SOFTWARE\\Acme", "InstallDir")
            .unwrap();
        assert_eq!(value.as_deref(), Some("/acme"));
        assert_eq!(
            probe
                .read_registry_value("HKEY_LOCAL_MACHINE\\SOFTWARE\\Acme", "Other")
                .unwrap(),
            None
        );
    }
}
