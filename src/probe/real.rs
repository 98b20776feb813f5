//! Probe implementation backed by the real filesystem and registry.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::probe::PathProbe;

#[derive(Debug, Default)]
pub struct RealPathProbe;

impl RealPathProbe {
    pub fn new() -> Self {
        Self
    }
}

impl PathProbe for RealPathProbe {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String, ProbeError> {
        fs::read_to_string(path).map_err(|source| ProbeError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn first_wildcard_match(&self, pattern: &str) -> Result<Option<PathBuf>, ProbeError> {
        let paths = glob::glob(pattern).map_err(|e| ProbeError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        let mut first_file = None;
        for entry in paths {
            // Unreadable entries are skipped rather than failing the probe.
            let Ok(path) = entry else { continue };
            if path.is_dir() {
                return Ok(Some(path));
            }
            if first_file.is_none() {
                first_file = Some(path);
            }
        }
        Ok(first_file)
    }

    #[cfg(windows)]
    fn read_registry_value(
        &self,
        key: &str,
        value_name: &str,
    ) -> Result<Option<String>, ProbeError> {
        use winreg::RegKey;

        let (hive, subkey) = split_registry_key(key)?;
        let root = RegKey::predef(hive);
        let opened = match root.open_subkey(subkey) {
            Ok(k) => k,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ProbeError::Registry {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        match opened.get_value::<String, _>(value_name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProbeError::Registry {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    #[cfg(not(windows))]
    fn read_registry_value(
        &self,
        _key: &str,
        _value_name: &str,
    ) -> Result<Option<String>, ProbeError> {
        Ok(None)
    }
}

/// Splits `HIVE\sub\key` into a registry hive handle and subkey path.
/// Accepts the common short aliases and either separator style.
#[cfg(windows)]
fn split_registry_key(key: &str) -> Result<(winreg::HKEY, &str), ProbeError> {
    use winreg::enums::{HKEY_CLASSES_ROOT, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

    let (hive, subkey) = key
        .split_once(&['\\', '/'][..])
        .unwrap_or((key, ""));
    let handle = match hive.to_ascii_uppercase().as_str() {
        "HKEY_LOCAL_MACHINE" | "HKLM" => HKEY_LOCAL_MACHINE,
        "HKEY_CURRENT_USER" | "HKCU" => HKEY_CURRENT_USER,
        "HKEY_CLASSES_ROOT" => HKEY_CLASSES_ROOT,
        _ => return Err(ProbeError::UnknownRegistryHive(hive.to_string())),
    };
    Ok((handle, subkey))
}
