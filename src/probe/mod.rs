//! Filesystem and registry probes behind a testable trait.

mod mock;
mod real;

pub use mock::MockPathProbe;
pub use real::RealPathProbe;

use std::path::{Path, PathBuf};

use crate::error::ProbeError;

/// Read-only view of the host used during resolution.
///
/// Every filesystem or registry question the resolver asks goes through this
/// trait, so descriptor walks can run against an in-memory double in tests.
pub trait PathProbe {
    fn dir_exists(&self, path: &Path) -> bool;

    fn file_exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String, ProbeError>;

    /// Resolves a glob pattern to its first match, preferring directories
    /// over plain files. `Ok(None)` when nothing matches.
    fn first_wildcard_match(&self, pattern: &str) -> Result<Option<PathBuf>, ProbeError>;

    /// Reads a string value from the Windows registry. `Ok(None)` when the
    /// key or value is absent, and always on non-Windows hosts.
    fn read_registry_value(
        &self,
        key: &str,
        value_name: &str,
    ) -> Result<Option<String>, ProbeError>;
}
