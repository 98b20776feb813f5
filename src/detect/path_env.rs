//! Scoped PATH mutation for re-detection runs.

use std::env;
use std::ffi::OsString;
use std::path::Path;

use tracing::{debug, warn};

const PATH_VAR: &str = "PATH";

/// Prepends a directory to the process PATH and restores the previous value,
/// byte for byte, on drop.
///
/// Re-detection runs with a previously known master path prepended so the
/// walk sees that installation first. The mutation is process-wide, callers
/// that resolve concurrently must serialize around it.
#[derive(Debug)]
pub struct ScopedPathOverride {
    original: Option<OsString>,
}

impl ScopedPathOverride {
    pub fn prepend(dir: &Path) -> Self {
        let original = env::var_os(PATH_VAR);
        let mut parts = vec![dir.to_path_buf()];
        if let Some(current) = &original {
            parts.extend(env::split_paths(current));
        }
        match env::join_paths(parts) {
            Ok(joined) => {
                debug!(dir = %dir.display(), "prepending prior master path to PATH");
                env::set_var(PATH_VAR, joined);
            }
            Err(error) => {
                // A dir containing the list separator cannot be joined in;
                // leave PATH untouched rather than corrupt it.
                warn!(%error, dir = %dir.display(), "cannot prepend directory to PATH");
            }
        }
        Self { original }
    }
}

impl Drop for ScopedPathOverride {
    fn drop(&mut self) {
        match self.original.take() {
            Some(value) => env::set_var(PATH_VAR, value),
            None => env::remove_var(PATH_VAR),
        }
    }
}
