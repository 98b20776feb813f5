//! Shared helpers for integration tests.

use std::env;
use std::ffi::{OsStr, OsString};

/// Scoped environment variable override, restored on drop.
pub struct EnvGuard {
    key: String,
    old_value: Option<OsString>,
}

impl EnvGuard {
    pub fn set(key: &str, value: impl AsRef<OsStr>) -> Self {
        let old_value = env::var_os(key);
        env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }

    #[allow(dead_code)]
    pub fn unset(key: &str) -> Self {
        let old_value = env::var_os(key);
        env::remove_var(key);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old_value.take() {
            Some(value) => env::set_var(&self.key, value),
            None => env::remove_var(&self.key),
        }
    }
}
