use std::env;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_DESCRIPTOR_DIR: &str = "descriptors";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors that can occur during configuration handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Runtime configuration, loaded from `TOOLSCOUT_*` environment variables
/// with sensible defaults.
///
/// - `TOOLSCOUT_DESCRIPTOR_DIR`: directory searched for `<id>.xml` descriptor
///   files - default: "descriptors"
/// - `TOOLSCOUT_LOG_LEVEL`: logging level - default: "info"
#[derive(Debug, Clone)]
pub struct ToolscoutConfig {
    pub descriptor_dir: PathBuf,
    pub log_level: String,
}

impl Default for ToolscoutConfig {
    fn default() -> Self {
        Self {
            descriptor_dir: env::var("TOOLSCOUT_DESCRIPTOR_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DESCRIPTOR_DIR)),
            log_level: env::var("TOOLSCOUT_LOG_LEVEL")
                .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl ToolscoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.descriptor_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Descriptor directory must not be empty".to_string(),
            ));
        }
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                other
            ))),
        }
    }
}

impl fmt::Display for ToolscoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Toolscout Configuration:")?;
        writeln!(f, "  Descriptor Dir: {}", self.descriptor_dir.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(value) => env::set_var(&self.key, value),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn default_config_when_env_unset() {
        let _dir = EnvGuard::unset("TOOLSCOUT_DESCRIPTOR_DIR");
        let _level = EnvGuard::unset("TOOLSCOUT_LOG_LEVEL");

        let config = ToolscoutConfig::default();
        assert_eq!(config.descriptor_dir, PathBuf::from("descriptors"));
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn env_overrides_are_picked_up() {
        let _dir = EnvGuard::set("TOOLSCOUT_DESCRIPTOR_DIR", "/etc/toolscout");
        let _level = EnvGuard::set("TOOLSCOUT_LOG_LEVEL", "debug");

        let config = ToolscoutConfig::default();
        assert_eq!(config.descriptor_dir, PathBuf::from("/etc/toolscout"));
        assert_eq!(config.log_level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn invalid_log_level_fails_validation() {
        let _level = EnvGuard::set("TOOLSCOUT_LOG_LEVEL", "loud");

        let config = ToolscoutConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed(_)));
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    #[serial]
    fn display_lists_fields() {
        let _dir = EnvGuard::unset("TOOLSCOUT_DESCRIPTOR_DIR");
        let _level = EnvGuard::unset("TOOLSCOUT_LOG_LEVEL");

        let text = ToolscoutConfig::default().to_string();
        assert!(text.contains("Descriptor Dir: descriptors"));
        assert!(text.contains("Log Level: info"));
    }
}
