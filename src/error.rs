use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or parsing a toolchain descriptor.
///
/// Parsing is atomic: any of these means the whole descriptor is rejected
/// and no partial tree is handed to the resolver.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read descriptor file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("expected <toolchain> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<Search> needs one of envVar, macro, path, file or registry")]
    MissingSearchStrategy,

    #[error("unknown path type '{0}' (expected master, extra, include, resource or lib)")]
    UnknownPathType(String),

    #[error("unknown program key '{0}' (expected c, cxx, linker or resource)")]
    UnknownProgramKey(String),

    #[error("invalid numeric attribute '{attribute}' on <{element}>: '{value}'")]
    InvalidNumber {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("<else> without a preceding <if>")]
    DanglingElse,

    #[error("<Add> carries neither an option attribute nor path segments")]
    EmptyAdd,
}

/// Errors raised by filesystem and registry probes.
///
/// The resolver treats all of these as "not found": a probe failure degrades
/// the directive that triggered it to a no-op instead of aborting resolution.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid wildcard pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unknown registry hive '{0}'")]
    UnknownRegistryHive(String),

    #[error("registry access failed for {key}: {reason}")]
    Registry { key: String, reason: String },
}

/// Errors raised by macro expanders.
///
/// The environment-backed expander never fails (unknown macros expand to the
/// empty string), but stricter implementations report unresolved names and the
/// resolver substitutes an empty value in their place.
#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("unknown macro '{0}'")]
    UnknownMacro(String),
}
