//! In-memory model of a toolchain descriptor.
//!
//! A descriptor is a small declarative program: an ordered tree of directives
//! that the resolver walks depth-first. The node set is closed, every
//! construct the XML vocabulary can express is one of the variants below.

use std::path::Path;

use crate::error::ParseError;

/// Which profile collection a search scope feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// The toolchain installation root. At most one, first hit wins.
    Master,
    /// Additional executable directories.
    Extra,
    /// C/C++ include directories.
    Include,
    /// Resource compiler include directories.
    Resource,
    /// Linker library directories.
    Lib,
}

/// Host platform, used both for conditional tests and resolver defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
    MacOs,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }
}

/// The programs a toolchain descriptor can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    C,
    Cxx,
    Linker,
    ResourceCompiler,
}

/// Program names declared by a descriptor, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Programs {
    pub c: Option<String>,
    pub cxx: Option<String>,
    pub linker: Option<String>,
    pub resource_compiler: Option<String>,
}

impl Programs {
    pub fn get(&self, kind: ProgramKind) -> Option<&str> {
        match kind {
            ProgramKind::C => self.c.as_deref(),
            ProgramKind::Cxx => self.cxx.as_deref(),
            ProgramKind::Linker => self.linker.as_deref(),
            ProgramKind::ResourceCompiler => self.resource_compiler.as_deref(),
        }
    }
}

/// Condition tested by a `Conditional` node.
///
/// An unrecognized test never fails the parse; it evaluates to false at
/// resolution time so the else branch still runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// True when the host platform matches. `Unix` matches any non-Windows
    /// host, `MacOs` only matches macOS.
    Platform(Platform),
    /// True when the environment variable is set to a non-empty value.
    EnvDefined(String),
    /// True when the named macro expands to a non-empty string.
    MacroNonEmpty(String),
    /// Always false.
    Unrecognized(String),
}

/// How a `Search` node produces candidate paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Split an environment variable on the platform path-list separator.
    EnvVar { var: String },
    /// Macro-expand a value, then split like `EnvVar`.
    Macro { value: String },
    /// A single literal path, macro-expanded; may contain glob wildcards.
    LiteralPath { path: String },
    /// Scan a text file line by line, registering every capture of `group`.
    FileScan {
        file: String,
        pattern: String,
        group: usize,
    },
    /// Read a string value from the Windows registry.
    Registry { key: String, value_name: String },
}

/// A single search directive with its shared parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub strategy: SearchStrategy,
    /// Program whose executable a candidate directory must contain. With no
    /// target, plain directory existence is enough.
    pub target: Option<ProgramKind>,
    /// Trailing path components stripped from a hit before registration.
    pub strip_components: usize,
}

/// Option kinds an `AddOption` node can append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    CompilerFlag,
    LinkerFlag,
    LinkLib,
}

/// One segment of a composed `AddPath` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Literal(String),
    /// The resolved master path; empty while the master is unknown.
    Master,
    /// The platform directory separator.
    Separator,
    /// The value of an environment variable; empty when unset.
    Env(String),
}

/// A directive in the descriptor tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorNode {
    Conditional {
        predicate: Predicate,
        then_branch: Vec<DescriptorNode>,
        else_branch: Vec<DescriptorNode>,
    },
    /// Sets the active search mode for its body.
    PathScope {
        mode: SearchMode,
        body: Vec<DescriptorNode>,
    },
    Search(SearchSpec),
    AddOption {
        kind: OptionKind,
        value: String,
    },
    /// Composes a path from segments and registers it under the active mode.
    AddPath {
        segments: Vec<PathSegment>,
    },
    /// Registers a literal value when the active mode's collection is still
    /// empty once the walk reaches this node. The mode is the enclosing
    /// scope's, captured at parse time.
    Fallback {
        mode: Option<SearchMode>,
        value: String,
    },
}

/// A parsed toolchain descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub id: String,
    pub name: String,
    pub programs: Programs,
    pub nodes: Vec<DescriptorNode>,
}

impl Descriptor {
    /// Identifier of the "no compiler" sentinel descriptor.
    pub const NO_COMPILER_ID: &'static str = "none";

    /// True for the sentinel descriptor that deliberately configures nothing.
    pub fn is_no_compiler(&self) -> bool {
        self.id == Self::NO_COMPILER_ID
    }

    /// Reads and parses a descriptor file.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programs_lookup_by_kind() {
        let programs = Programs {
            c: Some("gcc".to_string()),
            cxx: Some("g++".to_string()),
            linker: None,
            resource_compiler: None,
        };

        assert_eq!(programs.get(ProgramKind::C), Some("gcc"));
        assert_eq!(programs.get(ProgramKind::Cxx), Some("g++"));
        assert_eq!(programs.get(ProgramKind::Linker), None);
        assert_eq!(programs.get(ProgramKind::ResourceCompiler), None);
    }

    #[test]
    fn no_compiler_sentinel() {
        let descriptor = Descriptor {
            id: "none".to_string(),
            name: "No compiler".to_string(),
            programs: Programs::default(),
            nodes: Vec::new(),
        };
        assert!(descriptor.is_no_compiler());

        let descriptor = Descriptor {
            id: "gcc".to_string(),
            name: "GNU GCC".to_string(),
            programs: Programs::default(),
            nodes: Vec::new(),
        };
        assert!(!descriptor.is_no_compiler());
    }
}
