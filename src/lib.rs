//! toolscout - compiler toolchain detection from declarative XML descriptors
//!
//! This library locates compiler toolchains by interpreting small declarative
//! descriptors instead of hard-coding per-compiler lookup logic. A descriptor
//! names the toolchain's programs and describes where to look for them:
//! environment variables, literal paths with wildcards, text files to scan,
//! registry keys, platform conditionals and fallbacks.
//!
//! # Core Concepts
//!
//! - **Descriptor**: the parsed XML document, an ordered tree of search
//!   directives grouped into typed path scopes
//! - **Resolver**: walks the tree depth-first against a [`probe::PathProbe`]
//!   and a [`expand::MacroExpander`], collecting results into a profile
//! - **CompilerProfile**: the resolved installation root, path collections
//!   and flags, classified as detected (confirmed on disk) or guessed
//!
//! # Example Usage
//!
//! ```
//! use toolscout::descriptor::{Descriptor, Platform};
//! use toolscout::detect::{Resolver, ResolverOptions};
//! use toolscout::expand::StaticMacroExpander;
//! use toolscout::probe::MockPathProbe;
//!
//! # fn main() -> Result<(), toolscout::ParseError> {
//! let descriptor = Descriptor::parse(
//!     r#"<toolchain id="gcc" name="GNU GCC">
//!         <programs c="gcc" cxx="g++"/>
//!         <Path type="master">
//!             <Search path="/opt/gcc" for="c"/>
//!         </Path>
//!     </toolchain>"#,
//! )?;
//!
//! let probe = MockPathProbe::new();
//! probe.add_file("/opt/gcc/bin/gcc");
//! let expander = StaticMacroExpander::new();
//! let options = ResolverOptions {
//!     platform: Platform::Unix,
//!     case_sensitive: true,
//!     exe_suffix: String::new(),
//! };
//!
//! let resolver = Resolver::with_options(&probe, &expander, options);
//! let resolution = resolver.resolve(&descriptor, None);
//! assert_eq!(
//!     resolution.profile.master_path.as_deref(),
//!     Some(std::path::Path::new("/opt/gcc"))
//! );
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod detect;
pub mod error;
pub mod expand;
pub mod probe;
pub mod util;

// Re-export key types for convenient access
pub use config::{ConfigError, ToolscoutConfig};
pub use descriptor::{Descriptor, DescriptorNode, Platform, ProgramKind, Programs, SearchMode};
pub use detect::{CompilerProfile, Confidence, PathList, Resolution, Resolver, ResolverOptions};
pub use error::{ExpansionError, ParseError, ProbeError};
pub use expand::{EnvMacroExpander, MacroExpander, StaticMacroExpander};
pub use probe::{MockPathProbe, PathProbe, RealPathProbe};

/// Version of the toolscout library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the toolscout library
pub const NAME: &str = env!("CARGO_PKG_NAME");
