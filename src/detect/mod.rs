//! Toolchain resolution: the descriptor walk and its resolved profile.

mod path_env;
mod profile;
mod resolver;

pub use path_env::ScopedPathOverride;
pub use profile::{CompilerProfile, PathList};
pub use resolver::{Confidence, Resolution, Resolver, ResolverOptions};
