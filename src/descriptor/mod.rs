//! Toolchain descriptor model and XML parser.

mod node;
mod parser;

pub use node::{
    Descriptor, DescriptorNode, OptionKind, PathSegment, Platform, Predicate, ProgramKind,
    Programs, SearchMode, SearchSpec, SearchStrategy,
};
