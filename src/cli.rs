//! Command-line interface definitions.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Resolve compiler toolchain locations from declarative XML descriptors
#[derive(Parser, Debug)]
#[command(
    name = "toolscout",
    about = "Resolve compiler toolchain locations from declarative XML descriptors",
    version,
    long_about = "Toolscout walks a toolchain descriptor against the local machine and \
reports where the toolchain lives: installation root, extra executable paths, include \
and library directories, and the flags the descriptor adds along the way.\n\n\
Examples:\n\
  toolscout descriptors/gcc.xml\n\
  toolscout --id clang --format json\n\
  toolscout --id gcc --prior-master /opt/gcc-13 -v"
)]
pub struct CliArgs {
    /// Path to a toolchain descriptor XML file
    #[arg(
        value_name = "DESCRIPTOR",
        conflicts_with = "id",
        required_unless_present = "id"
    )]
    pub descriptor: Option<PathBuf>,

    /// Toolchain id, resolved to <id>.xml in the descriptor directory
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Previously detected installation root; master searches are skipped
    /// and this directory is checked instead
    #[arg(long, value_name = "PATH")]
    pub prior_master: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: OutputFormatArg,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet mode - only errors are logged
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_descriptor_path() {
        let args = CliArgs::parse_from(["toolscout", "descriptors/gcc.xml"]);
        assert_eq!(args.descriptor, Some(PathBuf::from("descriptors/gcc.xml")));
        assert_eq!(args.id, None);
        assert_eq!(args.format, OutputFormatArg::Text);
        assert!(!args.verbose);
    }

    #[test]
    fn parses_id_with_options() {
        let args = CliArgs::parse_from([
            "toolscout",
            "--id",
            "clang",
            "--format",
            "json",
            "--prior-master",
            "/opt/llvm",
            "-v",
        ]);
        assert_eq!(args.id.as_deref(), Some("clang"));
        assert_eq!(args.format, OutputFormatArg::Json);
        assert_eq!(args.prior_master, Some(PathBuf::from("/opt/llvm")));
        assert!(args.verbose);
    }

    #[test]
    fn descriptor_or_id_is_required() {
        assert!(CliArgs::try_parse_from(["toolscout"]).is_err());
    }

    #[test]
    fn descriptor_conflicts_with_id() {
        let result =
            CliArgs::try_parse_from(["toolscout", "descriptors/gcc.xml", "--id", "gcc"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(CliArgs::try_parse_from(["toolscout", "--id", "gcc", "-q", "-v"]).is_err());
    }
}
