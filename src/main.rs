use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, error, info, Level};

use toolscout::cli::{CliArgs, OutputFormatArg};
use toolscout::descriptor::Descriptor;
use toolscout::detect::{CompilerProfile, Confidence, PathList, Resolution, Resolver};
use toolscout::expand::EnvMacroExpander;
use toolscout::probe::RealPathProbe;
use toolscout::util::logging::{self, LoggingConfig};
use toolscout::{ToolscoutConfig, NAME, VERSION};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = handle_resolve(&args);
    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        logging::parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("TOOLSCOUT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        logging::parse_level(&level_str)
    };
    logging::init_logging(LoggingConfig::with_level(level));
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    toolchain: &'a str,
    name: &'a str,
    confidence: Confidence,
    profile: &'a CompilerProfile,
}

/// Runs one resolution and prints the result. Exit code 0 means the
/// toolchain was confirmed on disk, 2 means the profile is a guess, 1 is an
/// operational error.
fn handle_resolve(args: &CliArgs) -> i32 {
    let config = ToolscoutConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }

    let descriptor_path = match (&args.descriptor, &args.id) {
        (Some(path), _) => path.clone(),
        (None, Some(id)) => config.descriptor_dir.join(format!("{}.xml", id)),
        (None, None) => {
            error!("A descriptor path or --id is required");
            return 1;
        }
    };
    debug!("Descriptor path: {}", descriptor_path.display());

    let descriptor = match Descriptor::load(&descriptor_path) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            error!(
                "Failed to load descriptor {}: {}",
                descriptor_path.display(),
                e
            );
            eprintln!("Error: could not load '{}'", descriptor_path.display());
            eprintln!("Check the path, or set TOOLSCOUT_DESCRIPTOR_DIR when using --id.");
            return 1;
        }
    };

    info!("Resolving toolchain: {} ({})", descriptor.name, descriptor.id);

    let probe = RealPathProbe::new();
    let expander = EnvMacroExpander::new();
    let resolver = Resolver::new(&probe, &expander);
    let resolution = resolver.resolve(&descriptor, args.prior_master.as_deref());

    let rendered = match args.format {
        OutputFormatArg::Text => render_text(&descriptor, &resolution),
        OutputFormatArg::Json => {
            let report = ResolveReport {
                toolchain: &descriptor.id,
                name: &descriptor.name,
                confidence: resolution.confidence,
                profile: &resolution.profile,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize resolution: {}", e);
                    return 1;
                }
            }
        }
    };

    if let Some(path) = &args.output {
        if let Err(e) = write_output(path, &rendered) {
            error!("{:#}", e);
            return 1;
        }
        if !args.quiet {
            println!("Output written to: {}", path.display());
        }
    } else {
        println!("{}", rendered);
    }

    match resolution.confidence {
        Confidence::Detected => 0,
        Confidence::Guessed => 2,
    }
}

fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write output to {}", path.display()))
}

fn render_text(descriptor: &Descriptor, resolution: &Resolution) -> String {
    let profile = &resolution.profile;
    let mut out = String::new();
    out.push_str(&format!("Toolchain: {} ({})\n", descriptor.name, descriptor.id));
    out.push_str(&format!("Confidence: {}\n", resolution.confidence));
    match &profile.master_path {
        Some(path) => out.push_str(&format!("Master path: {}\n", path.display())),
        None => out.push_str("Master path: (none)\n"),
    }
    push_path_section(&mut out, "Extra paths", &profile.extra_paths);
    push_path_section(&mut out, "Include dirs", &profile.include_dirs);
    push_path_section(&mut out, "Resource include dirs", &profile.resource_include_dirs);
    push_path_section(&mut out, "Lib dirs", &profile.lib_dirs);
    push_value_section(&mut out, "Compiler flags", &profile.compiler_flags);
    push_value_section(&mut out, "Linker flags", &profile.linker_flags);
    push_value_section(&mut out, "Link libs", &profile.link_libs);
    out
}

fn push_path_section(out: &mut String, label: &str, paths: &PathList) {
    if paths.is_empty() {
        return;
    }
    out.push_str(&format!("{}:\n", label));
    for path in paths.iter() {
        out.push_str(&format!("  {}\n", path.display()));
    }
}

fn push_value_section(out: &mut String, label: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    out.push_str(&format!("{}: {}\n", label, values.join(" ")));
}
