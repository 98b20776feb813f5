//! The descriptor walk that turns a parsed toolchain descriptor into a
//! [`CompilerProfile`].
//!
//! Resolution is a depth-first pre-order walk over the directive tree. The
//! active search mode is carried as a recursion parameter, so leaving a
//! `Path` scope restores the previous mode without any bookkeeping.
//! Resolution never fails: probe and expansion errors degrade the directive
//! that hit them to a no-op and the walk keeps going.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::descriptor::{
    Descriptor, DescriptorNode, PathSegment, Platform, Predicate, ProgramKind, Programs,
    SearchMode, SearchSpec, SearchStrategy,
};
use crate::detect::path_env::ScopedPathOverride;
use crate::detect::profile::CompilerProfile;
use crate::expand::MacroExpander;
use crate::probe::PathProbe;

/// Characters that make a literal search path a glob pattern.
const WILDCARD_CHARS: &[char] = &['*', '?', '['];

/// How much trust to place in a resolved profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The toolchain's C program was found where the profile says it is,
    /// or the descriptor is the "no compiler" sentinel.
    Detected,
    /// The profile holds plausible defaults that were not confirmed on disk.
    Guessed,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Detected => write!(f, "detected"),
            Confidence::Guessed => write!(f, "guessed"),
        }
    }
}

/// Platform-dependent knobs of a resolution run.
///
/// Defaults describe the host; tests override them to walk descriptors for
/// another platform deterministically.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub platform: Platform,
    /// Path comparison policy for duplicate suppression and `bin` trimming.
    pub case_sensitive: bool,
    /// Suffix appended to program names when probing for executables.
    pub exe_suffix: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            platform: Platform::host(),
            case_sensitive: !cfg!(windows),
            exe_suffix: if cfg!(windows) {
                ".exe".to_string()
            } else {
                String::new()
            },
        }
    }
}

impl ResolverOptions {
    fn dir_separator(&self) -> char {
        match self.platform {
            Platform::Windows => '\\',
            _ => '/',
        }
    }
}

/// Outcome of one resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub profile: CompilerProfile,
    pub confidence: Confidence,
}

/// Walks descriptors against a [`PathProbe`] and a [`MacroExpander`].
pub struct Resolver<'a> {
    probe: &'a dyn PathProbe,
    expander: &'a dyn MacroExpander,
    options: ResolverOptions,
}

/// Signal that a search just resolved the master path. It skips the
/// remaining siblings up to the enclosing scope boundary: conditional
/// frames propagate it, the scope absorbs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    MasterResolved,
}

impl<'a> Resolver<'a> {
    pub fn new(probe: &'a dyn PathProbe, expander: &'a dyn MacroExpander) -> Self {
        Self::with_options(probe, expander, ResolverOptions::default())
    }

    pub fn with_options(
        probe: &'a dyn PathProbe,
        expander: &'a dyn MacroExpander,
        options: ResolverOptions,
    ) -> Self {
        Self {
            probe,
            expander,
            options,
        }
    }

    /// Resolves a descriptor into a profile and a confidence classification.
    ///
    /// With a non-empty `prior_master` the profile is seeded with it, which
    /// makes every master search scope skip, and the directory is prepended
    /// to PATH for the duration of the walk (restored on return).
    pub fn resolve(&self, descriptor: &Descriptor, prior_master: Option<&Path>) -> Resolution {
        let mut profile = CompilerProfile::new(self.options.case_sensitive);

        let prior = prior_master.filter(|p| !p.as_os_str().is_empty());
        let _path_override = prior.map(|dir| {
            profile.master_path = Some(dir.to_path_buf());
            ScopedPathOverride::prepend(dir)
        });

        let mut walk = Walk {
            resolver: self,
            programs: &descriptor.programs,
            profile,
        };
        walk.walk_nodes(&descriptor.nodes, None);
        let profile = walk.profile;

        let confidence = self.classify(descriptor, &profile);
        info!(
            toolchain = %descriptor.id,
            %confidence,
            master = ?profile.master_path,
            "resolution finished"
        );
        Resolution {
            profile,
            confidence,
        }
    }

    fn eval_predicate(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::Platform(test) => platform_matches(*test, self.options.platform),
            Predicate::EnvDefined(name) => env::var(name).map_or(false, |v| !v.is_empty()),
            Predicate::MacroNonEmpty(name) => {
                !self.expand_or_empty(&format!("$({name})")).is_empty()
            }
            Predicate::Unrecognized(what) => {
                debug!(predicate = %what, "unrecognized condition evaluates to false");
                false
            }
        }
    }

    fn expand_or_empty(&self, raw: &str) -> String {
        match self.expander.expand(raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, raw, "macro expansion failed, substituting empty value");
                String::new()
            }
        }
    }

    /// The structural candidate check shared by the path-producing search
    /// strategies. Returns the directory to register on a match:
    /// the candidate itself, or its `bin` subdirectory when the target
    /// executable only exists there.
    fn match_candidate(&self, candidate: &Path, target: Option<&str>) -> Option<PathBuf> {
        let Some(program) = target else {
            return self
                .probe
                .dir_exists(candidate)
                .then(|| candidate.to_path_buf());
        };
        let executable = format!("{}{}", program, self.options.exe_suffix);
        if self.probe.file_exists(&candidate.join(&executable)) {
            Some(candidate.to_path_buf())
        } else if self.probe.file_exists(&candidate.join("bin").join(&executable)) {
            Some(candidate.join("bin"))
        } else {
            None
        }
    }

    fn classify(&self, descriptor: &Descriptor, profile: &CompilerProfile) -> Confidence {
        if descriptor.is_no_compiler() {
            return Confidence::Detected;
        }
        let Some(program) = descriptor.programs.get(ProgramKind::C) else {
            return Confidence::Guessed;
        };
        let executable = format!("{}{}", program, self.options.exe_suffix);
        if let Some(master) = &profile.master_path {
            if self.probe.file_exists(&master.join(&executable))
                || self.probe.file_exists(&master.join("bin").join(&executable))
            {
                return Confidence::Detected;
            }
        }
        if profile
            .extra_paths
            .iter()
            .any(|path| self.probe.file_exists(&path.join(&executable)))
        {
            return Confidence::Detected;
        }
        Confidence::Guessed
    }
}

fn platform_matches(test: Platform, host: Platform) -> bool {
    match test {
        Platform::Windows => host == Platform::Windows,
        // "unix" is a family test and covers macOS as well.
        Platform::Unix => host != Platform::Windows,
        Platform::MacOs => host == Platform::MacOs,
    }
}

/// One resolution run: the resolver's collaborators plus the profile being
/// built and the descriptor's program table.
struct Walk<'a> {
    resolver: &'a Resolver<'a>,
    programs: &'a Programs,
    profile: CompilerProfile,
}

impl<'a> Walk<'a> {
    fn walk_nodes(&mut self, nodes: &[DescriptorNode], mode: Option<SearchMode>) -> Flow {
        for node in nodes {
            match node {
                DescriptorNode::Conditional {
                    predicate,
                    then_branch,
                    else_branch,
                } => {
                    let branch = if self.resolver.eval_predicate(predicate) {
                        then_branch
                    } else {
                        else_branch
                    };
                    if self.walk_nodes(branch, mode) == Flow::MasterResolved {
                        return Flow::MasterResolved;
                    }
                }
                DescriptorNode::PathScope {
                    mode: scope_mode,
                    body,
                } => {
                    if *scope_mode == SearchMode::Master && self.profile.master_path.is_some() {
                        debug!("master path already known, skipping master search scope");
                        continue;
                    }
                    // The scope boundary absorbs a master-resolved signal.
                    let _ = self.walk_nodes(body, Some(*scope_mode));
                }
                DescriptorNode::Search(spec) => match mode {
                    Some(active) => {
                        if self.run_search(spec, active) {
                            return Flow::MasterResolved;
                        }
                    }
                    None => debug!("search directive outside a path scope, ignoring"),
                },
                DescriptorNode::AddOption { kind, value } => {
                    if mode.is_none() {
                        debug!("option directive outside a path scope, ignoring");
                        continue;
                    }
                    let expanded = self.resolver.expand_or_empty(value);
                    if expanded.is_empty() {
                        debug!(value, "option expanded to nothing, ignoring");
                        continue;
                    }
                    self.profile.add_option(*kind, expanded);
                }
                DescriptorNode::AddPath { segments } => {
                    let Some(active) = mode else {
                        debug!("path directive outside a path scope, ignoring");
                        continue;
                    };
                    let composed = self.compose_path(segments);
                    if composed.is_empty() {
                        debug!("composed path is empty, ignoring");
                        continue;
                    }
                    self.profile.register(active, Path::new(&composed), 0);
                }
                DescriptorNode::Fallback {
                    mode: fallback_mode,
                    value,
                } => {
                    let Some(target) = fallback_mode else {
                        debug!("fallback outside a path scope, ignoring");
                        continue;
                    };
                    if !self.profile.collection_is_empty(*target) {
                        continue;
                    }
                    let expanded = self.resolver.expand_or_empty(value);
                    if expanded.is_empty() {
                        continue;
                    }
                    debug!(path = %expanded, ?target, "applying fallback path");
                    self.profile.apply_fallback(*target, PathBuf::from(expanded));
                }
            }
        }
        Flow::Continue
    }

    /// Runs one search directive. Returns true when it resolved the master
    /// path, which ends the enclosing scope early.
    fn run_search(&mut self, spec: &SearchSpec, mode: SearchMode) -> bool {
        let programs = self.programs;
        let target = spec.target.and_then(|kind| programs.get(kind));
        match &spec.strategy {
            SearchStrategy::EnvVar { var } => {
                let Some(raw) = env::var_os(var) else {
                    debug!(var, "environment variable not set");
                    return false;
                };
                self.scan_candidates(env::split_paths(&raw), target, spec, mode)
            }
            SearchStrategy::Macro { value } => {
                let expanded = self.resolver.expand_or_empty(value);
                if expanded.is_empty() {
                    debug!(value, "macro search expanded to nothing");
                    return false;
                }
                self.scan_candidates(env::split_paths(&expanded), target, spec, mode)
            }
            SearchStrategy::LiteralPath { path } => {
                let expanded = self.resolver.expand_or_empty(path);
                if expanded.is_empty() {
                    return false;
                }
                let resolved = if expanded.contains(WILDCARD_CHARS) {
                    match self.resolver.probe.first_wildcard_match(&expanded) {
                        Ok(Some(found)) => found,
                        Ok(None) => {
                            debug!(pattern = %expanded, "wildcard matched nothing");
                            return false;
                        }
                        Err(error) => {
                            debug!(pattern = %expanded, %error, "wildcard probe failed");
                            return false;
                        }
                    }
                } else {
                    PathBuf::from(&expanded)
                };
                self.scan_candidates(std::iter::once(resolved), target, spec, mode)
            }
            SearchStrategy::FileScan {
                file,
                pattern,
                group,
            } => self.scan_file(file, pattern, *group, spec, mode),
            SearchStrategy::Registry { key, value_name } => {
                match self.resolver.probe.read_registry_value(key, value_name) {
                    Ok(Some(value)) => {
                        let dir = PathBuf::from(&value);
                        if !self.resolver.probe.dir_exists(&dir) {
                            debug!(key, value, "registry value is not an existing directory");
                            return false;
                        }
                        let changed = self.profile.register(mode, &dir, spec.strip_components);
                        if changed {
                            debug!(key, path = %dir.display(), ?mode, "registry hit registered");
                        }
                        mode == SearchMode::Master && changed
                    }
                    Ok(None) => {
                        debug!(key, value_name, "registry value not present");
                        false
                    }
                    Err(error) => {
                        debug!(key, %error, "registry probe failed");
                        false
                    }
                }
            }
        }
    }

    /// Scans candidates in order and registers the first structural match.
    /// Every strategy stops at its first hit; in master mode the hit also
    /// raises the early-exit signal.
    fn scan_candidates(
        &mut self,
        candidates: impl Iterator<Item = PathBuf>,
        target: Option<&str>,
        spec: &SearchSpec,
        mode: SearchMode,
    ) -> bool {
        for candidate in candidates {
            if candidate.as_os_str().is_empty() {
                continue;
            }
            let Some(found) = self.resolver.match_candidate(&candidate, target) else {
                continue;
            };
            let changed = self.profile.register(mode, &found, spec.strip_components);
            if changed {
                debug!(path = %found.display(), ?mode, "search hit registered");
            }
            return mode == SearchMode::Master && changed;
        }
        false
    }

    /// File scans register every matching capture, not just the first; a
    /// master-mode scan still ends as soon as the master path lands.
    fn scan_file(
        &mut self,
        file: &str,
        pattern: &str,
        group: usize,
        spec: &SearchSpec,
        mode: SearchMode,
    ) -> bool {
        let path = self.resolver.expand_or_empty(file);
        if path.is_empty() {
            return false;
        }
        let content = match self.resolver.probe.read_to_string(Path::new(&path)) {
            Ok(content) => content,
            Err(error) => {
                debug!(file = %path, %error, "file scan skipped");
                return false;
            }
        };
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(error) => {
                warn!(pattern, %error, "invalid file scan pattern");
                return false;
            }
        };
        for line in content.lines() {
            let Some(captures) = regex.captures(line) else {
                continue;
            };
            let Some(matched) = captures.get(group) else {
                continue;
            };
            let changed = self
                .profile
                .register(mode, Path::new(matched.as_str()), spec.strip_components);
            if changed {
                debug!(path = matched.as_str(), ?mode, "file scan hit registered");
            }
            if mode == SearchMode::Master && changed {
                return true;
            }
        }
        false
    }

    /// Joins the segments of a composed path and macro-expands the result.
    /// An unresolved master contributes nothing, as does an unset variable.
    fn compose_path(&self, segments: &[PathSegment]) -> String {
        let mut out = String::new();
        for segment in segments {
            match segment {
                PathSegment::Literal(text) => out.push_str(text),
                PathSegment::Master => {
                    if let Some(master) = &self.profile.master_path {
                        out.push_str(&master.to_string_lossy());
                    }
                }
                PathSegment::Separator => out.push(self.resolver.options.dir_separator()),
                PathSegment::Env(name) => {
                    if let Ok(value) = env::var(name) {
                        out.push_str(&value);
                    }
                }
            }
        }
        self.resolver.expand_or_empty(&out)
    }
}
