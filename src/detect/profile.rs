//! Resolved toolchain profile and its path collections.

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::descriptor::{OptionKind, SearchMode};

/// Ordered set of paths with configurable duplicate comparison.
///
/// Insertion order is preserved; a path equal to an existing entry (ignoring
/// ASCII case when configured) is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathList {
    entries: Vec<PathBuf>,
    case_sensitive: bool,
}

impl PathList {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            entries: Vec::new(),
            case_sensitive,
        }
    }

    /// Appends a path unless an equal entry is already present.
    /// Returns whether the list changed.
    pub fn push(&mut self, path: PathBuf) -> bool {
        if self.contains(&path) {
            return false;
        }
        self.entries.push(path);
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .iter()
            .any(|entry| paths_equal(entry, path, self.case_sensitive))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.entries
    }
}

impl Serialize for PathList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.entries.serialize(serializer)
    }
}

fn paths_equal(a: &Path, b: &Path, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_string_lossy()
            .eq_ignore_ascii_case(&b.to_string_lossy())
    }
}

/// Everything a descriptor walk resolves for one toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerProfile {
    /// Installation root. A registration ending in a `bin` component is
    /// trimmed to its parent, so this points at the root rather than the
    /// executable directory.
    pub master_path: Option<PathBuf>,
    pub extra_paths: PathList,
    pub include_dirs: PathList,
    pub resource_include_dirs: PathList,
    pub lib_dirs: PathList,
    pub compiler_flags: Vec<String>,
    pub linker_flags: Vec<String>,
    pub link_libs: Vec<String>,
    #[serde(skip)]
    case_sensitive: bool,
}

impl CompilerProfile {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            master_path: None,
            extra_paths: PathList::new(case_sensitive),
            include_dirs: PathList::new(case_sensitive),
            resource_include_dirs: PathList::new(case_sensitive),
            lib_dirs: PathList::new(case_sensitive),
            compiler_flags: Vec::new(),
            linker_flags: Vec::new(),
            link_libs: Vec::new(),
            case_sensitive,
        }
    }

    /// Registers a search hit under `mode` after stripping
    /// `strip_components` trailing components.
    ///
    /// Master registrations only land while the master is still unknown.
    /// Returns whether the profile changed.
    pub(crate) fn register(
        &mut self,
        mode: SearchMode,
        path: &Path,
        strip_components: usize,
    ) -> bool {
        let mut path = path.to_path_buf();
        for _ in 0..strip_components {
            if !path.pop() {
                break;
            }
        }
        if path.as_os_str().is_empty() {
            return false;
        }
        match mode {
            SearchMode::Master => {
                if self.master_path.is_some() {
                    return false;
                }
                self.master_path = Some(strip_trailing_bin(&path, self.case_sensitive));
                true
            }
            SearchMode::Extra => self.extra_paths.push(path),
            SearchMode::Include => self.include_dirs.push(path),
            SearchMode::Resource => self.resource_include_dirs.push(path),
            SearchMode::Lib => self.lib_dirs.push(path),
        }
    }

    pub(crate) fn add_option(&mut self, kind: OptionKind, value: String) {
        match kind {
            OptionKind::CompilerFlag => self.compiler_flags.push(value),
            OptionKind::LinkerFlag => self.linker_flags.push(value),
            OptionKind::LinkLib => self.link_libs.push(value),
        }
    }

    /// Whether the collection a mode feeds is still empty.
    pub(crate) fn collection_is_empty(&self, mode: SearchMode) -> bool {
        match mode {
            SearchMode::Master => self.master_path.is_none(),
            SearchMode::Extra => self.extra_paths.is_empty(),
            SearchMode::Include => self.include_dirs.is_empty(),
            SearchMode::Resource => self.resource_include_dirs.is_empty(),
            SearchMode::Lib => self.lib_dirs.is_empty(),
        }
    }

    /// Inserts a fallback value verbatim, without trimming.
    pub(crate) fn apply_fallback(&mut self, mode: SearchMode, path: PathBuf) {
        match mode {
            SearchMode::Master => self.master_path = Some(path),
            SearchMode::Extra => {
                self.extra_paths.push(path);
            }
            SearchMode::Include => {
                self.include_dirs.push(path);
            }
            SearchMode::Resource => {
                self.resource_include_dirs.push(path);
            }
            SearchMode::Lib => {
                self.lib_dirs.push(path);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.master_path.is_none()
            && self.extra_paths.is_empty()
            && self.include_dirs.is_empty()
            && self.resource_include_dirs.is_empty()
            && self.lib_dirs.is_empty()
            && self.compiler_flags.is_empty()
            && self.linker_flags.is_empty()
            && self.link_libs.is_empty()
    }
}

fn strip_trailing_bin(path: &Path, case_sensitive: bool) -> PathBuf {
    let ends_in_bin = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| {
            if case_sensitive {
                name == "bin"
            } else {
                name.eq_ignore_ascii_case("bin")
            }
        })
        .unwrap_or(false);
    if ends_in_bin {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => return parent.to_path_buf(),
            _ => {}
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_registration_trims_bin() {
        let mut profile = CompilerProfile::new(true);
        assert!(profile.register(SearchMode::Master, Path::new("/opt/gcc/bin"), 0));
        assert_eq!(profile.master_path.as_deref(), Some(Path::new("/opt/gcc")));
    }

    #[test]
    fn master_registration_without_bin_is_verbatim() {
        let mut profile = CompilerProfile::new(true);
        profile.register(SearchMode::Master, Path::new("/opt/gcc"), 0);
        assert_eq!(profile.master_path.as_deref(), Some(Path::new("/opt/gcc")));
    }

    #[test]
    fn bin_trim_ignores_case_when_insensitive() {
        let mut profile = CompilerProfile::new(false);
        profile.register(SearchMode::Master, Path::new("/llvm/Bin"), 0);
        assert_eq!(profile.master_path.as_deref(), Some(Path::new("/llvm")));

        let mut profile = CompilerProfile::new(true);
        profile.register(SearchMode::Master, Path::new("/llvm/Bin"), 0);
        assert_eq!(profile.master_path.as_deref(), Some(Path::new("/llvm/Bin")));
    }

    #[test]
    fn second_master_registration_is_ignored() {
        let mut profile = CompilerProfile::new(true);
        assert!(profile.register(SearchMode::Master, Path::new("/first"), 0));
        assert!(!profile.register(SearchMode::Master, Path::new("/second"), 0));
        assert_eq!(profile.master_path.as_deref(), Some(Path::new("/first")));
    }

    #[test]
    fn non_master_modes_keep_bin_suffix() {
        let mut profile = CompilerProfile::new(true);
        profile.register(SearchMode::Include, Path::new("/llvm/bin"), 0);
        assert_eq!(profile.include_dirs.as_slice(), &[PathBuf::from("/llvm/bin")]);
    }

    #[test]
    fn strip_components_removes_trailing_parts() {
        let mut profile = CompilerProfile::new(true);
        profile.register(SearchMode::Extra, Path::new("/a/b/c"), 1);
        profile.register(SearchMode::Lib, Path::new("/x/y"), 5);
        assert_eq!(profile.extra_paths.as_slice(), &[PathBuf::from("/a/b")]);
        // Over-stripping stops at the root and registers nothing past it.
        assert_eq!(profile.lib_dirs.as_slice(), &[PathBuf::from("/")]);
    }

    #[test]
    fn duplicate_paths_are_suppressed() {
        let mut profile = CompilerProfile::new(true);
        assert!(profile.register(SearchMode::Extra, Path::new("/opt/tools"), 0));
        assert!(!profile.register(SearchMode::Extra, Path::new("/opt/tools"), 0));
        assert_eq!(profile.extra_paths.len(), 1);
    }

    #[test]
    fn case_insensitive_dedup_collapses_variants() {
        let mut list = PathList::new(false);
        assert!(list.push(PathBuf::from("/Foo")));
        assert!(!list.push(PathBuf::from("/foo")));
        assert_eq!(list.as_slice(), &[PathBuf::from("/Foo")]);

        let mut list = PathList::new(true);
        assert!(list.push(PathBuf::from("/Foo")));
        assert!(list.push(PathBuf::from("/foo")));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn fallback_assigns_verbatim() {
        let mut profile = CompilerProfile::new(true);
        profile.apply_fallback(SearchMode::Master, PathBuf::from("/opt/gcc/bin"));
        // No bin trimming on fallbacks, the descriptor author wrote the
        // exact path they want.
        assert_eq!(
            profile.master_path.as_deref(),
            Some(Path::new("/opt/gcc/bin"))
        );
    }

    #[test]
    fn collection_emptiness_tracks_each_mode() {
        let mut profile = CompilerProfile::new(true);
        assert!(profile.collection_is_empty(SearchMode::Master));
        assert!(profile.collection_is_empty(SearchMode::Lib));

        profile.register(SearchMode::Lib, Path::new("/usr/lib"), 0);
        assert!(!profile.collection_is_empty(SearchMode::Lib));
        assert!(profile.collection_is_empty(SearchMode::Extra));
    }

    #[test]
    fn options_route_by_kind() {
        let mut profile = CompilerProfile::new(true);
        profile.add_option(OptionKind::CompilerFlag, "-Wall".to_string());
        profile.add_option(OptionKind::LinkerFlag, "-s".to_string());
        profile.add_option(OptionKind::LinkLib, "m".to_string());
        profile.add_option(OptionKind::CompilerFlag, "-O2".to_string());

        assert_eq!(profile.compiler_flags, ["-Wall", "-O2"]);
        assert_eq!(profile.linker_flags, ["-s"]);
        assert_eq!(profile.link_libs, ["m"]);
    }

    #[test]
    fn empty_profile_reports_empty() {
        let mut profile = CompilerProfile::new(true);
        assert!(profile.is_empty());
        profile.add_option(OptionKind::LinkLib, "c".to_string());
        assert!(!profile.is_empty());
    }

    #[test]
    fn serializes_path_lists_as_arrays() {
        let mut profile = CompilerProfile::new(true);
        profile.register(SearchMode::Master, Path::new("/opt/gcc/bin"), 0);
        profile.register(SearchMode::Include, Path::new("/opt/gcc/include"), 0);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["master_path"], "/opt/gcc");
        assert_eq!(json["include_dirs"][0], "/opt/gcc/include");
        assert!(json["extra_paths"].as_array().unwrap().is_empty());
    }
}
