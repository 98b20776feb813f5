//! Macro expansion for descriptor values.
//!
//! Descriptor attributes may embed `$(NAME)` tokens. Expansion is iterative
//! so macros can reference other macros, with a fixed pass bound that keeps
//! self-referential definitions from looping forever.

use std::collections::HashMap;
use std::env;

use tracing::debug;

use crate::error::ExpansionError;

/// Maximum substitution passes before giving up on nested macros.
const MAX_PASSES: usize = 8;

/// Resolves `$(NAME)` tokens inside descriptor values.
pub trait MacroExpander {
    fn expand(&self, raw: &str) -> Result<String, ExpansionError>;
}

/// Expander backed by process environment variables.
///
/// Unknown macros expand to the empty string, so expansion itself never
/// fails and is idempotent once all tokens are gone.
#[derive(Debug, Default)]
pub struct EnvMacroExpander;

impl EnvMacroExpander {
    pub fn new() -> Self {
        Self
    }
}

impl MacroExpander for EnvMacroExpander {
    fn expand(&self, raw: &str) -> Result<String, ExpansionError> {
        expand_bounded(raw, &mut |name| Ok(env::var(name).unwrap_or_default()))
    }
}

/// Expander backed by a fixed map, for tests and embedding.
///
/// Lenient by default like [`EnvMacroExpander`]; in strict mode an unknown
/// macro is an error instead of an empty substitution.
#[derive(Debug, Default)]
pub struct StaticMacroExpander {
    values: HashMap<String, String>,
    strict: bool,
}

impl StaticMacroExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            values: HashMap::new(),
            strict: true,
        }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl MacroExpander for StaticMacroExpander {
    fn expand(&self, raw: &str) -> Result<String, ExpansionError> {
        expand_bounded(raw, &mut |name| match self.values.get(name) {
            Some(value) => Ok(value.clone()),
            None if self.strict => Err(ExpansionError::UnknownMacro(name.to_string())),
            None => Ok(String::new()),
        })
    }
}

fn expand_bounded(
    raw: &str,
    lookup: &mut dyn FnMut(&str) -> Result<String, ExpansionError>,
) -> Result<String, ExpansionError> {
    let mut current = raw.to_string();
    for _ in 0..MAX_PASSES {
        let (next, changed) = substitute_pass(&current, lookup)?;
        if !changed {
            return Ok(next);
        }
        current = next;
    }
    if current.contains("$(") {
        debug!(value = raw, "macro expansion still unresolved after bounded passes");
    }
    Ok(current)
}

/// Replaces every `$(NAME)` token once. An unterminated token is kept
/// literally rather than swallowing the rest of the value.
fn substitute_pass(
    input: &str,
    lookup: &mut dyn FnMut(&str) -> Result<String, ExpansionError>,
) -> Result<(String, bool), ExpansionError> {
    let mut out = String::with_capacity(input.len());
    let mut changed = false;
    let mut rest = input;
    while let Some(start) = rest.find("$(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find(')') {
            Some(end) => {
                out.push_str(&lookup(&after[..end])?);
                changed = true;
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Ok((out, changed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn plain_text_passes_through() {
        let expander = StaticMacroExpander::new();
        assert_eq!(expander.expand("/usr/local/bin").unwrap(), "/usr/local/bin");
    }

    #[test]
    fn substitutes_known_macro() {
        let expander = StaticMacroExpander::new().with("ROOT", "/opt/llvm");
        assert_eq!(expander.expand("$(ROOT)/bin").unwrap(), "/opt/llvm/bin");
    }

    #[test]
    fn unknown_macro_expands_to_empty() {
        let expander = StaticMacroExpander::new();
        assert_eq!(expander.expand("x$(NOPE)y").unwrap(), "xy");
    }

    #[test]
    fn strict_mode_rejects_unknown_macro() {
        let expander = StaticMacroExpander::strict().with("A", "1");
        assert_eq!(expander.expand("$(A)").unwrap(), "1");
        let err = expander.expand("$(B)").unwrap_err();
        assert!(matches!(err, ExpansionError::UnknownMacro(name) if name == "B"));
    }

    #[test]
    fn nested_macros_resolve() {
        let expander = StaticMacroExpander::new()
            .with("A", "$(B)/x")
            .with("B", "/root");
        assert_eq!(expander.expand("$(A)").unwrap(), "/root/x");
    }

    #[test]
    fn self_referential_macro_terminates() {
        let expander = StaticMacroExpander::new().with("LOOP", "$(LOOP)");
        let result = expander.expand("$(LOOP)").unwrap();
        assert_eq!(result, "$(LOOP)");
    }

    #[test]
    fn growing_self_reference_terminates() {
        let expander = StaticMacroExpander::new().with("G", "a$(G)");
        let result = expander.expand("$(G)").unwrap();
        assert!(result.starts_with("aaaa"));
        assert!(result.ends_with("$(G)"));
    }

    #[test]
    fn unterminated_token_is_kept_literally() {
        let expander = StaticMacroExpander::new().with("A", "1");
        assert_eq!(expander.expand("$(A) and $(OPEN").unwrap(), "1 and $(OPEN");
    }

    #[test]
    fn expansion_is_idempotent() {
        let expander = StaticMacroExpander::new()
            .with("A", "$(B)")
            .with("B", "/final");
        let once = expander.expand("$(A):$(MISSING):tail").unwrap();
        let twice = expander.expand(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, "/final::tail");
    }

    #[test]
    #[serial]
    fn env_expander_reads_environment() {
        env::set_var("TOOLSCOUT_TEST_MACRO", "/from/env");
        let expander = EnvMacroExpander::new();
        assert_eq!(
            expander.expand("$(TOOLSCOUT_TEST_MACRO)/bin").unwrap(),
            "/from/env/bin"
        );
        env::remove_var("TOOLSCOUT_TEST_MACRO");
        assert_eq!(expander.expand("$(TOOLSCOUT_TEST_MACRO)/bin").unwrap(), "/bin");
    }
}
