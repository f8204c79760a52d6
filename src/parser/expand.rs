use std::env;
use std::path::PathBuf;

// ── Deferred `$` expansion ────────────────────────────────────────────────

/// Expand a single component at execution time.
///
/// Only components whose *first* character is `$` are touched:
/// - `$?`    → the last foreground exit code, in decimal
/// - `$NAME` → the value of the environment variable, or the empty string
///
/// Everything else passes through unchanged. Both the engine's argv builder
/// and the builtins (`echo`, `cd`) go through this one routine.
pub fn expand_component(component: &str, last_exit_code: i32) -> String {
    match component.strip_prefix('$') {
        Some("?") => last_exit_code.to_string(),
        Some(name) => env::var(name).unwrap_or_default(),
        None => component.to_string(),
    }
}

// ── Tilde expansion ───────────────────────────────────────────────────────

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

// ── Argv expansion (glob + tilde) ─────────────────────────────────────────

/// Build the argv tail for an external command.
///
/// Each component is `$`-expanded first; components that then start with `*`
/// or `~` go through tilde-aware glob expansion, with matches spliced into
/// the component's slot. A pattern with no matches aborts the launch. The
/// program name (argv[0]) never reaches this function.
pub fn expand_argv(components: &[String], last_exit_code: i32) -> Result<Vec<String>, String> {
    let mut argv = Vec::with_capacity(components.len());

    for component in components {
        let expanded = expand_component(component, last_exit_code);
        if expanded.starts_with('*') || expanded.starts_with('~') {
            argv.extend(glob_component(&expanded)?);
        } else {
            argv.push(expanded);
        }
    }

    Ok(argv)
}

fn glob_component(pattern: &str) -> Result<Vec<String>, String> {
    let pattern = if pattern.starts_with('~') {
        expand_home(pattern).to_string_lossy().into_owned()
    } else {
        pattern.to_string()
    };

    // A bare `~` or `~/dir` may hold no metacharacters once expanded.
    if !pattern.contains(['*', '?', '[']) {
        return Ok(vec![pattern]);
    }

    let paths = glob::glob(&pattern).map_err(|e| format!("{}: {}", pattern, e))?;
    let mut matches: Vec<String> = paths
        .filter_map(|entry| entry.ok())
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    if matches.is_empty() {
        return Err(format!("no matches found: {}", pattern));
    }
    matches.sort();
    Ok(matches)
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_exit_code() {
        assert_eq!(expand_component("$?", 0), "0");
        assert_eq!(expand_component("$?", 127), "127");
    }

    #[test]
    fn test_expand_known_var() {
        unsafe { std::env::set_var("SMASH_TEST_VAR", "hello"); }
        assert_eq!(expand_component("$SMASH_TEST_VAR", 0), "hello");
        unsafe { std::env::remove_var("SMASH_TEST_VAR"); }
    }

    #[test]
    fn test_expand_missing_var_is_empty() {
        unsafe { std::env::remove_var("SMASH_UNDEFINED_XYZ"); }
        assert_eq!(expand_component("$SMASH_UNDEFINED_XYZ", 0), "");
    }

    #[test]
    fn test_plain_component_unchanged() {
        assert_eq!(expand_component("-la", 0), "-la");
        // `$` must be the first character to trigger expansion
        assert_eq!(expand_component("a$b", 0), "a$b");
    }

    #[test]
    fn test_argv_keeps_positions() {
        unsafe { std::env::set_var("SMASH_ARG", "mid"); }
        let components = vec!["-n".to_string(), "$SMASH_ARG".to_string(), "tail".to_string()];
        let argv = expand_argv(&components, 0).unwrap();
        assert_eq!(argv, vec!["-n", "mid", "tail"]);
        unsafe { std::env::remove_var("SMASH_ARG"); }
    }

    #[test]
    fn test_glob_without_matches_fails() {
        let components = vec!["*.this_extension_should_not_exist_xyzzy".to_string()];
        let err = expand_argv(&components, 0).unwrap_err();
        assert!(err.contains("no matches found"));
    }

    #[test]
    fn test_tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/sub"), home.join("sub"));
        }
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
    }
}
