mod ast;
mod combinators;
pub mod expand;

pub use ast::{Command, UserInput};

use combinators::parse_pipeline;

// ── Public API ────────────────────────────────────────────────────────────

/// Truncate `line` at the first `#` (comment) and trim surrounding
/// whitespace. The caller re-prompts when the result is empty.
pub fn strip_comment(line: &str) -> &str {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    line.trim()
}

/// Parse one input line into a [`UserInput`].
///
/// Returns `None` if the line is empty or contains no runnable command.
/// Environment variables are *not* expanded here; `$` components are kept
/// verbatim and resolved at execution time, so the parse is a pure function
/// of its input.
pub fn parse_input(line: &str) -> Option<UserInput> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (_, (commands, is_background)) = parse_pipeline(trimmed).ok()?;
    if commands.iter().all(|c| c.components.is_empty()) {
        return None;
    }

    Some(UserInput {
        raw: trimmed.to_string(),
        commands,
        is_background,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> Command {
        let input = parse_input(line).unwrap();
        assert_eq!(input.commands.len(), 1);
        input.commands.into_iter().next().unwrap()
    }

    // ── single-command tests ───────────────────────────────────────────────

    #[test]
    fn test_parse_simple() {
        let cmd = parse_one("ls -la");
        assert_eq!(cmd.components, vec!["ls", "-la"]);
        assert_eq!(cmd.program(), Some("ls"));
    }

    #[test]
    fn test_extra_spaces() {
        let cmd = parse_one("  ls   -la  ");
        assert_eq!(cmd.components, vec!["ls", "-la"]);
    }

    #[test]
    fn test_empty() {
        assert!(parse_input("").is_none());
        assert!(parse_input("   ").is_none());
        assert!(parse_input(" | ").is_none());
    }

    #[test]
    fn test_dollar_components_kept_verbatim() {
        let cmd = parse_one("echo $HOME $?");
        assert_eq!(cmd.components, vec!["echo", "$HOME", "$?"]);
    }

    // ── redirect tests ────────────────────────────────────────────────────

    #[test]
    fn test_redirect_separated() {
        let cmd = parse_one("ls > out.txt");
        assert_eq!(cmd.components, vec!["ls"]);
        assert_eq!(cmd.redirect_stdout.as_deref(), Some("out.txt"));
        assert!(!cmd.append_stdout);
    }

    #[test]
    fn test_redirect_joined() {
        let cmd = parse_one("ls >out.txt <in.txt");
        assert_eq!(cmd.redirect_stdout.as_deref(), Some("out.txt"));
        assert_eq!(cmd.redirect_stdin.as_deref(), Some("in.txt"));
    }

    #[test]
    fn test_redirect_append() {
        let cmd = parse_one("ls >> log.txt");
        assert_eq!(cmd.redirect_stdout.as_deref(), Some("log.txt"));
        assert!(cmd.append_stdout);
    }

    #[test]
    fn test_redirect_stderr() {
        let cmd = parse_one("cc main.c 2> errors");
        assert_eq!(cmd.components, vec!["cc", "main.c"]);
        assert_eq!(cmd.redirect_stderr.as_deref(), Some("errors"));
    }

    #[test]
    fn test_redirect_interleaved_with_args() {
        let cmd = parse_one("sort < in -r -n > out");
        assert_eq!(cmd.components, vec!["sort", "-r", "-n"]);
        assert_eq!(cmd.redirect_stdin.as_deref(), Some("in"));
        assert_eq!(cmd.redirect_stdout.as_deref(), Some("out"));
    }

    // ── background tests ──────────────────────────────────────────────────

    #[test]
    fn test_background_separated() {
        let input = parse_input("sleep 2 &").unwrap();
        assert!(input.is_background);
        assert_eq!(input.commands[0].components, vec!["sleep", "2"]);
        assert_eq!(input.raw, "sleep 2 &");
    }

    #[test]
    fn test_background_joined() {
        let input = parse_input("sleep 2&").unwrap();
        assert!(input.is_background);
        assert_eq!(input.commands[0].components, vec!["sleep", "2"]);
    }

    #[test]
    fn test_foreground_by_default() {
        assert!(!parse_input("sleep 2").unwrap().is_background);
    }

    // ── pipeline tests ────────────────────────────────────────────────────

    #[test]
    fn test_two_command_pipeline() {
        let input = parse_input("echo hello | wc -l").unwrap();
        assert_eq!(input.commands.len(), 2);
        assert_eq!(input.commands[0].components, vec!["echo", "hello"]);
        assert_eq!(input.commands[1].components, vec!["wc", "-l"]);
        assert_eq!(input.commands[0].raw, "echo hello");
        assert_eq!(input.commands[1].raw, "wc -l");
    }

    #[test]
    fn test_three_command_pipeline() {
        let input = parse_input("du /tmp | sort -nr | wc -l").unwrap();
        assert_eq!(input.commands.len(), 3);
        assert_eq!(input.commands[2].components, vec!["wc", "-l"]);
    }

    #[test]
    fn test_pipeline_with_redirects_on_ends() {
        let input = parse_input("sort < in | uniq > out").unwrap();
        assert_eq!(input.commands.len(), 2);
        assert_eq!(input.commands[0].redirect_stdin.as_deref(), Some("in"));
        assert_eq!(input.commands[1].redirect_stdout.as_deref(), Some("out"));
    }

    #[test]
    fn test_background_pipeline() {
        let input = parse_input("cat big | grep x &").unwrap();
        assert!(input.is_background);
        assert_eq!(input.commands.len(), 2);
    }

    #[test]
    fn test_reparse_round_trip() {
        // Rebuilding a line from the parsed words yields an equivalent tree.
        let first = parse_input("du /tmp | sort -nr | wc -l").unwrap();
        let rebuilt = first
            .commands
            .iter()
            .map(|c| c.components.join(" "))
            .collect::<Vec<_>>()
            .join(" | ");
        let second = parse_input(&rebuilt).unwrap();
        assert_eq!(first.commands.len(), second.commands.len());
        for (a, b) in first.commands.iter().zip(&second.commands) {
            assert_eq!(a.components, b.components);
        }
    }

    // ── comment stripping ─────────────────────────────────────────────────

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("echo hi # trailing"), "echo hi");
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(strip_comment("   "), "");
        assert_eq!(strip_comment("ls -la"), "ls -la");
    }
}
