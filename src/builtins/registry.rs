use log::debug;

use crate::builtins;
use crate::engine::{ExecutionResult, Shell};

/// A builtin handler: the whitespace-split argument tail plus the shell
/// context. Builtins run in the shell process itself — no fork, no pipes,
/// no redirection.
pub type BuiltinRunner = fn(&[&str], &mut Shell) -> (ExecutionResult, i32);

pub struct CommandInfo {
    pub name: &'static str,
    /// One-line synopsis, shown on misuse.
    pub usage: &'static str,
    pub run: BuiltinRunner,
}

pub const BUILTINS: &[CommandInfo] = &[
    builtins::system::COMMAND_INFO_EXIT,
    builtins::cd::COMMAND_INFO_CD,
    builtins::cd::COMMAND_INFO_PWD,
    builtins::echo::COMMAND_INFO,
    builtins::jobs_cmd::COMMAND_INFO,
    builtins::fg::COMMAND_INFO,
    builtins::bg::COMMAND_INFO,
    builtins::kill_cmd::COMMAND_INFO,
    builtins::system::COMMAND_INFO_COMMENT,
];

/// Match the first whitespace-delimited token of `line` against the table.
/// Full-token equality only: `exitfoo` is not `exit`.
pub fn find_command(line: &str) -> Option<&'static CommandInfo> {
    let token = line.split_whitespace().next()?;
    BUILTINS.iter().find(|cmd| cmd.name == token)
}

/// Run `line` as a builtin if its first token names one. The builtin
/// consumes the entire line; the rest of the tokens become its arguments.
pub fn dispatch(line: &str, shell: &mut Shell) -> Option<ExecutionResult> {
    let info = find_command(line)?;
    let args: Vec<&str> = line.split_whitespace().skip(1).collect();
    let (result, code) = (info.run)(&args, shell);
    debug!("builtin {} finished with {}", info.name, code);
    Some(result)
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_token_matches() {
        assert_eq!(find_command("exit").unwrap().name, "exit");
        assert_eq!(find_command("jobs").unwrap().name, "jobs");
        assert_eq!(find_command("fg 1").unwrap().name, "fg");
        assert_eq!(find_command("  kill -9 2").unwrap().name, "kill");
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        assert!(find_command("exitfoo").is_none());
        assert!(find_command("cdrom").is_none());
        assert!(find_command("echoing hello").is_none());
    }

    #[test]
    fn test_non_builtins_pass_through() {
        assert!(find_command("ls -la").is_none());
        assert!(find_command("").is_none());
    }
}
