use crate::builtins::registry::CommandInfo;
use crate::engine::{ExecutionResult, Shell};

/// `jobs` — list the tracked jobs. Jobs that have exited or aborted are
/// reported once, then forgotten.
pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "jobs",
    usage: "jobs",
    run,
};

fn run(_args: &[&str], shell: &mut Shell) -> (ExecutionResult, i32) {
    shell.jobs.list();
    (ExecutionResult::KeepRunning, 0)
}
