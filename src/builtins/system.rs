use crate::builtins::registry::CommandInfo;
use crate::engine::{ExecutionResult, Shell};

/// `exit [n]` — exit with status N (0 if omitted). Live jobs are canceled
/// and reaped on the way out.
pub const COMMAND_INFO_EXIT: CommandInfo = CommandInfo {
    name: "exit",
    usage: "exit [n]",
    run: exit_runner,
};

/// `exit [n]` — leave through the normal exit path so teardown (cancel all
/// jobs, reap everything) runs in `main`.
fn exit_runner(args: &[&str], _shell: &mut Shell) -> (ExecutionResult, i32) {
    match args.first() {
        None => (ExecutionResult::Exit(0), 0),
        Some(arg) => match arg.parse::<i32>() {
            Ok(code) => (ExecutionResult::Exit(code), code),
            Err(_) => {
                eprintln!("smash: exit: {}: numeric argument required", arg);
                (ExecutionResult::KeepRunning, 1)
            }
        },
    }
}

pub const COMMAND_INFO_COMMENT: CommandInfo = CommandInfo {
    name: "#",
    usage: "# [anything]",
    run: comment_runner,
};

fn comment_runner(_args: &[&str], _shell: &mut Shell) -> (ExecutionResult, i32) {
    (ExecutionResult::KeepRunning, 0)
}
