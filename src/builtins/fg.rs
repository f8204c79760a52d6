use crate::builtins::registry::CommandInfo;
use crate::engine::{job_control, ExecutionResult, Shell};

/// `fg <jobid>` — place the job in the foreground, continuing it if it was
/// suspended.
pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "fg",
    usage: "fg <jobid>",
    run,
};

fn run(args: &[&str], shell: &mut Shell) -> (ExecutionResult, i32) {
    let Some(id) = args.first().and_then(|arg| arg.parse::<usize>().ok()) else {
        eprintln!("Usage: {}", COMMAND_INFO.usage);
        return (ExecutionResult::KeepRunning, 1);
    };

    match job_control::run_in_foreground(shell, id, true) {
        Ok(()) => (ExecutionResult::KeepRunning, 0),
        Err(e) => {
            eprintln!("smash: fg: {}", e);
            (ExecutionResult::KeepRunning, 1)
        }
    }
}
