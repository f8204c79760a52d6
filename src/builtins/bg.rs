use crate::builtins::registry::CommandInfo;
use crate::engine::{job_control, ExecutionResult, Shell};

/// `bg <jobid>` — continue the suspended job without giving it the terminal.
pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "bg",
    usage: "bg <jobid>",
    run,
};

fn run(args: &[&str], shell: &mut Shell) -> (ExecutionResult, i32) {
    let Some(id) = args.first().and_then(|arg| arg.parse::<usize>().ok()) else {
        eprintln!("Usage: {}", COMMAND_INFO.usage);
        return (ExecutionResult::KeepRunning, 1);
    };

    match job_control::run_in_background(shell, id, true) {
        Ok(()) => (ExecutionResult::KeepRunning, 0),
        Err(e) => {
            eprintln!("smash: bg: {}", e);
            (ExecutionResult::KeepRunning, 1)
        }
    }
}
