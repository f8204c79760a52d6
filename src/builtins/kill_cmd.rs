use nix::sys::signal::{killpg, Signal};

use crate::builtins::registry::CommandInfo;
use crate::engine::{ExecutionResult, Shell};

/// `kill -<signum> <jobid>` — send SIGNUM to every process of the job. The
/// job must be running or suspended.
pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "kill",
    usage: "kill -<signum> <jobid>",
    run,
};

fn run(args: &[&str], shell: &mut Shell) -> (ExecutionResult, i32) {
    let Some((signum, job_id)) = parse_args(args) else {
        eprintln!("Usage: {}", COMMAND_INFO.usage);
        return (ExecutionResult::KeepRunning, 1);
    };

    let Some(job) = shell.jobs.get(job_id) else {
        eprintln!("smash: kill: no such job: {}", job_id);
        return (ExecutionResult::KeepRunning, 1);
    };
    if !job.status.is_live() {
        eprintln!("smash: kill: job {} is in the wrong state", job_id);
        return (ExecutionResult::KeepRunning, 1);
    }

    let signal = match Signal::try_from(signum) {
        Ok(signal) => signal,
        Err(_) => {
            eprintln!("smash: kill: invalid signal: {}", signum);
            return (ExecutionResult::KeepRunning, 1);
        }
    };

    match killpg(job.pgid, signal) {
        Ok(()) => (ExecutionResult::KeepRunning, 0),
        Err(e) => {
            eprintln!("smash: kill: {}", e);
            (ExecutionResult::KeepRunning, 1)
        }
    }
}

/// `-<signum> <jobid>`, both plain decimal integers.
fn parse_args(args: &[&str]) -> Option<(i32, usize)> {
    let signum = args.first()?.strip_prefix('-')?.parse().ok()?;
    let job_id = args.get(1)?.parse().ok()?;
    Some((signum, job_id))
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::parse_args;

    #[test]
    fn test_signal_and_job_id() {
        assert_eq!(parse_args(&["-15", "1"]), Some((15, 1)));
        assert_eq!(parse_args(&["-9", "12"]), Some((9, 12)));
    }

    #[test]
    fn test_malformed_rejected() {
        assert_eq!(parse_args(&[]), None);
        assert_eq!(parse_args(&["15", "1"]), None);
        assert_eq!(parse_args(&["-15"]), None);
        assert_eq!(parse_args(&["-TERM", "1"]), None);
    }
}
