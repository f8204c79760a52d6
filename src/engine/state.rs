use nix::sys::termios::Termios;
use nix::unistd::{getpgrp, Pid};

use super::jobs::JobTable;

/// Process-wide shell state, threaded as `&mut Shell` through the engine and
/// the builtins instead of living in globals.
pub struct Shell {
    pub jobs: JobTable,
    /// True iff stdin is a controlling terminal and no batch file was given.
    pub interactive: bool,
    /// Per-job resource reporting (`-t`).
    pub rusage: bool,
    pub shell_pgid: Pid,
    /// Terminal attributes captured at startup; restored whenever the shell
    /// reclaims the terminal.
    pub shell_termios: Option<Termios>,
    /// Exit status of the most recently completed foreground job, exposed
    /// as `$?`.
    pub last_exit_code: i32,
}

impl Shell {
    pub fn new(interactive: bool, rusage: bool) -> Self {
        Shell {
            jobs: JobTable::new(),
            interactive,
            rusage,
            shell_pgid: getpgrp(),
            shell_termios: None,
            last_exit_code: 0,
        }
    }
}

/// Whether the top-level loop should keep going after a command.
pub enum ExecutionResult {
    KeepRunning,
    Exit(i32),
}
