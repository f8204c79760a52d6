use nix::sys::signal::{killpg, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::termios::tcgetattr;
use nix::unistd::{getpgrp, getpid, setpgid, tcgetpgrp, tcsetpgrp};

use crate::engine::Shell;

const JOB_CONTROL_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

/// Interactive startup: become the terminal's foreground process group,
/// ignore the job-control signals, and snapshot the terminal attributes.
///
/// Any failure here is fatal for the shell.
pub fn setup(shell: &mut Shell) -> nix::Result<()> {
    // If another group owns the terminal, stop ourselves with SIGTTIN until
    // we are continued in the foreground.
    loop {
        let pgrp = getpgrp();
        if tcgetpgrp(std::io::stdin())? == pgrp {
            break;
        }
        killpg(pgrp, Signal::SIGTTIN)?;
    }

    // Ignore the job-control signals so Ctrl+C / Ctrl+Z only reach the
    // foreground child group. SIGCHLD stays at its default; children are
    // reaped at the loop's two wait points, never asynchronously.
    // Note: rustyline overrides SIGINT during readline() calls, which is fine.
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::SA_RESTART, SigSet::empty());
    for sig in JOB_CONTROL_SIGNALS {
        unsafe { sigaction(sig, &ignore)? };
    }

    // Put the shell in its own group, claim the terminal, and remember the
    // attributes to restore every time the shell takes the terminal back.
    let pid = getpid();
    setpgid(pid, pid)?;
    shell.shell_pgid = pid;
    tcsetpgrp(std::io::stdin(), pid)?;
    shell.shell_termios = Some(tcgetattr(std::io::stdin())?);

    Ok(())
}

/// Reset signal dispositions in a child between fork and exec, including
/// SIGCHLD. Best-effort: there is nothing useful to do about a failure
/// at this point.
pub fn restore_default() {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::SA_RESTART, SigSet::empty());
    for sig in JOB_CONTROL_SIGNALS {
        unsafe {
            let _ = sigaction(sig, &default);
        }
    }
    unsafe {
        let _ = sigaction(Signal::SIGCHLD, &default);
    }
}
