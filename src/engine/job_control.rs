use std::io;

use log::debug;
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::termios::{tcgetattr, tcsetattr, SetArg};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{tcsetpgrp, Pid};

use super::jobs::{Job, JobStatus, ProcessState};
use super::state::Shell;

// ── Foreground / background transitions ───────────────────────────────────

/// Resume (or start) a job in the background. Requires the job to be new or
/// suspended; a running background job is left alone.
pub fn run_in_background(shell: &mut Shell, job_id: usize, send_cont: bool) -> Result<(), String> {
    let job = shell
        .jobs
        .get_mut(job_id)
        .ok_or_else(|| format!("no such job: {}", job_id))?;

    if !matches!(job.status, JobStatus::New | JobStatus::Suspended) {
        return Err("job is in the wrong state".to_string());
    }

    job.status = JobStatus::Running;
    job.is_in_background = true;
    let pgid = job.pgid;

    if send_cont {
        killpg(pgid, Signal::SIGCONT).map_err(|e| format!("killpg: {}", e))?;
    }
    Ok(())
}

/// Move a job into the foreground: hand it the terminal, continue it if it
/// was suspended (restoring the terminal attributes it was stopped with),
/// and wait for it.
pub fn run_in_foreground(shell: &mut Shell, job_id: usize, send_cont: bool) -> Result<(), String> {
    let job = shell
        .jobs
        .get_mut(job_id)
        .ok_or_else(|| format!("no such job: {}", job_id))?;

    match job.status {
        JobStatus::Running if !job.is_in_background => {
            return Err("job is already in the foreground".to_string());
        }
        JobStatus::New | JobStatus::Suspended | JobStatus::Running => {}
        _ => return Err("job is in the wrong state".to_string()),
    }

    let prior = job.status;
    job.status = JobStatus::Running;
    job.is_in_background = false;
    let pgid = job.pgid;
    let saved_termios = job.saved_termios.clone();

    tcsetpgrp(io::stdin(), pgid).map_err(|e| format!("tcsetpgrp: {}", e))?;

    if send_cont && prior != JobStatus::Running {
        if let Some(termios) = &saved_termios {
            let _ = tcsetattr(io::stdin(), SetArg::TCSADRAIN, termios);
        }
        killpg(pgid, Signal::SIGCONT).map_err(|e| format!("killpg: {}", e))?;
    }

    foreground_wait(shell, job_id);
    Ok(())
}

/// The foreground wait protocol: block until the job suspends or finishes,
/// reclaim the terminal, and do the bookkeeping the user can observe.
pub fn foreground_wait(shell: &mut Shell, job_id: usize) {
    wait_for_job(shell, job_id);
    reclaim_terminal(shell, job_id);

    let Some(job) = shell.jobs.get_mut(job_id) else {
        return;
    };
    match job.status {
        JobStatus::Exited(code) => shell.last_exit_code = code,
        JobStatus::Suspended => {
            // Displaced from the foreground; tell the user where it went.
            job.is_in_background = true;
            job.print();
        }
        _ => {}
    }
}

// ── Waiting and reaping ───────────────────────────────────────────────────

/// Blocking wait on one job's process group (WUNTRACED, restarting on
/// EINTR) until the job is no longer running. Also the synchronous wait
/// used for every job in batch mode.
pub fn wait_for_job(shell: &mut Shell, job_id: usize) {
    loop {
        let Some(job) = shell.jobs.get(job_id) else {
            return;
        };
        if job.status != JobStatus::Running {
            break;
        }
        let pgid = job.pgid;

        match wait_group(
            Pid::from_raw(-pgid.as_raw()),
            WaitPidFlag::WUNTRACED,
            shell.rusage,
        ) {
            Ok((status, usage)) => apply_wait_status(shell, status, usage),
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => {
                if let Some(job) = shell.jobs.get_mut(job_id) {
                    job.finish_lost_children();
                }
                break;
            }
            Err(e) => {
                debug!("waitpid on group {} failed: {}", pgid, e);
                break;
            }
        }
    }
}

/// Non-blocking reap, called before the prompt and right after each line is
/// read. This is the only place background jobs make observable progress;
/// it updates states but never prints or removes jobs — `jobs` does the
/// reporting.
pub fn update_jobs(shell: &mut Shell) {
    loop {
        match wait_group(
            Pid::from_raw(-1),
            WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED,
            shell.rusage,
        ) {
            Ok((WaitStatus::StillAlive, _)) => break,
            Ok((status, usage)) => apply_wait_status(shell, status, usage),
            Err(Errno::EINTR) => continue,
            Err(_) => break,
        }
    }
}

/// Route one wait result to the job owning the reaped pid and re-derive its
/// status. Emits the resource report when `-t` is active and this reap
/// finished the job.
fn apply_wait_status(shell: &mut Shell, status: WaitStatus, usage: Option<libc::rusage>) {
    let (pid, state) = match status {
        WaitStatus::Exited(pid, code) => (pid, ProcessState::Exited(code)),
        WaitStatus::Signaled(pid, sig, _) => (pid, ProcessState::Signaled(sig as i32)),
        WaitStatus::Stopped(pid, _) => (pid, ProcessState::Stopped),
        WaitStatus::Continued(pid) => (pid, ProcessState::Running),
        _ => return,
    };
    debug!("reaped pid {}: {:?}", pid, state);

    let rusage_enabled = shell.rusage;
    if let Some(job) = shell.jobs.find_by_pid_mut(pid) {
        let was_terminal = job.status.is_terminal();
        job.mark_pid(pid, state);
        if rusage_enabled && !was_terminal && job.status.is_terminal() {
            if let Some(ru) = usage {
                report_times(job, &ru);
            }
        }
    } else {
        // Every child should be accounted for in the table.
        debug!("reaped pid {} with no tracked job", pid);
    }
}

/// `waitpid`, or `wait4` when resource accounting is on — nix has no safe
/// wrapper for the latter.
fn wait_group(
    pid: Pid,
    flags: WaitPidFlag,
    want_rusage: bool,
) -> nix::Result<(WaitStatus, Option<libc::rusage>)> {
    if !want_rusage {
        return waitpid(pid, Some(flags)).map(|status| (status, None));
    }

    let mut status: libc::c_int = 0;
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let reaped = unsafe { libc::wait4(pid.as_raw(), &mut status, flags.bits(), &mut usage) };
    if reaped < 0 {
        return Err(Errno::last());
    }
    let wait_status = WaitStatus::from_raw(Pid::from_raw(reaped), status)?;
    Ok((wait_status, Some(usage)))
}

// ── Terminal handling ─────────────────────────────────────────────────────

/// Take the terminal back after a foreground job returns: remember the
/// attributes the child left behind (restored on `fg`), make the shell the
/// foreground group again, and reinstate the startup attributes.
fn reclaim_terminal(shell: &mut Shell, job_id: usize) {
    if !shell.interactive {
        return;
    }
    if let Some(job) = shell.jobs.get_mut(job_id) {
        job.saved_termios = tcgetattr(io::stdin()).ok();
    }
    let _ = tcsetpgrp(io::stdin(), shell.shell_pgid);
    if let Some(termios) = &shell.shell_termios {
        let _ = tcsetattr(io::stdin(), SetArg::TCSADRAIN, termios);
    }
}

// ── Resource accounting (-t) ──────────────────────────────────────────────

/// `TIMES: real=S.Us user=S.Us sys=S.Us` on stderr when a job completes.
fn report_times(job: &Job, usage: &libc::rusage) {
    let real = job.started_at.elapsed();
    eprintln!(
        "TIMES: real={}.{:06}s user={}.{:06}s sys={}.{:06}s",
        real.as_secs(),
        real.subsec_micros(),
        usage.ru_utime.tv_sec,
        usage.ru_utime.tv_usec,
        usage.ru_stime.tv_sec,
        usage.ru_stime.tv_usec,
    );
}
