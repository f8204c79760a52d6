use std::io;
use std::os::unix::process::CommandExt;
use std::process::{self, Stdio};

use log::debug;
use nix::unistd::{getpid, setpgid, tcsetpgrp, Pid};

use crate::parser::expand::expand_argv;
use crate::parser::UserInput;
use crate::signals;

use super::job_control;
use super::jobs::{Job, JobStatus, Process, ProcessState};
use super::redirect::{open_stderr_redirect, open_stdin_redirect, open_stdout_redirect};
use super::state::Shell;

// ── Job launch ────────────────────────────────────────────────────────────

/// Launch a parsed command line as a job: insert it into the table, spawn
/// the pipeline, then wait for it or leave it in the background depending on
/// the mode.
pub fn exec_job(input: UserInput, shell: &mut Shell) {
    let in_background = input.is_background && shell.interactive;
    let job_id = shell.jobs.insert(Job::new(input));

    if let Err(message) = spawn_pipeline(job_id, shell) {
        if !message.is_empty() {
            eprintln!("{}", message);
        }
        shell.jobs.remove(job_id);
        return;
    }

    if !shell.interactive {
        // Batch mode: every job is waited for synchronously and `&` is
        // ignored.
        job_control::wait_for_job(shell, job_id);
        if let Some(job) = shell.jobs.get(job_id) {
            if let JobStatus::Exited(code) = job.status {
                shell.last_exit_code = code;
            }
        }
    } else if in_background {
        debug!("job {} continues in the background", job_id);
    } else {
        job_control::foreground_wait(shell, job_id);
    }
}

/// Fork every command of the pipeline, wiring pipes and redirections.
///
/// The first child's pid becomes the process group for the whole job; both
/// the child (in `pre_exec`) and the parent (right after `spawn`) perform
/// the `setpgid`, closing the race between them. A foreground job's first
/// child also takes the terminal before exec; the shell side only touches
/// `tcsetpgrp` when reclaiming or on `fg`.
fn spawn_pipeline(job_id: usize, shell: &mut Shell) -> Result<(), String> {
    let job = shell.jobs.get(job_id).expect("job was just inserted");
    let commands = job.input.commands.clone();
    let interactive = shell.interactive;
    let foreground = interactive && !job.input.is_background;
    let last_exit_code = shell.last_exit_code;

    // Empty commands (e.g. between two pipes) are skipped rather than
    // rejected.
    let live: Vec<_> = commands.iter().filter(|c| !c.components.is_empty()).collect();
    if live.is_empty() {
        return Err(String::new());
    }
    let last_idx = live.len() - 1;

    let mut children: Vec<process::Child> = Vec::with_capacity(live.len());
    let mut processes: Vec<Process> = Vec::with_capacity(live.len());
    let mut prev_stdout: Option<process::ChildStdout> = None;
    let mut pgid: i32 = 0;

    for (i, cmd) in live.iter().enumerate() {
        debug!("running: {}", cmd.raw);
        let program = cmd.program().expect("filtered above").to_string();

        // argv[0] is never expanded; the tail gets `$` expansion and glob.
        let argv = match expand_argv(&cmd.components[1..], last_exit_code) {
            Ok(argv) => argv,
            Err(e) => {
                abort_spawn(&mut children);
                return Err(format!("smash: {}", e));
            }
        };

        let mut command = process::Command::new(&program);
        command.args(&argv);

        // Stdin: an explicit `<` wins over the pipe from the predecessor.
        if let Some(path) = &cmd.redirect_stdin {
            match open_stdin_redirect(path) {
                Ok(file) => {
                    command.stdin(Stdio::from(file));
                }
                Err(e) => {
                    abort_spawn(&mut children);
                    return Err(e);
                }
            }
        } else if i > 0 {
            match prev_stdout.take() {
                Some(pipe) => {
                    command.stdin(Stdio::from(pipe));
                }
                // The predecessor sent its stdout to a file instead; this
                // command reads EOF, as if the pipe's write end had closed.
                None => {
                    command.stdin(Stdio::null());
                }
            }
        }

        // Stdout: an explicit `>`/`>>` wins over the pipe to the successor.
        if let Some(path) = &cmd.redirect_stdout {
            match open_stdout_redirect(path, cmd.append_stdout) {
                Ok(file) => {
                    command.stdout(Stdio::from(file));
                }
                Err(e) => {
                    abort_spawn(&mut children);
                    return Err(e);
                }
            }
        } else if i < last_idx {
            command.stdout(Stdio::piped());
        }

        if let Some(path) = &cmd.redirect_stderr {
            match open_stderr_redirect(path) {
                Ok(file) => {
                    command.stderr(Stdio::from(file));
                }
                Err(e) => {
                    abort_spawn(&mut children);
                    return Err(e);
                }
            }
        }

        let target_pgid = pgid;
        unsafe {
            command.pre_exec(move || {
                let pid = getpid();
                let group = if target_pgid == 0 {
                    pid
                } else {
                    Pid::from_raw(target_pgid)
                };
                let _ = setpgid(pid, group);
                if foreground && target_pgid == 0 {
                    let _ = tcsetpgrp(std::io::stdin(), group);
                }
                if interactive {
                    signals::restore_default();
                }
                Ok(())
            });
        }

        match command.spawn() {
            Ok(mut child) => {
                let pid = child.id() as i32;
                if i == 0 {
                    pgid = pid;
                }
                let _ = setpgid(Pid::from_raw(pid), Pid::from_raw(pgid));
                debug!("spawned {} (pid {}) in group {}", program, pid, pgid);

                processes.push(Process {
                    pid: Pid::from_raw(pid),
                    name: program,
                    state: ProcessState::Running,
                });
                prev_stdout = if i < last_idx { child.stdout.take() } else { None };
                children.push(child);
            }
            Err(e) => {
                abort_spawn(&mut children);
                let message = if e.kind() == io::ErrorKind::NotFound {
                    format!("smash: command not found: {}", program)
                } else {
                    format!("smash: {}: {}", program, e)
                };
                return Err(message);
            }
        }
    }

    let job = shell.jobs.get_mut(job_id).expect("job was just inserted");
    job.pgid = Pid::from_raw(pgid);
    job.processes = processes;
    job.status = JobStatus::Running;
    Ok(())
}

/// A member of the pipeline failed to launch: take down whatever was already
/// spawned and reap it, so nothing is left behind for the job table.
fn abort_spawn(children: &mut Vec<process::Child>) {
    for child in children {
        let _ = child.kill();
        let _ = child.wait();
    }
}
