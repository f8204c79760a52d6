use std::fmt;
use std::time::Instant;

use log::debug;
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::sys::termios::Termios;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

use crate::parser::UserInput;

// ── Per-process state ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Stopped,
    Exited(i32),
    Signaled(i32),
}

impl ProcessState {
    pub fn is_done(&self) -> bool {
        matches!(self, ProcessState::Exited(_) | ProcessState::Signaled(_))
    }
}

/// One child of a job. A pipeline has one entry per command, all sharing the
/// job's process group.
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
}

// ── Job status ────────────────────────────────────────────────────────────

/// The lifecycle of a job. `New` and `Canceled` are transient; `Exited` and
/// `Aborted` are terminal and carry the exit code / terminating signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    New,
    Running,
    Suspended,
    Exited(i32),
    Aborted(i32),
    Canceled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Exited(_) | JobStatus::Aborted(_))
    }

    /// Running or suspended: a live process group exists for this job.
    pub fn is_live(&self) -> bool {
        matches!(self, JobStatus::Running | JobStatus::Suspended)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::New => write!(f, "new"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Suspended => write!(f, "suspended"),
            JobStatus::Exited(code) => write!(f, "exited {}", code),
            JobStatus::Aborted(sig) => write!(f, "aborted {}", sig),
            JobStatus::Canceled => write!(f, "canceled"),
        }
    }
}

// ── Job ───────────────────────────────────────────────────────────────────

/// One submitted command line being tracked by the shell.
pub struct Job {
    /// Small positive id, assigned on insertion into the table.
    pub id: usize,
    pub input: UserInput,
    /// Process group of the children; 0 until the first child is spawned.
    pub pgid: Pid,
    pub processes: Vec<Process>,
    pub status: JobStatus,
    /// False only while this job owns the terminal's foreground slot.
    pub is_in_background: bool,
    /// Terminal attributes captured when the job was last displaced from the
    /// foreground; restored on `fg`.
    pub saved_termios: Option<Termios>,
    pub started_at: Instant,
}

impl Job {
    pub fn new(input: UserInput) -> Self {
        let is_in_background = input.is_background;
        Job {
            id: 0,
            input,
            pgid: Pid::from_raw(0),
            processes: Vec::new(),
            status: JobStatus::New,
            is_in_background,
            saved_termios: None,
            started_at: Instant::now(),
        }
    }

    /// Record the wait result for one child and re-derive the job status.
    /// Returns false when the pid belongs to no child of this job.
    pub fn mark_pid(&mut self, pid: Pid, state: ProcessState) -> bool {
        for process in &mut self.processes {
            if process.pid == pid {
                debug!("job {}: {} (pid {}) is now {:?}", self.id, process.name, pid, state);
                process.state = state;
                self.refresh_status();
                return true;
            }
        }
        false
    }

    /// Derive the job status from its children. The final command of the
    /// pipeline decides the exit code. `Canceled` sticks until every child
    /// has actually been reaped.
    pub fn refresh_status(&mut self) {
        if self.processes.is_empty() {
            return;
        }

        if self.processes.iter().all(|p| p.state.is_done()) {
            self.status = match self.processes.last().unwrap().state {
                ProcessState::Signaled(sig) => JobStatus::Aborted(sig),
                ProcessState::Exited(code) => JobStatus::Exited(code),
                _ => unreachable!(),
            };
            return;
        }

        if self.status == JobStatus::Canceled {
            return;
        }

        let any_stopped = self.processes.iter().any(|p| p.state == ProcessState::Stopped);
        let any_running = self.processes.iter().any(|p| p.state == ProcessState::Running);
        self.status = if any_stopped && !any_running {
            JobStatus::Suspended
        } else {
            JobStatus::Running
        };
    }

    /// Count every unreaped child as exited. Used when the kernel reports
    /// ECHILD and there is nothing left to collect.
    pub fn finish_lost_children(&mut self) {
        for process in &mut self.processes {
            if !process.state.is_done() {
                process.state = ProcessState::Exited(0);
            }
        }
        self.refresh_status();
    }

    /// `[<id>] (<status>) <raw input>`; terminal statuses carry their code.
    pub fn print(&self) {
        println!("[{}] ({}) {}", self.id, self.status, self.input.raw);
    }
}

// ── Job table ─────────────────────────────────────────────────────────────

/// Insertion-ordered list of jobs. A handful of live jobs at most, so
/// linear scans are fine.
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        JobTable { jobs: Vec::new() }
    }

    /// Tail-insert; the new id is one past the current tail's (1 when the
    /// table is empty). Returns the assigned id.
    pub fn insert(&mut self, mut job: Job) -> usize {
        let id = self.jobs.last().map_or(1, |tail| tail.id + 1);
        job.id = id;
        debug!("job {} registered: {:?}", id, job.input.raw);
        self.jobs.push(job);
        id
    }

    pub fn remove(&mut self, id: usize) {
        self.jobs.retain(|j| j.id != id);
    }

    pub fn get(&self, id: usize) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.id == id)
    }

    /// Find the job owning `pid` — any member of the pipeline counts, not
    /// just the group leader.
    pub fn find_by_pid_mut(&mut self, pid: Pid) -> Option<&mut Job> {
        self.jobs
            .iter_mut()
            .find(|j| j.processes.iter().any(|p| p.pid == pid))
    }

    /// Print every job, then erase the ones that have reached a terminal
    /// state. This listing is the only place finished jobs are reported.
    pub fn list(&mut self) {
        for job in &self.jobs {
            job.print();
        }
        self.jobs.retain(|j| !j.status.is_terminal());
    }

    /// Shell teardown, part one: SIGCONT then SIGTERM to every live group.
    /// SIGCONT goes first — a stopped group cannot act on SIGTERM until it
    /// is continued.
    pub fn cancel_all(&mut self) {
        for job in &mut self.jobs {
            if job.status.is_live() {
                let _ = killpg(job.pgid, Signal::SIGCONT);
                let _ = killpg(job.pgid, Signal::SIGTERM);
                job.status = JobStatus::Canceled;
            }
        }
    }

    /// Shell teardown, part two: block until every canceled group is fully
    /// reaped so no children outlive the shell unreaped.
    pub fn wait_all(&mut self) {
        for job in &mut self.jobs {
            if job.status.is_terminal() || job.pgid.as_raw() == 0 {
                continue;
            }
            loop {
                match waitpid(Pid::from_raw(-job.pgid.as_raw()), None) {
                    Ok(WaitStatus::Exited(pid, code)) => {
                        job.mark_pid(pid, ProcessState::Exited(code));
                    }
                    Ok(WaitStatus::Signaled(pid, sig, _)) => {
                        job.mark_pid(pid, ProcessState::Signaled(sig as i32));
                    }
                    Ok(_) => continue,
                    Err(Errno::EINTR) => continue,
                    Err(_) => break,
                }
            }
            job.finish_lost_children();
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn job(line: &str) -> Job {
        Job::new(UserInput {
            raw: line.to_string(),
            commands: Vec::new(),
            is_background: false,
        })
    }

    fn job_with_states(states: &[ProcessState]) -> Job {
        let mut j = job("pipeline");
        j.processes = states
            .iter()
            .enumerate()
            .map(|(i, &state)| Process {
                pid: Pid::from_raw(100 + i as i32),
                name: format!("cmd{}", i),
                state,
            })
            .collect();
        j.refresh_status();
        j
    }

    // ── id assignment ─────────────────────────────────────────────────────

    #[test]
    fn test_ids_increase_from_one() {
        let mut table = JobTable::new();
        assert_eq!(table.insert(job("a")), 1);
        assert_eq!(table.insert(job("b")), 2);
        assert_eq!(table.insert(job("c")), 3);
    }

    #[test]
    fn test_id_follows_tail_after_removal() {
        let mut table = JobTable::new();
        table.insert(job("a"));
        table.insert(job("b"));
        table.remove(1);
        // the tail is job 2, so the next id is 3 even though 1 is free
        assert_eq!(table.insert(job("c")), 3);
    }

    #[test]
    fn test_ids_restart_after_drain() {
        let mut table = JobTable::new();
        table.insert(job("a"));
        table.insert(job("b"));
        table.remove(1);
        table.remove(2);
        assert_eq!(table.insert(job("c")), 1);
    }

    #[test]
    fn test_lookup_by_id() {
        let mut table = JobTable::new();
        table.insert(job("a"));
        table.insert(job("b"));
        assert_eq!(table.get(2).unwrap().input.raw, "b");
        assert!(table.get(7).is_none());
    }

    #[test]
    fn test_find_by_pid_matches_any_member() {
        let mut table = JobTable::new();
        let id = table.insert(job_with_states(&[
            ProcessState::Running,
            ProcessState::Running,
        ]));
        // pid 101 is the second member, not the group leader
        let found = table.find_by_pid_mut(Pid::from_raw(101)).unwrap();
        assert_eq!(found.id, id);
        assert!(table.find_by_pid_mut(Pid::from_raw(999)).is_none());
    }

    // ── status derivation ─────────────────────────────────────────────────

    #[test]
    fn test_status_running_while_any_child_runs() {
        let j = job_with_states(&[ProcessState::Exited(0), ProcessState::Running]);
        assert_eq!(j.status, JobStatus::Running);
    }

    #[test]
    fn test_status_suspended_when_stopped() {
        let j = job_with_states(&[ProcessState::Exited(0), ProcessState::Stopped]);
        assert_eq!(j.status, JobStatus::Suspended);
    }

    #[test]
    fn test_status_exit_code_from_last_command() {
        let j = job_with_states(&[ProcessState::Exited(1), ProcessState::Exited(0)]);
        assert_eq!(j.status, JobStatus::Exited(0));
    }

    #[test]
    fn test_status_aborted_carries_signal() {
        let j = job_with_states(&[ProcessState::Exited(0), ProcessState::Signaled(15)]);
        assert_eq!(j.status, JobStatus::Aborted(15));
    }

    #[test]
    fn test_continued_child_goes_back_to_running() {
        let mut j = job_with_states(&[ProcessState::Stopped]);
        assert_eq!(j.status, JobStatus::Suspended);
        assert!(j.mark_pid(Pid::from_raw(100), ProcessState::Running));
        assert_eq!(j.status, JobStatus::Running);
    }

    #[test]
    fn test_mark_unknown_pid_is_rejected() {
        let mut j = job_with_states(&[ProcessState::Running]);
        assert!(!j.mark_pid(Pid::from_raw(4242), ProcessState::Exited(0)));
        assert_eq!(j.status, JobStatus::Running);
    }

    #[test]
    fn test_refresh_keeps_new_without_children() {
        let mut j = job("not yet spawned");
        j.refresh_status();
        assert_eq!(j.status, JobStatus::New);
    }

    // ── listing ───────────────────────────────────────────────────────────

    #[test]
    fn test_list_drains_terminal_jobs() {
        let mut table = JobTable::new();
        table.insert(job_with_states(&[ProcessState::Running]));
        table.insert(job_with_states(&[ProcessState::Exited(0)]));
        table.insert(job_with_states(&[ProcessState::Signaled(9)]));
        table.list();
        assert_eq!(table.get(1).unwrap().status, JobStatus::Running);
        assert!(table.get(2).is_none());
        assert!(table.get(3).is_none());
    }

    // ── display ───────────────────────────────────────────────────────────

    #[test]
    fn test_status_display() {
        assert_eq!(JobStatus::Running.to_string(), "running");
        assert_eq!(JobStatus::Suspended.to_string(), "suspended");
        assert_eq!(JobStatus::Exited(0).to_string(), "exited 0");
        assert_eq!(JobStatus::Aborted(15).to_string(), "aborted 15");
        assert_eq!(JobStatus::Canceled.to_string(), "canceled");
    }
}
