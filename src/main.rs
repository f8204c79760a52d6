mod builtins;
mod engine;
mod parser;
mod signals;

use std::io::{self, BufRead};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use log::{debug, LevelFilter};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use engine::{job_control, ExecutionResult, Shell};

const PROMPT: &str = "smash> ";

struct Options {
    debug: bool,
    rusage: bool,
    batch_file: Option<PathBuf>,
}

fn usage(program: &str) {
    println!("Usage: {} [-d] [-t] [file]", program);
}

fn parse_args() -> Result<Options, ()> {
    let mut options = Options {
        debug: false,
        rusage: false,
        batch_file: None,
    };
    for arg in std::env::args().skip(1) {
        if arg == "-d" {
            options.debug = true;
        } else if arg == "-t" {
            options.rusage = true;
        } else if arg.starts_with('-') {
            return Err(());
        } else if options.batch_file.is_some() {
            return Err(());
        } else {
            options.batch_file = Some(PathBuf::from(arg));
        }
    }
    Ok(options)
}

/// Rebind fd 0 to the batch file so input is read from it exactly as it
/// would be from the terminal.
fn splice_batch_file(path: &Path) -> io::Result<()> {
    let file = std::fs::File::open(path)?;
    nix::unistd::dup2(file.as_raw_fd(), 0).map_err(io::Error::from)?;
    Ok(())
}

fn main() -> ExitCode {
    let program = std::env::args().next().unwrap_or_else(|| "smash".to_string());
    let Ok(options) = parse_args() else {
        usage(&program);
        return ExitCode::FAILURE;
    };

    env_logger::Builder::new()
        .filter_level(if options.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init();

    let batch = options.batch_file.is_some();
    if let Some(path) = &options.batch_file {
        if let Err(e) = splice_batch_file(path) {
            eprintln!("smash: {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let interactive =
        !batch && nix::unistd::isatty(io::stdin().as_raw_fd()).unwrap_or(false);
    let mut shell = Shell::new(interactive, options.rusage);

    if interactive {
        if let Err(e) = signals::setup(&mut shell) {
            eprintln!("smash: terminal setup failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let code = if interactive {
        interactive_loop(&mut shell)
    } else {
        batch_loop(&mut shell)
    };

    // Normal exit path: take down whatever is still running, then reap it
    // all so no child outlives the shell.
    shell.jobs.cancel_all();
    shell.jobs.wait_all();

    ExitCode::from((code & 0xff) as u8)
}

// ── Top-level loops ───────────────────────────────────────────────────────

fn interactive_loop(shell: &mut Shell) -> i32 {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("smash: {}", e);
            return 1;
        }
    };

    loop {
        // Pick up background jobs that changed state since the last prompt.
        job_control::update_jobs(shell);

        match rl.readline(PROMPT) {
            Ok(line) => {
                match process_line(&line, shell) {
                    ExecutionResult::KeepRunning => {}
                    ExecutionResult::Exit(code) => return code,
                }
            }
            // ^C at the prompt: just give the user a fresh line.
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => return shell.last_exit_code,
            Err(e) => {
                eprintln!("smash: {}", e);
                return 1;
            }
        }
    }
}

fn batch_loop(shell: &mut Shell) -> i32 {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        job_control::update_jobs(shell);
        match line {
            Ok(line) => match process_line(&line, shell) {
                ExecutionResult::KeepRunning => {}
                ExecutionResult::Exit(code) => return code,
            },
            Err(e) => {
                eprintln!("smash: {}", e);
                return 1;
            }
        }
    }
    shell.last_exit_code
}

fn process_line(line: &str, shell: &mut Shell) -> ExecutionResult {
    // Catch children that finished while we were reading.
    job_control::update_jobs(shell);

    let line = parser::strip_comment(line);
    if line.is_empty() {
        return ExecutionResult::KeepRunning;
    }
    debug!("input: {:?}", line);

    if let Some(result) = builtins::registry::dispatch(line, shell) {
        return result;
    }

    let Some(input) = parser::parse_input(line) else {
        return ExecutionResult::KeepRunning;
    };
    engine::exec_job(input, shell);
    ExecutionResult::KeepRunning
}
