use std::env;
use std::path::PathBuf;

use crate::builtins::registry::CommandInfo;
use crate::engine::{ExecutionResult, Shell};
use crate::parser::expand::{expand_component, expand_home};

/// `cd [dir]` — change the working directory; DIR defaults to `$HOME`.
pub const COMMAND_INFO_CD: CommandInfo = CommandInfo {
    name: "cd",
    usage: "cd [dir]",
    run: cd_runner,
};

/// `pwd` — print the absolute pathname of the working directory.
pub const COMMAND_INFO_PWD: CommandInfo = CommandInfo {
    name: "pwd",
    usage: "pwd",
    run: pwd_runner,
};

fn cd_runner(args: &[&str], shell: &mut Shell) -> (ExecutionResult, i32) {
    match run(args, shell) {
        Ok(()) => (ExecutionResult::KeepRunning, 0),
        Err(e) => {
            eprintln!("smash: cd: {}", e);
            (ExecutionResult::KeepRunning, 1)
        }
    }
}

/// On failure the working directory is left unchanged.
fn run(args: &[&str], shell: &mut Shell) -> Result<(), String> {
    let target: PathBuf = if args.is_empty() {
        env::var("HOME").map(PathBuf::from).map_err(|_| "HOME not set".to_string())?
    } else {
        let arg = expand_component(args[0], shell.last_exit_code);
        expand_home(&arg)
    };

    env::set_current_dir(&target).map_err(|e| format!("{}: {}", target.display(), e))
}

fn pwd_runner(_args: &[&str], _shell: &mut Shell) -> (ExecutionResult, i32) {
    // current_dir() sizes its buffer against the kernel, so arbitrarily deep
    // paths come back whole.
    match env::current_dir() {
        Ok(path) => {
            println!("{}", path.display());
            (ExecutionResult::KeepRunning, 0)
        }
        Err(e) => {
            eprintln!("smash: pwd: {}", e);
            (ExecutionResult::KeepRunning, 1)
        }
    }
}
