use crate::builtins::registry::CommandInfo;
use crate::engine::{ExecutionResult, Shell};
use crate::parser::expand::expand_component;

/// `echo [arg ...]` — print the arguments separated by single spaces, with
/// `$?` and `$NAME` arguments expanded.
pub const COMMAND_INFO: CommandInfo = CommandInfo {
    name: "echo",
    usage: "echo [arg ...]",
    run,
};

fn run(args: &[&str], shell: &mut Shell) -> (ExecutionResult, i32) {
    let words: Vec<String> = args
        .iter()
        .map(|arg| expand_component(arg, shell.last_exit_code))
        .collect();
    println!("{}", words.join(" "));
    (ExecutionResult::KeepRunning, 0)
}
