use std::fs::{File, OpenOptions};

/// Open a file for a stdout redirect. `>` truncates, `>>` appends; both
/// create the file if needed.
pub fn open_stdout_redirect(path: &str, append: bool) -> Result<File, String> {
    let result = if append {
        OpenOptions::new().create(true).append(true).open(path)
    } else {
        File::create(path)
    };
    result.map_err(|e| format!("smash: {}: {}", path, e))
}

/// Open a file for a stderr redirect (`2>` — always truncate).
pub fn open_stderr_redirect(path: &str) -> Result<File, String> {
    File::create(path).map_err(|e| format!("smash: {}: {}", path, e))
}

/// Open a file for a stdin redirect (`<`).
pub fn open_stdin_redirect(path: &str) -> Result<File, String> {
    File::open(path).map_err(|e| format!("smash: {}: {}", path, e))
}
