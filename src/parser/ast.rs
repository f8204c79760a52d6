// ── AST types ──────────────────────────────────────────────────────────────

/// One program invocation within a pipeline.
///
/// `components` holds the whitespace-delimited words in order; the head is
/// the program name and the tail is its argument list. Redirections are
/// pulled out of the word stream while parsing so that execution never has
/// to re-discover them among the argv words.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Command {
    /// The substring of the line this command was parsed from (diagnostics).
    pub raw: String,
    pub components: Vec<String>,
    /// `< file` — read stdin from file.
    pub redirect_stdin: Option<String>,
    /// `> file` / `>> file` — write stdout to file.
    pub redirect_stdout: Option<String>,
    /// `2> file` — write stderr to file.
    pub redirect_stderr: Option<String>,
    /// True when the stdout redirect was `>>` (append) rather than `>`.
    pub append_stdout: bool,
}

impl Command {
    /// The program name, if any word was parsed at all.
    pub fn program(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }
}

/// One fully parsed input line: a pipeline of commands plus the background
/// sentinel.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UserInput {
    /// The whole line as the user typed it (shown by `jobs`).
    pub raw: String,
    /// Length > 1 means the commands are connected by pipes.
    pub commands: Vec<Command>,
    /// True iff the line carried a `&` token.
    pub is_background: bool,
}
