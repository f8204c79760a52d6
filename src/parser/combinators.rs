use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{char, multispace0},
    sequence::preceded,
    IResult,
    Parser,
};

use super::ast::Command;

// ── Low-level nom parsers ──────────────────────────────────────────────────

/// A single shell word. Words end at whitespace, a pipe, a redirect operator
/// or the background sentinel.
pub fn parse_word(input: &str) -> IResult<&str, String> {
    let (input, content) = is_not(" \t\r\n|><&")(input)?;
    Ok((input, content.to_string()))
}

// ── Redirect parsing ──────────────────────────────────────────────────────

pub(super) enum Redirect {
    Stdin(String),
    Stdout { path: String, append: bool },
    Stderr(String),
}

/// Parse a redirect operator (`>>`, `2>`, `>`, or `<`) followed by a path.
/// The path may be joined to the operator (`>out`) or separated (`> out`).
fn parse_redirect(input: &str) -> IResult<&str, Redirect> {
    let (input, _) = multispace0(input)?;
    // Two-character operators must come before the single-character ones.
    let (input, op) = alt((tag(">>"), tag("2>"), tag(">"), tag("<"))).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, path) = parse_word(input)?;

    let redirect = match op {
        ">>" => Redirect::Stdout { path, append: true },
        "2>" => Redirect::Stderr(path),
        ">" => Redirect::Stdout { path, append: false },
        _ => Redirect::Stdin(path),
    };
    Ok((input, redirect))
}

// ── Single command (with redirects) ───────────────────────────────────────

/// Parse one command of a pipeline: words, redirects, and `&` markers
/// interleaved in any order, up to a `|` or end-of-input.
///
/// Returns the command plus whether a background sentinel was seen.
pub fn parse_single_command(input: &str) -> IResult<&str, (Command, bool)> {
    let (start, _) = multispace0(input)?;
    let mut rest = start;

    let mut cmd = Command::default();
    let mut background = false;

    loop {
        // Redirects first: they start with characters a word cannot contain.
        if let Ok((after, redirect)) = parse_redirect(rest) {
            match redirect {
                Redirect::Stdin(path) => cmd.redirect_stdin = Some(path),
                Redirect::Stdout { path, append } => {
                    cmd.redirect_stdout = Some(path);
                    cmd.append_stdout = append;
                }
                Redirect::Stderr(path) => cmd.redirect_stderr = Some(path),
            }
            rest = after;
            continue;
        }

        // A `&` anywhere marks the whole line as a background job.
        let amp: IResult<&str, char> = preceded(multispace0, char('&')).parse(rest);
        if let Ok((after, _)) = amp {
            background = true;
            rest = after;
            continue;
        }

        if let Ok((after, word)) = preceded(multispace0, parse_word).parse(rest) {
            cmd.components.push(word);
            rest = after;
            continue;
        }

        // Nothing left to consume for this command.
        break;
    }

    cmd.raw = start[..start.len() - rest.len()].trim().to_string();
    let (rest, _) = multispace0(rest)?;

    Ok((rest, (cmd, background)))
}

// ── Pipeline expression (cmd | cmd | …) ──────────────────────────────────

/// Parse a pipeline: `command (| command)*`. The background flags of the
/// individual commands are folded into one line-level flag.
pub fn parse_pipeline(input: &str) -> IResult<&str, (Vec<Command>, bool)> {
    let (mut rest, (first, mut background)) = parse_single_command(input)?;
    let mut commands = vec![first];

    loop {
        let trimmed = rest.trim_start();
        if let Some(after_pipe) = trimmed.strip_prefix('|') {
            let (after_cmd, (cmd, bg)) = parse_single_command(after_pipe)?;
            background |= bg;
            commands.push(cmd);
            rest = after_cmd;
        } else {
            break;
        }
    }

    Ok((rest, (commands, background)))
}
