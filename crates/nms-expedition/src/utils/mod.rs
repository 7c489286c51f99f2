use crate::errors::CliError;
use miette::Result;
use nms_expedition_core::{ErrorResponse, Response};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub mod config;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\x1b\\[[0-9;]*m").expect("Failed to compile ANSI regex"));

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Number of characters a string occupies on screen, ignoring color codes.
pub fn visible_len(s: &str) -> usize {
    ANSI_ESCAPE.replace_all(s, "").chars().count()
}

/// Prints the provided lines inside an ASCII box
pub fn print_ansi_boxed_lines(lines: &[String]) {
    let width = lines
        .iter()
        .map(|s| visible_len(s.as_str()))
        .max()
        .unwrap_or(0);

    let border = "-".repeat(width + 4);
    println_pad!("{}", border);
    for line in lines {
        let pad = width - visible_len(line.as_str());
        println_pad!("| {}{} |", line, " ".repeat(pad));
    }
    println_pad!("{}", border);
}

/// Prints `result` as a `{ok, value|error}` JSON document on stdout.
///
/// Errors are only reported through the JSON document; the returned
/// [`CliError::Reported`] just sets the exit code.
pub fn print_json<T, E>(result: std::result::Result<T, E>) -> Result<()>
where
    T: Serialize,
    E: Into<ErrorResponse>,
{
    let response = Response::from(result);
    let failed = !response.is_ok();
    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| miette::miette!("Failed to serialize response: {}", e))?;
    println!("{}", json);

    if failed {
        return Err(CliError::Reported.into());
    }
    Ok(())
}
