//! Formatting of the messages outmask prints to stderr.
//!
//! Colour is only used when the destination is a terminal.

use std::io::{self, Write};

use owo_colors::OwoColorize;

/// Prints an informational message.
pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, use_color: bool) -> io::Result<()> {
    if use_color {
        writeln!(writer, "{}", msg.cyan())
    } else {
        writeln!(writer, "{}", msg)
    }
}

/// Prints a warning message.
pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, use_color: bool) -> io::Result<()> {
    if use_color {
        writeln!(writer, "{} {}", "warning:".yellow().bold(), msg)
    } else {
        writeln!(writer, "warning: {}", msg)
    }
}

/// Prints the one-line redaction summary.
pub fn print_summary<W: Write>(writer: &mut W, redactions: u64, use_color: bool) -> io::Result<()> {
    let line = summary_line(redactions);
    if redactions == 0 {
        print_info_message(writer, &line, use_color)
    } else if use_color {
        writeln!(writer, "{}", line.green().bold())
    } else {
        writeln!(writer, "{}", line)
    }
}

pub fn summary_line(redactions: u64) -> String {
    match redactions {
        0 => "No redactions applied.".to_string(),
        1 => "1 redaction applied.".to_string(),
        n => format!("{} redactions applied.", n),
    }
}
