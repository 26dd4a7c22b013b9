//! Line-oriented G-code parser

use std::fmt;

use log::debug;

use crate::{Axis, GCommand};

/// Error type for G-code parsing
#[derive(Debug, Clone, PartialEq)]
pub enum GCodeError {
    /// A parameter word carried an unparseable number
    BadWord {
        line: usize,
        word: String,
    },
}

impl fmt::Display for GCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GCodeError::BadWord { line, word } => {
                write!(f, "line {}: bad parameter word {:?}", line, word)
            }
        }
    }
}

impl std::error::Error for GCodeError {}

/// Parse a full G-code text
pub fn parse_str(text: &str) -> Result<Vec<GCommand>, GCodeError> {
    parse_lines(text.lines())
}

/// Parse an iterator of G-code lines
///
/// Comments (`;` to end of line) are stripped; blank lines and lines not
/// starting with `G` are skipped.
pub fn parse_lines<'a, I>(lines: I) -> Result<Vec<GCommand>, GCodeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut commands = Vec::new();

    for (line_no, raw) in lines.into_iter().enumerate() {
        let line = raw.split(';').next().unwrap_or("").trim();
        if line.is_empty() || !line.starts_with('G') {
            continue;
        }

        let mut words = line.split_whitespace();
        let cmd = words.next().expect("line is non-empty");
        let args: Vec<&str> = words.collect();

        let parsed = match cmd {
            "G0" => Some(parse_linear(true, &args, line_no)?),
            "G1" => Some(parse_linear(false, &args, line_no)?),
            "G28" => Some(parse_home(&args)),
            "G90" => Some(GCommand::Absolute),
            "G91" => Some(GCommand::Relative),
            "G92" => Some(parse_set_position(&args, line_no)?),
            other => {
                debug!("line {}: skipping unrecognized command {}", line_no + 1, other);
                None
            }
        };
        if let Some(command) = parsed {
            commands.push(command);
        }
    }

    Ok(commands)
}

fn parse_linear(rapid: bool, args: &[&str], line_no: usize) -> Result<GCommand, GCodeError> {
    let mut x = None;
    let mut y = None;
    let mut z = None;
    let mut e = None;
    let mut f = None;

    for word in args {
        let value = word_value(word, line_no);
        match word.chars().next() {
            Some('X') => x = Some(value?),
            Some('Y') => y = Some(value?),
            Some('Z') => z = Some(value?),
            Some('E') => e = Some(value?),
            Some('F') => f = Some(value?),
            _ => {}
        }
    }

    Ok(GCommand::Linear { rapid, x, y, z, e, f })
}

fn parse_home(args: &[&str]) -> GCommand {
    let mut axes = Vec::new();
    for word in args {
        match word.chars().next() {
            Some('X') => axes.push(Axis::X),
            Some('Y') => axes.push(Axis::Y),
            Some('Z') => axes.push(Axis::Z),
            _ => {}
        }
    }
    GCommand::Home { axes }
}

fn parse_set_position(args: &[&str], line_no: usize) -> Result<GCommand, GCodeError> {
    let mut x = None;
    let mut y = None;
    let mut z = None;
    let mut e = None;

    for word in args {
        let value = word_value(word, line_no);
        match word.chars().next() {
            Some('X') => x = Some(value?),
            Some('Y') => y = Some(value?),
            Some('Z') => z = Some(value?),
            Some('E') => e = Some(value?),
            _ => {}
        }
    }

    Ok(GCommand::SetPosition { x, y, z, e })
}

fn word_value(word: &str, line_no: usize) -> Result<f64, GCodeError> {
    word[1..].parse::<f64>().map_err(|_| GCodeError::BadWord {
        line: line_no + 1,
        word: (*word).to_string(),
    })
}
