//! Map-file parsing.
//!
//! Format:
//! - line 1: free-form title (kept but unused)
//! - lines 2-5: `MaxSteps=<n>`, `NumShells=<n>`, `Rows=<n>`, `Cols=<n>`
//! - remaining lines: the grid (`#` wall, `@` mine, `1`/`2` tanks, space
//!   empty)
//!
//! Malformed grid content is recoverable: short lines are padded, long
//! lines truncated, missing lines filled with empty rows, and unknown
//! characters replaced by spaces. Each repair produces a warning the caller
//! writes to `input_errors.txt`. Bad headers are fatal.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::game::BoardView;

/// A parsed map.
#[derive(Debug, Clone)]
pub struct MapData {
    /// The title line, verbatim.
    pub title: String,
    /// Step limit for a match on this map.
    pub max_steps: u32,
    /// Initial shells per tank.
    pub num_shells: u32,
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
    /// Normalized grid, `rows` entries of exactly `cols` characters.
    pub grid: Vec<Vec<char>>,
}

impl MapData {
    /// The initial board snapshot for this map.
    #[must_use]
    pub fn view(&self) -> BoardView {
        BoardView::from_grid(&self.grid)
    }
}

/// Fatal map-parsing error.
#[derive(Debug, Clone)]
pub enum InputError {
    /// The file could not be read.
    Io(String),
    /// The title line is missing.
    MissingTitle,
    /// A header line is missing or malformed.
    Header {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Io(e) => write!(f, "cannot read map file: {e}"),
            InputError::MissingTitle => write!(f, "invalid map: missing title line"),
            InputError::Header { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl std::error::Error for InputError {}

/// Read and parse a map file.
///
/// Returns the map plus recoverable warnings.
///
/// # Errors
///
/// Returns [`InputError`] on I/O failure or a bad header.
pub fn read_map_file(path: &Path) -> Result<(MapData, Vec<String>), InputError> {
    let text = fs::read_to_string(path)
        .map_err(|e| InputError::Io(format!("{}: {e}", path.display())))?;
    parse_map(&text)
}

/// Parse map text.
///
/// # Errors
///
/// Returns [`InputError`] when the title or a header is missing or invalid.
pub fn parse_map(text: &str) -> Result<(MapData, Vec<String>), InputError> {
    let mut lines = text.lines();
    let title = lines.next().ok_or(InputError::MissingTitle)?.to_string();

    let max_steps = parse_header(lines.next(), "MaxSteps", 2)?;
    if max_steps == 0 {
        return Err(InputError::Header {
            line: 2,
            message: "invalid MaxSteps value, must be > 0".to_string(),
        });
    }
    let num_shells = parse_header(lines.next(), "NumShells", 3)?;
    let rows = parse_header(lines.next(), "Rows", 4)?;
    if rows == 0 {
        return Err(InputError::Header {
            line: 4,
            message: "invalid Rows value, must be > 0".to_string(),
        });
    }
    let cols = parse_header(lines.next(), "Cols", 5)?;
    if cols == 0 {
        return Err(InputError::Header {
            line: 5,
            message: "invalid Cols value, must be > 0".to_string(),
        });
    }
    let rows = rows as usize;
    let cols = cols as usize;

    let mut warnings = Vec::new();
    let mut grid = vec![vec![' '; cols]; rows];
    let mut row = 0;
    for line in lines.by_ref() {
        if row >= rows {
            warnings.push("Extra lines beyond declared Rows ignored.".to_string());
            break;
        }
        let line_no = row + 6;
        let mut chars: Vec<char> = line.trim_end_matches('\r').chars().collect();
        if chars.len() < cols {
            warnings.push(format!("Line {line_no} is too short, padding with spaces."));
            chars.resize(cols, ' ');
        } else if chars.len() > cols {
            warnings.push(format!("Line {line_no} is too long, trimming."));
            chars.truncate(cols);
        }
        for (col, ch) in chars.into_iter().enumerate() {
            match ch {
                '#' | '@' | '1' | '2' => grid[row][col] = ch,
                ch if ch.is_whitespace() => {}
                ch => {
                    warnings.push(format!(
                        "Line {line_no}: illegal character '{ch}' ignored."
                    ));
                }
            }
        }
        row += 1;
    }
    for missing_row in row..rows {
        warnings.push(format!(
            "Line {}: missing, padding with spaces.",
            missing_row + 6
        ));
    }

    Ok((
        MapData {
            title,
            max_steps,
            num_shells,
            rows,
            cols,
            grid,
        },
        warnings,
    ))
}

/// Parse a `Key=value` header line into a non-negative integer.
fn parse_header(line: Option<&str>, key: &str, line_no: usize) -> Result<u32, InputError> {
    let line = line.ok_or_else(|| InputError::Header {
        line: line_no,
        message: format!("expected header '{key}=...', found end of file"),
    })?;
    let trimmed = line.trim();
    let Some((k, v)) = trimmed.split_once('=') else {
        return Err(InputError::Header {
            line: line_no,
            message: format!("expected header '{key}=...', found '{trimmed}'"),
        });
    };
    if k.trim() != key {
        return Err(InputError::Header {
            line: line_no,
            message: format!("expected key '{key}', found '{}'", k.trim()),
        });
    }
    v.trim().parse::<u32>().map_err(|_| InputError::Header {
        line: line_no,
        message: format!("invalid value '{}' for key '{key}'", v.trim()),
    })
}
