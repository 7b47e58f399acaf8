//! ASCII (XSB) level parser
//!
//! Accepts the usual Sokoban character set:
//! space = empty, `#` = wall, `@` = player, `.` = target, `$` = box,
//! `*` = box on target, `+` = player on target. Short lines are padded with
//! empty cells up to the widest line.

use std::fmt;
use std::path::Path;

use crate::board::{Board, Cell, MAX_SIZE};

/// Parse error with location information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 0-based row of the offending character (0 for whole-input errors)
    pub row: usize,
    pub column: Option<usize>,
    pub message: String,
    pub line_content: String,
}

impl ParseError {
    pub fn new(row: usize, message: impl Into<String>, line_content: impl Into<String>) -> Self {
        Self {
            row,
            column: None,
            message: message.into(),
            line_content: line_content.into(),
        }
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = self.column {
            write!(
                f,
                "row {}, column {}: {}\n  | {}\n  | {}^",
                self.row,
                col,
                self.message,
                self.line_content,
                " ".repeat(col)
            )
        } else {
            write!(f, "row {}: {}", self.row, self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// Map one level character to its cell flags
pub fn parse_cell(c: char) -> Option<Cell> {
    match c {
        ' ' => Some(Cell::EMPTY),
        '#' => Some(Cell::WALL),
        '@' => Some(Cell::PLAYER),
        '.' => Some(Cell::TARGET),
        '$' => Some(Cell::BOX),
        '*' => Some(Cell::BOX | Cell::TARGET),
        '+' => Some(Cell::PLAYER | Cell::TARGET),
        _ => None,
    }
}

/// Parse a level file into a board
pub fn parse_board_file(path: &Path) -> Result<Board, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ParseError::new(
            0,
            format!("failed to read file: {}", e),
            path.display().to_string(),
        )
    })?;

    parse_board(&content)
}

/// Parse level text into a board
pub fn parse_board(content: &str) -> Result<Board, ParseError> {
    let lines: Vec<&str> = content
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    if lines.is_empty() {
        return Err(ParseError::new(0, "empty level", ""));
    }

    let height = lines.len();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    if height > MAX_SIZE || width > MAX_SIZE {
        return Err(ParseError::new(
            0,
            format!(
                "level is {}x{}, larger than the {}x{} maximum",
                width, height, MAX_SIZE, MAX_SIZE
            ),
            "",
        ));
    }

    let mut board = Board::new(height, width);

    for (y, line) in lines.iter().enumerate() {
        for (x, c) in line.chars().enumerate() {
            let cell = parse_cell(c).ok_or_else(|| {
                ParseError::new(y, format!("invalid character '{}'", c), *line).with_column(x)
            })?;
            board.set(y, x, cell);
        }
    }

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_charset() {
        assert_eq!(parse_cell(' '), Some(Cell::EMPTY));
        assert_eq!(parse_cell('#'), Some(Cell::WALL));
        assert_eq!(parse_cell('*'), Some(Cell::BOX | Cell::TARGET));
        assert_eq!(parse_cell('+'), Some(Cell::PLAYER | Cell::TARGET));
        assert_eq!(parse_cell('-'), None);
    }

    #[test]
    fn test_parse_pads_short_lines() {
        let board = parse_board("####\n#@$.#\n###").unwrap();
        assert_eq!(board.height(), 3);
        assert_eq!(board.width(), 5);
        assert_eq!(board.get(0, 4), Cell::EMPTY);
        assert_eq!(board.get(2, 3), Cell::EMPTY);
        assert!(board.get(1, 4).is_wall());
    }

    #[test]
    fn test_parse_strips_carriage_returns() {
        let board = parse_board("#####\r\n#@$.#\r\n#####\r\n").unwrap();
        assert_eq!(board.width(), 5);
        assert_eq!(board.box_count(), 1);
    }

    #[test]
    fn test_parse_invalid_character_location() {
        let err = parse_board("#####\n#@$x#\n#####").unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.column, Some(3));
        assert!(err.to_string().contains("invalid character 'x'"));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_board("").is_err());
    }

    #[test]
    fn test_parse_too_large() {
        let line = "#".repeat(MAX_SIZE + 1);
        assert!(parse_board(&line).is_err());
    }
}
