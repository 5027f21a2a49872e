//! Board files.
//!
//! ```text
//! 3x3
//! 🦄
//! 🦄
//! 🌈
//! ...
//! ```
//!
//! A `ROWSxCOLS` header followed by one card per line in row-major order.
//! Surrounding whitespace is trimmed and blank lines are ignored.

use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::board::Board;
use crate::error::{BoardError, Result};

/// Returns `(rows, cols, rows * cols)`.
fn parse_header(line: &str) -> Result<(usize, usize, usize)> {
    let malformed = || BoardError::Malformed(format!("expected ROWSxCOLS header, got {:?}", line));
    let (rows, cols) = line.split_once('x').ok_or_else(malformed)?;
    let rows: usize = rows.parse().map_err(|_| malformed())?;
    let cols: usize = cols.parse().map_err(|_| malformed())?;
    if rows == 0 || cols == 0 {
        return Err(malformed());
    }
    let total = rows.checked_mul(cols).ok_or_else(malformed)?;
    Ok((rows, cols, total))
}

impl Board {
    /// Parse a board from its text form.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

        let header = lines
            .next()
            .ok_or_else(|| BoardError::Malformed("empty board file".to_string()))?;
        let (rows, cols, total) = parse_header(header)?;

        let cards: Vec<&str> = lines.collect();
        if cards.len() != total {
            return Err(BoardError::Malformed(format!(
                "expected {} cards for a {}x{} board, found {}",
                total,
                rows,
                cols,
                cards.len()
            )));
        }

        let grid: Vec<Vec<&str>> = cards.chunks(cols).map(<[&str]>::to_vec).collect();
        Self::new(rows, cols, grid)
    }

    /// Load and parse a board file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| BoardError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let board = Self::parse(&text)?;
        info!(path = %path.display(), rows = board.rows(), cols = board.cols(), "loaded board");
        Ok(board)
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let board = Board::parse("  2x2\r\n\nA\r\n B \n\nB\nA\n").unwrap();
        assert_eq!((board.rows(), board.cols()), (2, 2));
        assert_eq!(board.look("p"), "2x2\ndown\ndown\ndown\ndown\n");
    }

    #[test]
    fn test_bad_header() {
        for text in [
            "",
            "\n\n",
            "2by2\nA\nA\nA\nA",
            "0x2\n",
            "2x\nA\nA",
            "-1x2\nA",
            "4294967296x4294967296\n",
            "18446744073709551615x2\nA\nA",
        ] {
            assert!(
                matches!(Board::parse(text), Err(BoardError::Malformed(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_wrong_card_count() {
        let err = Board::parse("2x2\nA\nB\nA\n").unwrap_err();
        assert!(err.to_string().contains("expected 4 cards"), "{}", err);
        assert!(Board::parse("1x1\nA\nB\n").is_err());
    }

    #[test]
    fn test_card_with_interior_whitespace() {
        assert!(matches!(
            Board::parse("1x2\nA\nB C\n"),
            Err(BoardError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_str() {
        let board: Board = "1x2\n🦄\n🌈\n".parse().unwrap();
        assert_eq!(board.cols(), 2);
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1x2\nA\nA").unwrap();
        let board = Board::from_file(file.path()).await.unwrap();
        assert_eq!(board.look("p"), "1x2\ndown\ndown\n");
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Board::from_file(dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Io { .. }));
    }
}
