//! Line-oriented text encoding of a [`GameSnapshot`].
//!
//! ```text
//! <board size> <elapsed ticks>
//! <shape kind> <anchor x> <anchor y> <rotation>
//! <board size + 1 rows of 16 cell values>
//! <board size + 1 rows of 16 cell types>
//! ```
//!
//! Values on a line are separated by single spaces. Decoding accepts any
//! whitespace between values and ignores trailing whitespace. Blank lines after
//! the last type row are ignored.

use std::{
    fmt,
    io::{self, Write},
    str::FromStr,
};

use stackfall_engine::{Board, GameSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("line {line}: {message}")]
pub struct FormatError {
    line: usize,
    #[error(not(source))]
    message: String,
}

impl FormatError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// One-based line number the problem was found on.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Writes `snapshot` in the text layout.
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn write_snapshot<W>(writer: &mut W, snapshot: &GameSnapshot) -> io::Result<()>
where
    W: Write + ?Sized,
{
    writeln!(writer, "{} {}", snapshot.board_size, snapshot.elapsed_ticks)?;
    writeln!(
        writer,
        "{} {} {} {}",
        snapshot.active_shape_kind, snapshot.anchor_x, snapshot.anchor_y, snapshot.rotation_state
    )?;
    for row in snapshot.cells.iter().chain(&snapshot.cell_types) {
        let line = row.map(|value| value.to_string()).join(" ");
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

/// Parses a snapshot from the text layout.
///
/// Only the layout is checked here; whether the snapshot describes a consistent
/// game is left to [`GameSnapshot::validate`].
///
/// # Errors
///
/// Returns the first line that does not match the layout.
pub fn parse_snapshot(text: &str) -> Result<GameSnapshot, FormatError> {
    let eof_line = text.lines().count() + 1;
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));
    let mut next_line = |what: &str| {
        lines.next().ok_or_else(|| {
            FormatError::new(eof_line, format!("unexpected end of file, expected {what}"))
        })
    };

    let (line, header) = next_line("header")?;
    let [board_size, elapsed_ticks] = parse_fields::<u64, 2>(line, header)?;
    let board_size: usize = narrow(line, board_size, "board size")?;
    if !(1..=Board::MAX_SIZE).contains(&board_size) {
        return Err(FormatError::new(
            line,
            format!("board size {board_size} is outside 1..={}", Board::MAX_SIZE),
        ));
    }

    let (line, shape) = next_line("shape line")?;
    let [active_shape_kind, anchor_x, anchor_y, rotation_state] =
        parse_fields::<i64, 4>(line, shape)?;
    let active_shape_kind = narrow(line, active_shape_kind, "shape kind")?;
    let anchor_x = narrow(line, anchor_x, "anchor x")?;
    let anchor_y = narrow(line, anchor_y, "anchor y")?;
    let rotation_state = narrow(line, rotation_state, "rotation")?;

    let mut grid = |name: &str| -> Result<Vec<[u8; Board::WIDTH]>, FormatError> {
        (0..=board_size)
            .map(|_| {
                let (line, text) = next_line(name)?;
                parse_fields(line, text)
            })
            .collect()
    };
    let cells = grid("cell row")?;
    let cell_types = grid("type row")?;

    if let Some((line, _)) = lines.find(|(_, text)| !text.trim().is_empty()) {
        return Err(FormatError::new(line, "unexpected content after the last row"));
    }

    Ok(GameSnapshot {
        board_size,
        elapsed_ticks,
        active_shape_kind,
        anchor_x,
        anchor_y,
        rotation_state,
        cells,
        cell_types,
    })
}

fn parse_fields<T, const N: usize>(line: usize, text: &str) -> Result<[T; N], FormatError>
where
    T: FromStr,
{
    let values = text
        .split_whitespace()
        .map(|field| {
            field
                .parse()
                .map_err(|_| FormatError::new(line, format!("invalid number {field:?}")))
        })
        .collect::<Result<Vec<T>, _>>()?;
    let found = values.len();
    values
        .try_into()
        .map_err(|_| FormatError::new(line, format!("expected {N} values, found {found}")))
}

fn narrow<S, T>(line: usize, value: S, what: &str) -> Result<T, FormatError>
where
    S: Copy + fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(value).map_err(|_| FormatError::new(line, format!("{what} {value} is out of range")))
}

#[cfg(test)]
mod tests {
    use stackfall_engine::{Game, ShapeGenerator, ShapeKind};

    use super::*;

    fn encode(snapshot: &GameSnapshot) -> String {
        let mut buf = Vec::new();
        write_snapshot(&mut buf, snapshot).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn small_snapshot() -> GameSnapshot {
        Game::new(1, ShapeGenerator::cycle([ShapeKind::O])).snapshot()
    }

    #[test]
    fn test_write_layout() {
        let text = encode(&small_snapshot());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2 + 2 * 2);
        assert_eq!(lines[0], "1 0");
        assert_eq!(lines[1], "4 0 7 0");
        assert_eq!(lines[2], "0 0 0 0 0 0 0 2 2 0 0 0 0 0 0 0");
        assert_eq!(lines[3], "0 0 0 0 0 0 0 2 2 0 0 0 0 0 0 0");
        assert_eq!(lines[4], "0 0 0 0 0 0 0 4 4 0 0 0 0 0 0 0");
    }

    #[test]
    fn test_parse_written_text() {
        let mut game = Game::new(8, ShapeGenerator::cycle([ShapeKind::T, ShapeKind::J]));
        for _ in 0..12 {
            game.advance_tick();
        }
        let snapshot = game.snapshot();
        assert_eq!(parse_snapshot(&encode(&snapshot)), Ok(snapshot));
    }

    #[test]
    fn test_parse_accepts_trailing_spaces() {
        let text = encode(&small_snapshot())
            .lines()
            .map(|line| format!("{line} \r\n"))
            .collect::<String>();
        assert_eq!(parse_snapshot(&text), Ok(small_snapshot()));
    }

    #[test]
    fn test_parse_errors_report_line() {
        let text = encode(&small_snapshot());

        let err = parse_snapshot("").unwrap_err();
        assert!(err.to_string().contains("unexpected end of file"));

        let bad_header = text.replacen("1 0\n", "1 x\n", 1);
        assert_eq!(parse_snapshot(&bad_header).unwrap_err().line(), 1);

        let zero_size = text.replacen("1 0\n", "0 0\n", 1);
        assert_eq!(parse_snapshot(&zero_size).unwrap_err().line(), 1);

        let short_row = text.replacen("0 0 0 0 0 0 0 2 2 0 0 0 0 0 0 0", "0 2 2", 1);
        let err = parse_snapshot(&short_row).unwrap_err();
        assert_eq!(err.line(), 3);
        assert!(err.to_string().contains("expected 16 values, found 3"));

        let missing_row: String = text.lines().take(5).map(|line| format!("{line}\n")).collect();
        assert!(parse_snapshot(&missing_row).is_err());

        let extra = format!("{text}\n1 2 3\n");
        assert!(parse_snapshot(&extra).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_shape_fields() {
        let text = encode(&small_snapshot()).replacen("4 0 7 0", "300 0 7 0", 1);
        let err = parse_snapshot(&text).unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(err.to_string().contains("shape kind 300"));
    }
}
