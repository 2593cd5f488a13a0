//! 局面の文字列表現
//!
//! 1行の書式: `"<手番> <手数> <O消費ms> <X消費ms> <持ち時間ms> <A段>/<B段>/.../<I段>"`
//! 各段は列の昇順に `O` / `X` / `.` を並べる。

use thiserror::Error;

use crate::types::{Color, Square, BOARD_WIDTH};

use super::board::{Board, Field};

/// 局面の解析エラー（文字列・バイナリ共通）
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("missing field: {0}")]
    Missing(&'static str),
    #[error("invalid side to move '{0}'")]
    Side(String),
    #[error("invalid {field}: '{value}'")]
    Number { field: &'static str, value: String },
    #[error("expected 9 rows, got {0}")]
    Rows(usize),
    #[error("row {row}: expected {expected} cells, got {actual}")]
    RowLength { row: char, expected: usize, actual: usize },
    #[error("invalid cell '{0}'")]
    Cell(char),
    #[error("packed position must be {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("invalid packed cell code {0}")]
    CellCode(u8),
    #[error("trailing input: '{0}'")]
    Trailing(String),
}

/// 段 `row`（1..=9）の盤上の升（列の昇順）
pub(super) fn row_cells(row: usize) -> impl Iterator<Item = Square> {
    (1..BOARD_WIDTH - 1)
        .filter_map(move |col| Square::from_row_col(row, col))
        .filter(|sq| sq.is_on_board())
}

impl Board {
    /// 1行の局面文字列
    pub fn state_string(&self) -> String {
        let rows: Vec<String> = (1..=9)
            .map(|row| {
                row_cells(row)
                    .map(|sq| match self.field(sq) {
                        Field::O => 'O',
                        Field::X => 'X',
                        _ => '.',
                    })
                    .collect()
            })
            .collect();
        format!(
            "{} {} {} {} {} {}",
            self.side_to_move,
            self.move_no,
            self.msecs_used(Color::O),
            self.msecs_used(Color::X),
            self.time_limit_ms,
            rows.join("/")
        )
    }

    /// 局面文字列を読み込む
    ///
    /// 失敗した場合は局面を変更しない。成功すると巻き戻し履歴はクリアされる。
    pub fn set_state(&mut self, s: &str) -> Result<(), StateError> {
        *self = Board::from_state(s)?;
        Ok(())
    }

    pub fn from_state(s: &str) -> Result<Board, StateError> {
        let mut tokens = s.split_whitespace();
        let side = tokens.next().ok_or(StateError::Missing("side to move"))?;
        let mut chars = side.chars();
        let side = match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_label(c),
            _ => None,
        }
        .ok_or_else(|| StateError::Side(side.to_string()))?;

        let mut number = |field: &'static str| -> Result<u32, StateError> {
            let tok = tokens.next().ok_or(StateError::Missing(field))?;
            tok.parse::<u32>().map_err(|_| StateError::Number {
                field,
                value: tok.to_string(),
            })
        };
        let move_no = number("move number")?;
        let move_no = u16::try_from(move_no).map_err(|_| StateError::Number {
            field: "move number",
            value: move_no.to_string(),
        })?;
        let ms_o = number("time used by O")?;
        let ms_x = number("time used by X")?;
        let limit = number("time limit")?;

        let diagram = tokens.next().ok_or(StateError::Missing("board"))?;
        if let Some(rest) = tokens.next() {
            return Err(StateError::Trailing(rest.to_string()));
        }

        let rows: Vec<&str> = diagram.split('/').collect();
        if rows.len() != 9 {
            return Err(StateError::Rows(rows.len()));
        }

        let mut board = Board::empty();
        for (i, text) in rows.iter().enumerate() {
            let row = i + 1;
            let cells: Vec<Square> = row_cells(row).collect();
            let actual = text.chars().count();
            if actual != cells.len() {
                return Err(StateError::RowLength {
                    row: (b'A' + i as u8) as char,
                    expected: cells.len(),
                    actual,
                });
            }
            for (sq, ch) in cells.into_iter().zip(text.chars()) {
                board.fields[sq.index()] = match ch {
                    'O' | 'o' => Field::O,
                    'X' | 'x' => Field::X,
                    '.' => Field::Free,
                    other => return Err(StateError::Cell(other)),
                };
            }
        }

        board.side_to_move = side;
        board.move_no = move_no;
        board.msecs_used = [ms_o, ms_x];
        board.time_limit_ms = limit;
        board.recount_balls();
        board.clear_history();
        Ok(board)
    }
}
