//! 基本型
//!
//! - `Color`: 手番
//! - `Square`: 升（外周付き 11×11 配列のインデックス）
//! - `Direction` / `MoveKind` / `Move`: 指し手
//! - `Value`: 評価値

mod color;
mod moves;
mod square;
mod value;

pub use color::Color;
pub use moves::{Direction, Move, MoveKind, MoveParseError};
pub use square::{Square, BOARD_WIDTH, NUM_CELLS, NUM_FIELDS};
pub use value::Value;
