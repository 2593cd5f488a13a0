//! 局面（Board）と指し手生成
//!
//! - `board`: 盤面・手番・持ち時間と play/undo
//! - `movegen`: 合法手生成
//! - `movelist`: 指し手リスト
//! - `state` / `pack`: 文字列表現とバイナリ表現

mod board;
mod movegen;
mod movelist;
mod pack;
mod state;

pub use board::{Board, BoardState, Field, PlayedMove, LOSING_BALLS, START_BALLS};
pub use movelist::MoveList;
pub use state::StateError;
