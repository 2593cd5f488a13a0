//! # abalone-core
//!
//! 六角盤の押し出しゲーム（Abalone）の盤面・評価・探索ライブラリ。
//!
//! ## モジュール構成
//!
//! - `types`: 基本型（Color, Square, Direction, MoveKind, Move, Value）
//! - `position`: 局面表現と play/undo、合法手生成、文字列・バイナリ表現
//! - `eval`: 評価関数
//! - `search`: 探索戦略（ミニマックス）と戦略一覧
//! - `opening`: 序盤の定跡手順

pub mod eval;
pub mod opening;
pub mod position;
pub mod search;
pub mod types;

pub use eval::{DefaultEvaluator, Evaluator};
pub use opening::OpeningBook;
pub use position::{Board, BoardState, Field, MoveList, StateError};
pub use search::{SearchResult, SearchStats, SearchStrategy};
pub use types::{Color, Direction, Move, MoveKind, Square, Value};
