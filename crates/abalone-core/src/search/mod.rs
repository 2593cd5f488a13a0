//! 探索戦略
//!
//! 戦略は `SearchStrategy` トレイトを実装し、`strategies()` の一覧に名前で登録する。
//! 評価値は探索開始時の手番側から見た値。

mod minimax;
mod one_level;

pub use minimax::MinMax;
pub use one_level::OneLevel;

use crate::eval::{DefaultEvaluator, Evaluator};
use crate::position::{Board, MoveList};
use crate::types::{Move, Value};

/// 探索結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// 最善手。合法手が無ければ `None`
    pub mv: Option<Move>,
    /// 最善手の評価値（合法手が無ければ `Value::MIN_EVAL`）
    pub eval: Value,
}

/// 探索統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// 展開したノード数（葉を含む）
    pub nodes: u64,
    /// 評価関数を呼んだ回数
    pub leaves: u64,
}

/// 戦略が共通に持つ状態
#[derive(Clone)]
pub struct StrategyCore {
    max_depth: u32,
    evaluator: Box<dyn Evaluator>,
    stats: SearchStats,
}

impl StrategyCore {
    pub fn new(max_depth: u32) -> StrategyCore {
        StrategyCore {
            max_depth: max_depth.max(1),
            evaluator: Box::new(DefaultEvaluator::new()),
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn stats_mut(&mut self) -> &mut SearchStats {
        &mut self.stats
    }
}

impl std::fmt::Debug for StrategyCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyCore")
            .field("max_depth", &self.max_depth)
            .field("evaluator", &self.evaluator.name())
            .field("stats", &self.stats)
            .finish()
    }
}

/// 探索戦略
pub trait SearchStrategy: Send {
    fn name(&self) -> &'static str;

    fn boxed_clone(&self) -> Box<dyn SearchStrategy>;

    fn core(&self) -> &StrategyCore;

    fn core_mut(&mut self) -> &mut StrategyCore;

    /// 初手 `mv` 以下の部分木の評価値（探索開始時の手番側から見た値）
    ///
    /// 戻ったとき `board` は呼び出し前と同じ局面に戻っている。
    fn evaluate_move(&mut self, board: &mut Board, mv: Move) -> Value;

    /// 探索の深さ（1 以上に丸める）
    fn set_max_depth(&mut self, depth: u32) {
        self.core_mut().max_depth = depth.max(1);
    }

    fn max_depth(&self) -> u32 {
        self.core().max_depth
    }

    fn set_evaluator(&mut self, evaluator: Box<dyn Evaluator>) {
        self.core_mut().evaluator = evaluator;
    }

    fn evaluator_mut(&mut self) -> &mut dyn Evaluator {
        self.core_mut().evaluator.as_mut()
    }

    fn stats(&self) -> SearchStats {
        self.core().stats
    }

    /// 全ての初手を評価し、評価値が最大の手を返す（同点は生成順で先の手）
    fn search_best_move(&mut self, board: &mut Board) -> SearchResult {
        self.core_mut().stats = SearchStats::default();

        let mut list = MoveList::new();
        board.generate_moves(&mut list);

        let mut best = SearchResult { mv: None, eval: Value::MIN_EVAL };
        while let Some(mv) = list.next_move() {
            let eval = self.evaluate_move(board, mv);
            if best.mv.is_none() || eval > best.eval {
                best = SearchResult { mv: Some(mv), eval };
            }
        }

        let stats = self.stats();
        log::debug!(
            "{} depth {}: {} moves, best {:?} ({}), nodes {} leaves {}",
            self.name(),
            self.max_depth(),
            list.len(),
            best.mv.map(|m| m.to_string()),
            best.eval,
            stats.nodes,
            stats.leaves
        );
        best
    }
}

impl Clone for Box<dyn SearchStrategy> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// 登録済みの戦略名（先頭が既定）
pub fn strategies() -> &'static [&'static str] {
    &["MinMax", "OneLevel"]
}

/// 既定の戦略のインデックス
pub const DEFAULT_STRATEGY: usize = 0;

/// 一覧のインデックスから戦略を生成
pub fn create(index: usize, max_depth: u32) -> Option<Box<dyn SearchStrategy>> {
    match index {
        0 => Some(Box::new(MinMax::new(max_depth))),
        1 => Some(Box::new(OneLevel::new(max_depth))),
        _ => None,
    }
}

/// 名前（大文字小文字は区別しない）から戦略を生成
pub fn create_by_name(name: &str, max_depth: u32) -> Option<Box<dyn SearchStrategy>> {
    let index = strategies().iter().position(|s| s.eq_ignore_ascii_case(name))?;
    create(index, max_depth)
}
