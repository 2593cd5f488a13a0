//! ミニマックス探索（枝刈りなし）

use crate::position::{Board, MoveList};
use crate::types::{Color, Move, Value};

use super::{SearchStrategy, StrategyCore};

/// 固定深さのミニマックス
///
/// 深さ `depth` は初手を指した後を 0 として数える。`depth` が奇数なら探索開始側の手番で
/// 最大化、偶数なら相手番で最小化する。指した結果 `max_depth` 手に達する手は葉として
/// その局面を評価する。終局した局面もその場で評価する。
#[derive(Debug, Clone)]
pub struct MinMax {
    core: StrategyCore,
}

impl MinMax {
    pub fn new(max_depth: u32) -> MinMax {
        MinMax { core: StrategyCore::new(max_depth) }
    }

    fn minimax(&mut self, board: &mut Board, mv: Move, depth: u32, root: Color) -> Value {
        let mut played = board.play_scoped(mv);
        self.core.stats.nodes += 1;

        if depth + 1 >= self.core.max_depth || !played.is_valid() {
            self.core.stats.leaves += 1;
            return self.core.evaluator.evaluate(&played, root);
        }

        let mut list = MoveList::new();
        played.generate_moves(&mut list);

        let maximize = depth % 2 == 1;
        let mut best = if maximize { Value::MIN_EVAL } else { Value::MAX_EVAL };
        while let Some(child) = list.next_move() {
            let eval = self.minimax(&mut played, child, depth + 1, root);
            if (maximize && eval > best) || (!maximize && eval < best) {
                best = eval;
            }
        }
        best
    }
}

impl SearchStrategy for MinMax {
    fn name(&self) -> &'static str {
        "MinMax"
    }

    fn boxed_clone(&self) -> Box<dyn SearchStrategy> {
        Box::new(self.clone())
    }

    fn core(&self) -> &StrategyCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StrategyCore {
        &mut self.core
    }

    fn evaluate_move(&mut self, board: &mut Board, mv: Move) -> Value {
        let root = board.side_to_move();
        self.minimax(board, mv, 0, root)
    }
}
