//! 1手読み
//!
//! 各合法手を指した直後の局面だけを評価する。深さの設定は無視する。

use crate::position::Board;
use crate::types::{Move, Value};

use super::{SearchStrategy, StrategyCore};

#[derive(Debug, Clone)]
pub struct OneLevel {
    core: StrategyCore,
}

impl OneLevel {
    pub fn new(max_depth: u32) -> OneLevel {
        OneLevel { core: StrategyCore::new(max_depth) }
    }
}

impl SearchStrategy for OneLevel {
    fn name(&self) -> &'static str {
        "OneLevel"
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
        let played = board.play_scoped(mv);
        self.core.stats.nodes += 1;
        self.core.stats.leaves += 1;
        self.core.evaluator.evaluate(&played, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MinMax;

    #[test]
    fn test_matches_minmax_depth_one() {
        let mut board = Board::new();
        board.play_move("A1/RightDown/move3".parse().unwrap(), 0);

        let mut one = OneLevel::new(5);
        let mut minmax = MinMax::new(1);
        assert_eq!(one.search_best_move(&mut board), minmax.search_best_move(&mut board));
        assert_eq!(board.history_len(), 1);
    }
}
