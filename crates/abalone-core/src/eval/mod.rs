//! 局面評価
//!
//! 評価値は常に `perspective` 側から見た値で、
//! `evaluate(b, c) == -evaluate(b, !c)` が成り立つ（反対称）。

use crate::position::{Board, BoardState, Field};
use crate::types::{Color, Direction, Square, Value};

/// 評価関数
pub trait Evaluator: Send {
    fn name(&self) -> &'static str;

    /// `perspective` 側から見た評価値
    fn evaluate(&self, board: &Board, perspective: Color) -> Value;

    /// 評価の重みを切り替える（1手ごとに呼ばれる）
    fn change_evaluation(&mut self) {}

    /// 現在の重みの番号
    fn scheme(&self) -> usize {
        0
    }

    /// 重みの番号を直接設定する（範囲外は剰余を取る）
    fn set_scheme(&mut self, _scheme: usize) {}

    fn boxed_clone(&self) -> Box<dyn Evaluator>;
}

impl Clone for Box<dyn Evaluator> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// 重みの組
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    /// 玉数の差
    pub balls: i32,
    /// 中央への近さ
    pub center: i32,
    /// 隣接する自玉の組の数
    pub cohesion: i32,
}

/// `change_evaluation` で順に切り替わる重み
pub const WEIGHT_SCHEMES: [Weights; 3] = [
    Weights { balls: 100, center: 3, cohesion: 1 },
    Weights { balls: 100, center: 2, cohesion: 3 },
    Weights { balls: 120, center: 4, cohesion: 0 },
];

/// 既定の評価関数: 玉数差・中央度・まとまり
#[derive(Debug, Clone, Default)]
pub struct DefaultEvaluator {
    scheme: usize,
}

impl DefaultEvaluator {
    pub fn new() -> DefaultEvaluator {
        DefaultEvaluator::default()
    }

    /// 現在の重み
    pub fn weights(&self) -> Weights {
        WEIGHT_SCHEMES[self.scheme]
    }

    /// 片側の素点（中央度, まとまり）
    fn features(board: &Board, color: Color) -> (i32, i32) {
        let own = Field::ball(color);
        let mut center = 0;
        let mut cohesion = 0;
        for sq in Square::cells() {
            if board.field(sq) != own {
                continue;
            }
            center += 4 - center_distance(sq);
            // 各組を1回だけ数えるため前方3方向のみ見る
            for dir in [Direction::Right, Direction::RightDown, Direction::LeftDown] {
                if sq.offset(dir.delta()).is_some_and(|n| board.field(n) == own) {
                    cohesion += 1;
                }
            }
        }
        (center, cohesion)
    }
}

/// 中央（E5）からの六角距離（0..=4）
pub fn center_distance(sq: Square) -> i32 {
    let dr = sq.row() as i32 - 5;
    let dc = sq.col() as i32 - 5;
    if dr.signum() == dc.signum() {
        dr.abs().max(dc.abs())
    } else {
        dr.abs() + dc.abs()
    }
}

impl Evaluator for DefaultEvaluator {
    fn name(&self) -> &'static str {
        "Default"
    }

    fn evaluate(&self, board: &Board, perspective: Color) -> Value {
        match board.state() {
            BoardState::Win(c) if c == perspective => return Value::FORCED_WIN,
            BoardState::Win(_) => return -Value::FORCED_WIN,
            BoardState::Timeout(c) if c == perspective => return -Value::FORCED_WIN,
            BoardState::Timeout(_) => return Value::FORCED_WIN,
            BoardState::Valid(_) => {}
        }

        let w = self.weights();
        let opp = !perspective;
        let (center_us, cohesion_us) = Self::features(board, perspective);
        let (center_them, cohesion_them) = Self::features(board, opp);
        let balls = i32::from(board.balls(perspective)) - i32::from(board.balls(opp));

        let score = w.balls * balls
            + w.center * (center_us - center_them)
            + w.cohesion * (cohesion_us - cohesion_them);
        let bound = Value::FORCED_WIN.raw() - 1;
        Value::new(score.clamp(-bound, bound))
    }

    fn change_evaluation(&mut self) {
        self.scheme = (self.scheme + 1) % WEIGHT_SCHEMES.len();
        log::debug!("evaluation scheme -> {} {:?}", self.scheme, self.weights());
    }

    fn scheme(&self) -> usize {
        self.scheme
    }

    fn set_scheme(&mut self, scheme: usize) {
        self.scheme = scheme % WEIGHT_SCHEMES.len();
    }

    fn boxed_clone(&self) -> Box<dyn Evaluator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_name(name).unwrap()
    }

    #[test]
    fn test_center_distance() {
        assert_eq!(center_distance(sq("E5")), 0);
        assert_eq!(center_distance(sq("A1")), 4);
        assert_eq!(center_distance(sq("I9")), 4);
        assert_eq!(center_distance(sq("A5")), 4);
        assert_eq!(center_distance(sq("E1")), 4);
        assert_eq!(center_distance(sq("D5")), 1);
        assert_eq!(center_distance(sq("D6")), 2);
    }

    #[test]
    fn test_start_position_is_balanced() {
        let b = Board::new();
        let e = DefaultEvaluator::new();
        assert_eq!(e.evaluate(&b, Color::O), Value::ZERO);
        assert_eq!(e.evaluate(&b, Color::X), Value::ZERO);
    }

    #[test]
    fn test_antisymmetric() {
        let mut b = Board::new();
        b.play_move("A1/RightDown/move3".parse().unwrap(), 0);
        let mut e = DefaultEvaluator::new();
        for _ in 0..WEIGHT_SCHEMES.len() {
            assert_eq!(e.evaluate(&b, Color::O), -e.evaluate(&b, Color::X));
            e.change_evaluation();
        }
        assert_eq!(e.weights(), WEIGHT_SCHEMES[0]);
    }

    #[test]
    fn test_set_scheme_follows_rotation() {
        let mut rotated = DefaultEvaluator::new();
        let mut synced = DefaultEvaluator::new();
        for _ in 0..5 {
            rotated.change_evaluation();
            synced.set_scheme(rotated.scheme());
            assert_eq!(synced.weights(), rotated.weights());
        }
        synced.set_scheme(WEIGHT_SCHEMES.len() + 1);
        assert_eq!(synced.scheme(), 1);
    }

    #[test]
    fn test_terminal_scores() {
        let mut b = Board::new();
        for name in ["I5", "I6", "I7", "I8", "I9", "H4"] {
            b.set_field(sq(name), Field::Free);
        }
        let e = DefaultEvaluator::new();
        assert_eq!(e.evaluate(&b, Color::O), Value::FORCED_WIN);
        assert_eq!(e.evaluate(&b, Color::X), -Value::FORCED_WIN);
    }
}
