//! 定跡（序盤の決め打ち手順）
//!
//! 手番ごとに 5 手の手順を持つ。有効な間は問い合わせのたびに手順の次の手を返し、
//! 手順を使い切るか、手順の手が合法手に無ければ以後ずっと無効になる。

use crate::position::MoveList;
use crate::types::{Color, Direction, Move, MoveKind, Square};

/// 1色あたりの定跡手数
pub const BOOK_LENGTH: usize = 5;

const fn book_move(index: u8, dir: Direction, kind: MoveKind) -> Move {
    Move::new(Square::from_index_unchecked(index), dir, kind)
}

const BOOK_O: [Move; BOOK_LENGTH] = [
    book_move(12, Direction::RightDown, MoveKind::Move3), // A1
    book_move(13, Direction::RightDown, MoveKind::Move3), // A2
    book_move(14, Direction::RightDown, MoveKind::Move3), // A3
    book_move(27, Direction::LeftDown, MoveKind::Move3),  // B5
    book_move(27, Direction::RightDown, MoveKind::Right2), // B5
];

const BOOK_X: [Move; BOOK_LENGTH] = [
    book_move(108, Direction::LeftUp, MoveKind::Move3), // I9
    book_move(106, Direction::LeftUp, MoveKind::Move3), // I7
    book_move(107, Direction::LeftUp, MoveKind::Move3), // I8
    book_move(105, Direction::LeftUp, MoveKind::Move2), // I6
    book_move(95, Direction::LeftUp, MoveKind::Push2),  // H7
];

/// 手番 `color` の定跡手順
pub fn book_for(color: Color) -> &'static [Move; BOOK_LENGTH] {
    match color {
        Color::O => &BOOK_O,
        Color::X => &BOOK_X,
    }
}

/// 定跡の進行状態
#[derive(Debug, Clone)]
pub struct OpeningBook {
    active: bool,
    count: usize,
}

impl OpeningBook {
    pub fn new() -> OpeningBook {
        OpeningBook { active: true, count: 0 }
    }

    /// 最初から無効な定跡
    pub fn disabled() -> OpeningBook {
        OpeningBook { active: false, count: 0 }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 有効な間に問い合わせた回数
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// 定跡手を問い合わせる
    ///
    /// 手順の手と完全に一致する合法手があればそれを、無ければ起点・方向が一致する
    /// 最初の合法手を返す（種別が違えば生成された側の手になる）。
    /// どちらも無いか手順を使い切っていれば無効になり `None` を返す。
    pub fn next_move(&mut self, color: Color, legal: &MoveList) -> Option<Move> {
        if !self.active {
            return None;
        }
        let found = book_for(color)
            .get(self.count)
            .and_then(|scripted| {
                legal.find(scripted, true).or_else(|| legal.find(scripted, false))
            });
        self.count += 1;
        match found {
            Some(mv) => {
                log::debug!("opening move #{}: {mv}", self.count);
                Some(mv)
            }
            None => {
                log::debug!("opening book exhausted after {} requests", self.count);
                self.active = false;
                None
            }
        }
    }
}

impl Default for OpeningBook {
    fn default() -> Self {
        OpeningBook::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Board;

    #[test]
    fn test_book_names() {
        let names: Vec<String> = book_for(Color::O).iter().map(Move::to_string).collect();
        assert_eq!(
            names,
            [
                "A1/RightDown/move3",
                "A2/RightDown/move3",
                "A3/RightDown/move3",
                "B5/LeftDown/move3",
                "B5/RightDown/right2"
            ]
        );
        assert_eq!(book_for(Color::X)[4].to_string(), "H7/LeftUp/push2");
    }

    #[test]
    fn test_first_move_from_start() {
        let board = Board::new();
        let mut book = OpeningBook::new();
        let mv = book.next_move(Color::O, &board.legal_moves());
        assert_eq!(mv.map(|m| m.to_string()).as_deref(), Some("A1/RightDown/move3"));
        assert!(book.is_active());
        assert_eq!(book.count(), 1);
    }

    #[test]
    fn test_prefers_exact_scripted_move() {
        let a1 = Square::from_name("A1").unwrap();
        let mut legal = MoveList::new();
        legal.push(Move::new(a1, Direction::RightDown, MoveKind::Move2));
        legal.push(Move::new(a1, Direction::RightDown, MoveKind::Move3));
        let mut book = OpeningBook::new();
        assert_eq!(book.next_move(Color::O, &legal), legal.get(1));

        // 種別だけ違う手しか無ければその手を返す
        let a2 = Square::from_name("A2").unwrap();
        let mut legal = MoveList::new();
        legal.push(Move::new(a2, Direction::RightDown, MoveKind::Move2));
        legal.push(Move::new(a2, Direction::RightDown, MoveKind::Move1));
        assert_eq!(book.next_move(Color::O, &legal), legal.get(0));
        assert!(book.is_active());
    }

    #[test]
    fn test_deactivates_on_missing_move() {
        let mut book = OpeningBook::new();
        let empty = MoveList::new();
        assert_eq!(book.next_move(Color::X, &empty), None);
        assert!(!book.is_active());
        // 一度無効になれば合法手があっても使わない
        let board = Board::new();
        assert_eq!(book.next_move(Color::O, &board.legal_moves()), None);
        assert_eq!(book.count(), 1);
    }

    #[test]
    fn test_sixth_request_never_from_book() {
        let board = Board::new();
        let legal = board.legal_moves();
        let mut book = OpeningBook::new();
        // 同じ局面に問い合わせ続けても6回目は必ず None
        for _ in 0..BOOK_LENGTH {
            book.next_move(Color::O, &legal);
        }
        assert_eq!(book.next_move(Color::O, &legal), None);
        assert!(!book.is_active());
    }
}
