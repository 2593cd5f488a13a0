//! 指し手生成器
//!
//! 生成順は決定的: 升インデックス昇順 → 方向（`Direction::ALL` 順）→
//! 縦一列の移動・押し → 左への横移動 → 右への横移動。

use crate::types::{Direction, Move, MoveKind, Square};

use super::board::{step, Board, Field};
use super::movelist::MoveList;

impl Board {
    /// 手番側の合法手を `list` に生成する（`list` は先にクリアされる）
    pub fn generate_moves(&self, list: &mut MoveList) {
        list.clear();
        let own = Field::ball(self.side_to_move);
        for sq in Square::cells() {
            if self.field(sq) != own {
                continue;
            }
            for dir in Direction::ALL {
                self.generate_inline(sq, dir, list);
                self.generate_sideways(sq, dir, list);
            }
        }
    }

    /// 合法手のリストを新しく作って返す
    pub fn legal_moves(&self) -> MoveList {
        let mut list = MoveList::new();
        self.generate_moves(&mut list);
        list
    }

    /// 最後尾 `tail` から `dir` 方向へ並ぶ 1〜3 個の玉の移動・押し
    fn generate_inline(&self, tail: Square, dir: Direction, list: &mut MoveList) {
        let own = Field::ball(self.side_to_move);
        let opp = Field::ball(!self.side_to_move);
        let d = dir.delta();

        let mut n = 1;
        let mut head = step(tail, d);
        while n < 3 && self.field(head) == own {
            n += 1;
            head = step(head, d);
        }

        match self.field(head) {
            Field::Free => {
                let kind = match n {
                    1 => MoveKind::Move1,
                    2 => MoveKind::Move2,
                    _ => MoveKind::Move3,
                };
                list.push(Move::new(tail, dir, kind));
            }
            f if f == opp && n >= 2 => {
                // 押せるのは自玉より少ない数の相手玉だけ
                let mut m = 0;
                let mut front = head;
                while m < n && self.field(front) == opp {
                    m += 1;
                    front = step(front, d);
                }
                if m >= n {
                    return;
                }
                let kind = match (self.field(front), n, m) {
                    (Field::Free, 2, 1) => MoveKind::Push1With2,
                    (Field::Free, 3, 1) => MoveKind::Push1With3,
                    (Field::Free, 3, 2) => MoveKind::Push2,
                    (Field::Out, 2, 1) => MoveKind::Out1With2,
                    (Field::Out, 3, 1) => MoveKind::Out1With3,
                    (Field::Out, 3, 2) => MoveKind::Out2,
                    _ => return,
                };
                list.push(Move::new(tail, dir, kind));
            }
            // 盤外への自殺手・4個以上の列は不可
            _ => {}
        }
    }

    /// `first` を一端とする 2〜3 個の玉の横移動
    fn generate_sideways(&self, first: Square, dir: Direction, list: &mut MoveList) {
        let own = Field::ball(self.side_to_move);
        let d = dir.delta();
        if self.field(step(first, d)) != Field::Free {
            return;
        }

        let sides = [
            (dir.left(), MoveKind::Left2, MoveKind::Left3),
            (dir.right(), MoveKind::Right2, MoveKind::Right3),
        ];
        for (side, two, three) in sides {
            let s = side.delta();
            let second = step(first, s);
            if self.field(second) != own || self.field(step(second, d)) != Field::Free {
                continue;
            }
            list.push(Move::new(first, dir, two));

            let third = step(second, s);
            if self.field(third) == own && self.field(step(third, d)) == Field::Free {
                list.push(Move::new(first, dir, three));
            }
        }
    }
}
