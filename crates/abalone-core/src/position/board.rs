//! 局面本体

use smallvec::SmallVec;

use crate::types::{Color, Direction, Move, MoveKind, Square, BOARD_WIDTH, NUM_FIELDS};

/// 升の中身
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Field {
    Free = 0,
    O = 1,
    X = 2,
    /// 盤外（外周リングと六角形の外側）
    Out = 3,
}

impl Field {
    #[inline]
    pub const fn ball(color: Color) -> Field {
        match color {
            Color::O => Field::O,
            Color::X => Field::X,
        }
    }

    #[inline]
    pub const fn color(self) -> Option<Color> {
        match self {
            Field::O => Some(Color::O),
            Field::X => Some(Color::X),
            _ => None,
        }
    }
}

/// 局面の分類
///
/// 対局継続中（どちらかの手番）か、勝ち・時間切れで終局しているかのいずれか。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardState {
    /// 対局継続中。値は手番側
    Valid(Color),
    /// 終局。値は勝った側
    Win(Color),
    /// 終局。値は持ち時間を使い切った（負けた）側
    Timeout(Color),
}

impl BoardState {
    #[inline]
    pub const fn is_valid(self) -> bool {
        matches!(self, BoardState::Valid(_))
    }

    /// オペレーター向けの説明
    pub fn description(self) -> String {
        match self {
            BoardState::Valid(c) => format!("{c} about to move"),
            BoardState::Win(c) => format!("{c} won"),
            BoardState::Timeout(c) => format!("{c} lost by timeout"),
        }
    }
}

/// 開始時の玉の数
pub const START_BALLS: u8 = 14;

/// この数以下になった側は負け（6個押し出された）
pub const LOSING_BALLS: u8 = 8;

/// 1手分の巻き戻し情報
#[derive(Debug, Clone)]
struct UndoRecord {
    /// 変更前の升の中身（変更順）
    changed: SmallVec<[(Square, Field); 6]>,
    msecs_used: [u32; Color::NUM],
    balls: [u8; Color::NUM],
}

/// 局面
///
/// `play_move` / `take_back` で手の実行と巻き戻しを行う。巻き戻し情報はスタックとして
/// 局面内に保持し、LIFO の順でのみ戻せる。
#[derive(Debug, Clone)]
pub struct Board {
    pub(super) fields: [Field; NUM_FIELDS],
    pub(super) side_to_move: Color,
    pub(super) move_no: u16,
    pub(super) msecs_used: [u32; Color::NUM],
    /// 1手番あたりの持ち時間（ミリ秒、0 は無制限）
    pub(super) time_limit_ms: u32,
    pub(super) balls: [u8; Color::NUM],
    history: Vec<UndoRecord>,
}

impl Board {
    /// 開始局面
    pub fn new() -> Board {
        let mut board = Board::empty();
        for sq in Square::cells() {
            let (row, col) = (sq.row(), sq.col());
            let color = match row {
                1 | 2 => Some(Color::O),
                3 if (3..=5).contains(&col) => Some(Color::O),
                8 | 9 => Some(Color::X),
                7 if (5..=7).contains(&col) => Some(Color::X),
                _ => None,
            };
            if let Some(c) = color {
                board.fields[sq.index()] = Field::ball(c);
            }
        }
        board.recount_balls();
        board
    }

    /// 玉のない盤（O の手番）
    pub fn empty() -> Board {
        let mut fields = [Field::Out; NUM_FIELDS];
        for sq in Square::cells() {
            fields[sq.index()] = Field::Free;
        }
        Board {
            fields,
            side_to_move: Color::O,
            move_no: 0,
            msecs_used: [0; Color::NUM],
            time_limit_ms: 0,
            balls: [0; Color::NUM],
            history: Vec::new(),
        }
    }

    #[inline]
    pub fn field(&self, sq: Square) -> Field {
        self.fields[sq.index()]
    }

    /// 盤上の升に玉を置く・取り除く（局面設定用、履歴はクリアされる）
    pub fn set_field(&mut self, sq: Square, field: Field) {
        if !sq.is_on_board() || field == Field::Out {
            return;
        }
        self.fields[sq.index()] = field;
        self.recount_balls();
        self.history.clear();
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// 手番を設定する（局面設定用、履歴はクリアされる）
    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
        self.history.clear();
    }

    #[inline]
    pub fn move_no(&self) -> u16 {
        self.move_no
    }

    #[inline]
    pub fn balls(&self, color: Color) -> u8 {
        self.balls[color.index()]
    }

    #[inline]
    pub fn msecs_used(&self, color: Color) -> u32 {
        self.msecs_used[color.index()]
    }

    #[inline]
    pub fn time_limit_ms(&self) -> u32 {
        self.time_limit_ms
    }

    pub fn set_time_limit_ms(&mut self, limit: u32) {
        self.time_limit_ms = limit;
    }

    /// 巻き戻し可能な手数
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub(super) fn recount_balls(&mut self) {
        self.balls = [0; Color::NUM];
        for f in &self.fields {
            if let Some(c) = f.color() {
                self.balls[c.index()] += 1;
            }
        }
    }

    pub(super) fn clear_history(&mut self) {
        self.history.clear();
    }

    /// 局面の分類
    pub fn state(&self) -> BoardState {
        if self.balls(Color::O) <= LOSING_BALLS {
            return BoardState::Win(Color::X);
        }
        if self.balls(Color::X) <= LOSING_BALLS {
            return BoardState::Win(Color::O);
        }
        if self.time_limit_ms > 0 {
            for c in Color::ALL {
                if self.msecs_used(c) > self.time_limit_ms {
                    return BoardState::Timeout(c);
                }
            }
        }
        BoardState::Valid(self.side_to_move)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.state().is_valid()
    }

    /// 手を実行する
    ///
    /// `mv` は `generate_moves` が生成した合法手であること。
    /// `msecs` は手番側の消費時間に加算される。
    pub fn play_move(&mut self, mv: Move, msecs: u32) {
        let us = self.side_to_move;
        let own = Field::ball(us);
        let opp = Field::ball(!us);
        let d = mv.dir.delta();
        let at = |k: i32| step(mv.from, k * d);

        let mut writes: SmallVec<[(Square, Field); 6]> = SmallVec::new();
        match mv.kind {
            MoveKind::Move1 | MoveKind::Move2 | MoveKind::Move3 => {
                let n = mv.kind.own_balls() as i32;
                writes.push((mv.from, Field::Free));
                writes.push((at(n), own));
            }
            MoveKind::Push1With2 | MoveKind::Push1With3 | MoveKind::Push2 => {
                let n = mv.kind.own_balls() as i32;
                let m = mv.kind.pushed_balls() as i32;
                writes.push((mv.from, Field::Free));
                writes.push((at(n), own));
                writes.push((at(n + m), opp));
            }
            MoveKind::Out1With2 | MoveKind::Out1With3 | MoveKind::Out2 => {
                let n = mv.kind.own_balls() as i32;
                writes.push((mv.from, Field::Free));
                // 先頭の相手玉だけが落ち、残りは1つずつずれるので書き換えは2升で済む
                writes.push((at(n), own));
            }
            MoveKind::Left2 | MoveKind::Left3 | MoveKind::Right2 | MoveKind::Right3 => {
                let side: Direction = match mv.kind {
                    MoveKind::Left2 | MoveKind::Left3 => mv.dir.left(),
                    _ => mv.dir.right(),
                };
                let s = side.delta();
                for i in 0..mv.kind.own_balls() as i32 {
                    let src = step(mv.from, i * s);
                    writes.push((src, Field::Free));
                    writes.push((step(src, d), own));
                }
            }
        }

        let mut changed = SmallVec::new();
        for &(sq, field) in &writes {
            changed.push((sq, self.fields[sq.index()]));
            self.fields[sq.index()] = field;
        }
        self.history.push(UndoRecord {
            changed,
            msecs_used: self.msecs_used,
            balls: self.balls,
        });

        if mv.kind.is_capture() {
            self.balls[(!us).index()] -= 1;
        }
        self.msecs_used[us.index()] = self.msecs_used[us.index()].saturating_add(msecs);
        self.move_no = self.move_no.wrapping_add(1);
        self.side_to_move = !us;
    }

    /// 直前の手を巻き戻す。履歴が空なら `false`
    pub fn take_back(&mut self) -> bool {
        let Some(record) = self.history.pop() else {
            return false;
        };
        for &(sq, field) in record.changed.iter().rev() {
            self.fields[sq.index()] = field;
        }
        self.msecs_used = record.msecs_used;
        self.balls = record.balls;
        self.move_no = self.move_no.wrapping_sub(1);
        self.side_to_move = !self.side_to_move;
        true
    }

    /// 手を実行し、ガードが破棄されたときに必ず巻き戻す
    pub fn play_scoped(&mut self, mv: Move) -> PlayedMove<'_> {
        self.play_move(mv, 0);
        PlayedMove { board: self }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

/// 局面としての同一性（巻き戻し履歴は比較しない）
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
            && self.side_to_move == other.side_to_move
            && self.move_no == other.move_no
            && self.msecs_used == other.msecs_used
            && self.time_limit_ms == other.time_limit_ms
    }
}

impl Eq for Board {}

/// 盤上の升から `delta` だけ進んだ升
///
/// 盤上の升からの1歩は必ず外周リング内に収まるため、配列外にはならない。
#[inline]
pub(super) fn step(sq: Square, delta: i32) -> Square {
    let next = sq.offset(delta);
    debug_assert!(next.is_some(), "step out of array: {sq} {delta}");
    next.unwrap_or(sq)
}

/// `play_scoped` が返すガード
///
/// 局面へは `Deref` / `DerefMut` でアクセスする。`Drop` 時に `take_back` する。
pub struct PlayedMove<'a> {
    board: &'a mut Board,
}

impl std::ops::Deref for PlayedMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl std::ops::DerefMut for PlayedMove<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for PlayedMove<'_> {
    fn drop(&mut self) {
        self.board.take_back();
    }
}

impl std::fmt::Display for Board {
    /// 六角形の盤面図（I 段が上）
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in (1..BOARD_WIDTH - 1).rev() {
            write!(f, "{:indent$}{} ", "", (b'A' + row as u8 - 1) as char, indent = row.abs_diff(5))?;
            for col in 1..BOARD_WIDTH - 1 {
                let Some(sq) = Square::from_row_col(row, col) else {
                    continue;
                };
                if !sq.is_on_board() {
                    continue;
                }
                let c = match self.field(sq) {
                    Field::O => 'O',
                    Field::X => 'X',
                    _ => '.',
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{} to move (move {}, balls O:{} X:{})",
            self.side_to_move,
            self.move_no,
            self.balls(Color::O),
            self.balls(Color::X)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    #[test]
    fn test_start_position() {
        let b = Board::new();
        assert_eq!(b.balls(Color::O), START_BALLS);
        assert_eq!(b.balls(Color::X), START_BALLS);
        assert_eq!(b.side_to_move(), Color::O);
        assert_eq!(b.state(), BoardState::Valid(Color::O));
        assert_eq!(b.field(Square::from_name("C5").unwrap()), Field::O);
        assert_eq!(b.field(Square::from_name("C6").unwrap()), Field::Free);
        assert_eq!(b.field(Square::from_name("G7").unwrap()), Field::X);
        assert_eq!(b.field(Square::from_name("G4").unwrap()), Field::Free);
    }

    #[test]
    fn test_play_inline_and_take_back() {
        let mut b = Board::new();
        let before = b.clone();
        b.play_move(mv("A1/RightDown/move3"), 120);
        assert_eq!(b.field(Square::from_name("A1").unwrap()), Field::Free);
        assert_eq!(b.field(Square::from_name("D4").unwrap()), Field::O);
        assert_eq!(b.side_to_move(), Color::X);
        assert_eq!(b.msecs_used(Color::O), 120);
        assert_eq!(b.move_no(), 1);
        assert!(b.take_back());
        assert_eq!(b, before);
        assert!(!b.take_back());
    }

    #[test]
    fn test_push_out_decrements_balls() {
        let mut b = Board::empty();
        // C3 C4 C5 (O) が C6 C7 (X) を右へ押す。C7 の先は盤外
        for name in ["C3", "C4", "C5"] {
            b.set_field(Square::from_name(name).unwrap(), Field::O);
        }
        for name in ["C6", "C7"] {
            b.set_field(Square::from_name(name).unwrap(), Field::X);
        }
        let m = mv("C3/Right/out2");
        b.play_move(m, 0);
        assert_eq!(b.field(Square::from_name("C3").unwrap()), Field::Free);
        assert_eq!(b.field(Square::from_name("C6").unwrap()), Field::O);
        assert_eq!(b.field(Square::from_name("C7").unwrap()), Field::X);
        assert_eq!(b.balls(Color::X), 1);
        assert!(b.take_back());
        assert_eq!(b.balls(Color::X), 2);
        assert_eq!(b.field(Square::from_name("C6").unwrap()), Field::X);
    }

    #[test]
    fn test_scoped_guard_restores() {
        let mut b = Board::new();
        let before = b.clone();
        {
            let g = b.play_scoped(mv("A1/RightDown/move3"));
            assert_eq!(g.side_to_move(), Color::X);
        }
        assert_eq!(b, before);
        assert_eq!(b.history_len(), 0);
    }

    #[test]
    fn test_state_classification() {
        let mut b = Board::new();
        for name in ["I5", "I6", "I7", "I8", "I9", "H4"] {
            b.set_field(Square::from_name(name).unwrap(), Field::Free);
        }
        assert_eq!(b.state(), BoardState::Win(Color::O));

        let mut b = Board::new();
        b.set_time_limit_ms(1000);
        b.play_move(mv("A1/RightDown/move3"), 1500);
        assert_eq!(b.state(), BoardState::Timeout(Color::O));
        assert!(!b.is_valid());
    }
}
