//! 升（Square）
//!
//! 盤は 11×11 の配列に外周の「盤外」リングを持たせて表現する。
//! インデックスは `row * 11 + col`（A..I 段 = row 1..9、列 1..9）。
//! `|col - row| <= 4` を満たす 61 升が盤上の升となる。

/// 配列の1辺
pub const BOARD_WIDTH: usize = 11;

/// 配列全体の升数（外周込み）
pub const NUM_FIELDS: usize = BOARD_WIDTH * BOARD_WIDTH;

/// 盤上の升数
pub const NUM_CELLS: usize = 61;

/// 升（配列インデックス）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// 配列インデックスから生成
    #[inline]
    pub const fn new(index: u8) -> Option<Square> {
        if (index as usize) < NUM_FIELDS {
            Some(Square(index))
        } else {
            None
        }
    }

    /// 配列インデックスから生成（定数表用、範囲は呼び出し側が保証する）
    #[inline]
    pub(crate) const fn from_index_unchecked(index: u8) -> Square {
        debug_assert!((index as usize) < NUM_FIELDS);
        Square(index)
    }

    /// 段・列から生成（盤外リングも含めて範囲内なら生成できる）
    #[inline]
    pub const fn from_row_col(row: usize, col: usize) -> Option<Square> {
        if row < BOARD_WIDTH && col < BOARD_WIDTH {
            Some(Square((row * BOARD_WIDTH + col) as u8))
        } else {
            None
        }
    }

    /// 配列インデックス
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn row(self) -> usize {
        self.0 as usize / BOARD_WIDTH
    }

    #[inline]
    pub const fn col(self) -> usize {
        self.0 as usize % BOARD_WIDTH
    }

    /// 盤上の61升に含まれるか
    #[inline]
    pub const fn is_on_board(self) -> bool {
        let row = self.row();
        let col = self.col();
        row >= 1 && row <= 9 && col >= 1 && col <= 9 && row.abs_diff(col) <= 4
    }

    /// 方向オフセットだけ移動した升。配列外なら `None`
    #[inline]
    pub const fn offset(self, delta: i32) -> Option<Square> {
        let idx = self.0 as i32 + delta;
        if idx >= 0 && (idx as usize) < NUM_FIELDS {
            Some(Square(idx as u8))
        } else {
            None
        }
    }

    /// "A1" 形式の升名から変換
    pub fn from_name(name: &str) -> Option<Square> {
        let mut chars = name.chars();
        let row_ch = chars.next()?.to_ascii_uppercase();
        let col_ch = chars.next()?;
        if chars.next().is_some() || !('A'..='I').contains(&row_ch) {
            return None;
        }
        let row = (row_ch as u8 - b'A') as usize + 1;
        let col = col_ch.to_digit(10)? as usize;
        let sq = Square::from_row_col(row, col)?;
        sq.is_on_board().then_some(sq)
    }

    /// 盤上の全ての升（インデックス昇順）
    pub fn cells() -> impl Iterator<Item = Square> {
        (0..NUM_FIELDS as u8).map(Square).filter(|sq| sq.is_on_board())
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_on_board() {
            write!(f, "{}{}", (b'A' + self.row() as u8 - 1) as char, self.col())
        } else {
            write!(f, "#{}", self.0)
        }
    }
}
