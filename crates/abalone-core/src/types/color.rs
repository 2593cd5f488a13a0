//! 手番（Color）

/// 手番（O / X）
///
/// O が先手（元の盤面表現の color1）、X が後手（color2）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    O = 0,
    X = 1,
}

impl Color {
    /// 手番の数
    pub const NUM: usize = 2;

    /// 全ての手番
    pub const ALL: [Color; 2] = [Color::O, Color::X];

    /// 相手番を返す
    #[inline]
    pub const fn opponent(self) -> Color {
        match self {
            Color::O => Color::X,
            Color::X => Color::O,
        }
    }

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 盤面表示・状態文字列で使う1文字
    #[inline]
    pub const fn label(self) -> char {
        match self {
            Color::O => 'O',
            Color::X => 'X',
        }
    }

    /// 1文字表記から変換
    pub fn from_label(c: char) -> Option<Color> {
        match c {
            'O' | 'o' => Some(Color::O),
            'X' | 'x' => Some(Color::X),
            _ => None,
        }
    }

    /// u8からColorに変換
    #[inline]
    pub const fn from_u8(n: u8) -> Option<Color> {
        match n {
            0 => Some(Color::O),
            1 => Some(Color::X),
            _ => None,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.opponent()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
