//! 評価値（Value）
//!
//! 値のスケールは元の対局プログラムに合わせ、`[-15000, 15000]` を評価値の全範囲とする。
//! `FORCED_WIN` は「直前に指した側が既に勝っている」局面を表す固定値で、
//! 探索を行わずに返される。

/// 評価値
///
/// 評価を行った視点側にとって大きいほど良い。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Value(i32);

impl Value {
    /// ゼロ
    pub const ZERO: Value = Value(0);
    /// 評価値の下限（探索の初期値として使う）
    pub const MIN_EVAL: Value = Value(-15000);
    /// 評価値の上限（探索の初期値として使う）
    pub const MAX_EVAL: Value = Value(15000);
    /// 勝ちが確定している局面の固定スコア
    ///
    /// 通常の評価値はこの値より小さい範囲に収まる。
    pub const FORCED_WIN: Value = Value(14999);

    /// 値から生成
    #[inline]
    pub const fn new(v: i32) -> Value {
        Value(v)
    }

    /// 生の値を取得
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// 勝ち確定スコア以上かどうか
    #[inline]
    pub const fn is_win(self) -> bool {
        self.0 >= Self::FORCED_WIN.0
    }

    /// 負け確定スコア以下かどうか
    #[inline]
    pub const fn is_loss(self) -> bool {
        self.0 <= -Self::FORCED_WIN.0
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::ZERO
    }
}

impl std::ops::Neg for Value {
    type Output = Value;

    #[inline]
    fn neg(self) -> Value {
        Value(-self.0)
    }
}

impl std::ops::Add for Value {
    type Output = Value;

    #[inline]
    fn add(self, rhs: Value) -> Value {
        Value(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Value {
    type Output = Value;

    #[inline]
    fn sub(self, rhs: Value) -> Value {
        Value(self.0 - rhs.0)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value(v)
    }
}

impl From<Value> for i32 {
    fn from(v: Value) -> i32 {
        v.0
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
