//! 指し手（Move）
//!
//! 指し手は「起点の升・方向・指し手種別」の3つ組で表す。
//! 縦一列の移動（押し出しを含む）では起点は列の最後尾の玉、
//! 横移動では起点は玉の列の一端で、列は移動方向に隣接する方向へ伸びる。

use std::str::FromStr;

use thiserror::Error;

use super::square::Square;

/// 移動方向
///
/// 並びは時計回り。`left()` / `right()` は隣接する方向を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Right = 0,
    RightDown = 1,
    LeftDown = 2,
    Left = 3,
    LeftUp = 4,
    RightUp = 5,
}

impl Direction {
    /// 方向の数
    pub const NUM: usize = 6;

    /// 全ての方向（生成順）
    pub const ALL: [Direction; 6] = [
        Direction::Right,
        Direction::RightDown,
        Direction::LeftDown,
        Direction::Left,
        Direction::LeftUp,
        Direction::RightUp,
    ];

    /// 配列インデックスの差分
    #[inline]
    pub const fn delta(self) -> i32 {
        match self {
            Direction::Right => 1,
            Direction::RightDown => 12,
            Direction::LeftDown => 11,
            Direction::Left => -1,
            Direction::LeftUp => -12,
            Direction::RightUp => -11,
        }
    }

    /// 反時計回りに隣接する方向
    #[inline]
    pub const fn left(self) -> Direction {
        Self::ALL[(self as usize + Self::NUM - 1) % Self::NUM]
    }

    /// 時計回りに隣接する方向
    #[inline]
    pub const fn right(self) -> Direction {
        Self::ALL[(self as usize + 1) % Self::NUM]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Right => "Right",
            Direction::RightDown => "RightDown",
            Direction::LeftDown => "LeftDown",
            Direction::Left => "Left",
            Direction::LeftUp => "LeftUp",
            Direction::RightUp => "RightUp",
        }
    }

    pub fn from_name(name: &str) -> Option<Direction> {
        Self::ALL.into_iter().find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

/// 指し手種別
///
/// - `Out*`: 相手の玉を盤外へ押し出す
/// - `Push*`: 相手の玉を押す（盤上に残る）
/// - `Move*`: 縦一列の移動
/// - `Left*` / `Right*`: 横移動（列が移動方向の左 / 右に伸びる）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    Out2 = 0,
    Out1With3 = 1,
    Out1With2 = 2,
    Push2 = 3,
    Push1With3 = 4,
    Push1With2 = 5,
    Move3 = 6,
    Move2 = 7,
    Move1 = 8,
    Left3 = 9,
    Right3 = 10,
    Left2 = 11,
    Right2 = 12,
}

impl MoveKind {
    pub const NUM: usize = 13;

    pub const ALL: [MoveKind; 13] = [
        MoveKind::Out2,
        MoveKind::Out1With3,
        MoveKind::Out1With2,
        MoveKind::Push2,
        MoveKind::Push1With3,
        MoveKind::Push1With2,
        MoveKind::Move3,
        MoveKind::Move2,
        MoveKind::Move1,
        MoveKind::Left3,
        MoveKind::Right3,
        MoveKind::Left2,
        MoveKind::Right2,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            MoveKind::Out2 => "out2",
            MoveKind::Out1With3 => "out1with3",
            MoveKind::Out1With2 => "out1with2",
            MoveKind::Push2 => "push2",
            MoveKind::Push1With3 => "push1with3",
            MoveKind::Push1With2 => "push1with2",
            MoveKind::Move3 => "move3",
            MoveKind::Move2 => "move2",
            MoveKind::Move1 => "move1",
            MoveKind::Left3 => "left3",
            MoveKind::Right3 => "right3",
            MoveKind::Left2 => "left2",
            MoveKind::Right2 => "right2",
        }
    }

    pub fn from_name(name: &str) -> Option<MoveKind> {
        Self::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// 動かす自分の玉の数
    #[inline]
    pub const fn own_balls(self) -> usize {
        match self {
            MoveKind::Move1 => 1,
            MoveKind::Out1With2
            | MoveKind::Push1With2
            | MoveKind::Move2
            | MoveKind::Left2
            | MoveKind::Right2 => 2,
            _ => 3,
        }
    }

    /// 押す相手の玉の数
    #[inline]
    pub const fn pushed_balls(self) -> usize {
        match self {
            MoveKind::Out2 | MoveKind::Push2 => 2,
            MoveKind::Out1With3
            | MoveKind::Out1With2
            | MoveKind::Push1With3
            | MoveKind::Push1With2 => 1,
            _ => 0,
        }
    }

    /// 相手の玉を盤外に落とす手か
    #[inline]
    pub const fn is_capture(self) -> bool {
        matches!(self, MoveKind::Out2 | MoveKind::Out1With3 | MoveKind::Out1With2)
    }

    /// 横移動か
    #[inline]
    pub const fn is_sideways(self) -> bool {
        matches!(self, MoveKind::Left3 | MoveKind::Right3 | MoveKind::Left2 | MoveKind::Right2)
    }
}

/// 指し手
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub dir: Direction,
    pub kind: MoveKind,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, dir: Direction, kind: MoveKind) -> Move {
        Move { from, dir, kind }
    }

    /// 起点と方向が同じか（種別は比較しない）
    #[inline]
    pub fn same_origin(&self, other: &Move) -> bool {
        self.from == other.from && self.dir == other.dir
    }

    /// `"A1/RightDown/move3"` 形式の表記
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.from, self.dir.name(), self.kind.name())
    }
}

/// 指し手表記の解析エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("expected '<cell>/<direction>/<kind>', got '{0}'")]
    Format(String),
    #[error("unknown cell '{0}'")]
    Cell(String),
    #[error("unknown direction '{0}'")]
    Direction(String),
    #[error("unknown move kind '{0}'")]
    Kind(String),
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        let (Some(cell), Some(dir), Some(kind), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(MoveParseError::Format(s.to_string()));
        };
        let from = Square::from_name(cell).ok_or_else(|| MoveParseError::Cell(cell.to_string()))?;
        let dir =
            Direction::from_name(dir).ok_or_else(|| MoveParseError::Direction(dir.to_string()))?;
        let kind = MoveKind::from_name(kind).ok_or_else(|| MoveParseError::Kind(kind.to_string()))?;
        Ok(Move::new(from, dir, kind))
    }
}
