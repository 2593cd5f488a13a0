//! 指し手リスト

use crate::types::Move;

/// 指し手生成の結果
///
/// 生成順を保持する。`next_move` は内部カーソルを進めながら順に取り出し、
/// `rewind` で先頭から読み直せる。
#[derive(Debug, Clone, Default)]
pub struct MoveList {
    moves: Vec<Move>,
    cursor: usize,
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList::default()
    }

    /// 全消去（カーソルも先頭に戻す）
    pub fn clear(&mut self) {
        self.moves.clear();
        self.cursor = 0;
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Move> {
        self.moves.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    /// カーソル位置の手を返してカーソルを進める。残りがなければ `None`
    pub fn next_move(&mut self) -> Option<Move> {
        let mv = self.moves.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(mv)
    }

    /// 次に `next_move` が返す手のインデックス
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// カーソルを先頭に戻す
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// `mv` に一致する手を探す
    ///
    /// `compare_kind == false` のときは起点と方向だけで比較する。
    pub fn find(&self, mv: &Move, compare_kind: bool) -> Option<Move> {
        self.moves
            .iter()
            .find(|m| if compare_kind { *m == mv } else { m.same_origin(mv) })
            .copied()
    }

    pub fn contains(&self, mv: &Move, compare_kind: bool) -> bool {
        self.find(mv, compare_kind).is_some()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, index: usize) -> &Move {
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
