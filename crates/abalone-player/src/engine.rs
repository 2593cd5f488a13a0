//! 対局セッション
//!
//! 現在の局面・探索戦略・定跡・（あれば）コーディネーターをまとめて持ち、
//! 自分の手番で指す手を決める。

use abalone_core::{Board, Color, Move, OpeningBook, SearchStrategy};

use crate::comm::Communicator;
use crate::coordinator::{Coordinator, CoordinatorError};

/// 手を決めた経路
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Opening,
    Coordinator,
    Local,
}

pub struct Engine {
    board: Board,
    color: Color,
    strategy: Box<dyn SearchStrategy>,
    book: OpeningBook,
    coordinator: Option<Coordinator<Box<dyn Communicator>>>,
    /// 自分の手を指すたびに評価の重みを切り替えるか
    rotate_evaluation: bool,
}

impl Engine {
    pub fn new(color: Color, strategy: Box<dyn SearchStrategy>) -> Engine {
        Engine {
            board: Board::new(),
            color,
            strategy,
            book: OpeningBook::new(),
            coordinator: None,
            rotate_evaluation: true,
        }
    }

    /// 探索をワーカーへ分配する
    pub fn with_coordinator(mut self, coordinator: Coordinator<Box<dyn Communicator>>) -> Engine {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn with_rotation(mut self, rotate: bool) -> Engine {
        self.rotate_evaluation = rotate;
        self
    }

    pub fn with_opening_book(mut self, book: OpeningBook) -> Engine {
        self.book = book;
        self
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn strategy(&self) -> &dyn SearchStrategy {
        self.strategy.as_ref()
    }

    pub fn coordinator(&self) -> Option<&Coordinator<Box<dyn Communicator>>> {
        self.coordinator.as_ref()
    }

    /// 現局面で指す手を決める
    ///
    /// 定跡 → コーディネーター（ワーカーがいる場合）→ 単一プロセス探索 の順。
    pub fn choose_move(&mut self) -> Result<Option<(Move, MoveSource)>, CoordinatorError> {
        let legal = self.board.legal_moves();
        if let Some(mv) = self.book.next_move(self.color, &legal) {
            return Ok(Some((mv, MoveSource::Opening)));
        }

        if let Some(coordinator) = self.coordinator.as_mut() {
            // ワーカーの重みを自分の評価関数に揃える
            coordinator.set_evaluation_scheme(self.strategy.core().evaluator().scheme());
            let result = coordinator.search_best_move(&mut self.board)?;
            return Ok(result.mv.map(|mv| (mv, MoveSource::Coordinator)));
        }

        let result = self.strategy.search_best_move(&mut self.board);
        Ok(result.mv.map(|mv| (mv, MoveSource::Local)))
    }

    /// 手を指し、消費時間を記録する
    pub fn play(&mut self, mv: Move, msecs: u32) {
        self.board.play_move(mv, msecs);
        if self.rotate_evaluation {
            self.strategy.evaluator_mut().change_evaluation();
        }
    }
}
