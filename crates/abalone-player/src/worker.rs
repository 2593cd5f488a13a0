//! ワーカー
//!
//! コーディネーターから初手を指した後の局面を受け取り、その局面を評価して
//! コーディネーターの手番から見た値を同じタグで返す。終了タグで1回の探索サイクルを抜ける。
//! 重みタグを受け取ったら評価の重みをコーディネーターに合わせる（返信しない）。

use abalone_core::{Board, SearchStrategy, Value};

use crate::comm::{
    decode_scheme, encode_eval, CommError, Communicator, COORDINATOR, SCHEME_TAG, TERMINATE_TAG,
};

/// 探索サイクルの終わり方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// 終了タグを受け取った
    Terminated,
    /// コーディネーターが居なくなった
    Disconnected,
}

pub struct Worker<C: Communicator> {
    comm: C,
    strategy: Box<dyn SearchStrategy>,
    /// コーディネーター側から見た探索の深さ（初手を含む）
    depth: u32,
    served: u64,
}

impl<C: Communicator> Worker<C> {
    /// `strategy` の深さは初手を含む全体の深さとして扱う
    ///
    /// 初手はコーディネーターが指すので、ワーカーは残りの `depth - 1` 手を読む。
    pub fn new(comm: C, mut strategy: Box<dyn SearchStrategy>) -> Worker<C> {
        let depth = strategy.max_depth();
        strategy.set_max_depth(depth.saturating_sub(1));
        Worker { comm, strategy, depth, served: 0 }
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    /// これまでに返信した局面数
    pub fn served(&self) -> u64 {
        self.served
    }

    /// 局面を評価する（値は局面の手番の相手側、つまり初手を指した側から見た値）
    pub fn evaluate(&mut self, board: &mut Board) -> Value {
        if !board.is_valid() {
            // 初手で勝負がついている
            return Value::FORCED_WIN;
        }
        if self.depth <= 1 {
            let side = board.side_to_move();
            return -self.strategy.core().evaluator().evaluate(board, side);
        }
        -self.strategy.search_best_move(board).eval
    }

    /// 1回の探索サイクルを処理する
    pub fn serve_cycle(&mut self) -> Result<WorkerExit, CommError> {
        loop {
            let env = match self.comm.recv() {
                Ok(env) => env,
                Err(CommError::Disconnected) => return Ok(WorkerExit::Disconnected),
                Err(e) => return Err(e),
            };
            if env.tag == TERMINATE_TAG {
                log::trace!("worker {}: terminate", self.rank());
                return Ok(WorkerExit::Terminated);
            }
            if env.tag == SCHEME_TAG {
                match decode_scheme(&env.payload) {
                    Ok(scheme) => {
                        log::trace!("worker {}: scheme {scheme}", self.rank());
                        self.strategy.evaluator_mut().set_scheme(scheme);
                    }
                    Err(e) => log::error!("worker {}: bad scheme: {e}", self.rank()),
                }
                continue;
            }

            let value = match Board::unpack(&env.payload) {
                Ok(mut board) => self.evaluate(&mut board),
                Err(e) => {
                    // 選ばれないよう最低値を返してプロトコルは継続する
                    log::error!("worker {}: bad position for tag {}: {e}", self.rank(), env.tag);
                    Value::MIN_EVAL
                }
            };
            log::trace!("worker {}: tag {} -> {value}", self.rank(), env.tag);
            self.comm.send(COORDINATOR, env.tag, encode_eval(value))?;
            self.served += 1;
        }
    }

    /// コーディネーターが居なくなるまで探索サイクルを繰り返す
    pub fn run(mut self) -> Result<(), CommError> {
        log::debug!(
            "worker {} started ({} depth {})",
            self.rank(),
            self.strategy.name(),
            self.depth
        );
        let mut cycles = 0u64;
        while self.serve_cycle()? == WorkerExit::Terminated {
            cycles += 1;
        }
        log::debug!("worker {} finished: {cycles} cycles, {} positions", self.rank(), self.served);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::{decode_eval, local_world};
    use abalone_core::search;
    use abalone_core::{Color, Evaluator, Field, Square};

    fn worker(depth: u32) -> (crate::comm::LocalComm, Worker<crate::comm::LocalComm>) {
        let mut world = local_world(2);
        let w = world.pop().unwrap();
        let coord = world.pop().unwrap();
        (coord, Worker::new(w, search::create(0, depth).unwrap()))
    }

    #[test]
    fn test_invalid_position_replies_forced_win() {
        let (mut coord, mut w) = worker(3);
        let mut board = Board::new();
        for name in ["I5", "I6", "I7", "I8", "I9", "H4"] {
            board.set_field(Square::from_name(name).unwrap(), Field::Free);
        }
        board.set_side_to_move(Color::X);

        coord.send(1, 17, board.to_bytes()).unwrap();
        coord.send(1, TERMINATE_TAG, vec![0]).unwrap();
        assert_eq!(w.serve_cycle().unwrap(), WorkerExit::Terminated);

        let reply = coord.recv().unwrap();
        assert_eq!((reply.source, reply.tag), (1, 17));
        assert_eq!(decode_eval(&reply.payload).unwrap(), Value::FORCED_WIN);
        assert_eq!(w.served(), 1);
    }

    #[test]
    fn test_depth_one_replies_negated_static_eval() {
        let (mut coord, mut w) = worker(1);
        let mut board = Board::new();
        board.play_move("A1/RightDown/move3".parse().unwrap(), 0);
        let expected = abalone_core::DefaultEvaluator::new().evaluate(&board, Color::O);

        coord.send(1, 0, board.to_bytes()).unwrap();
        coord.send(1, TERMINATE_TAG, vec![0]).unwrap();
        w.serve_cycle().unwrap();
        assert_eq!(decode_eval(&coord.recv().unwrap().payload).unwrap(), expected);
    }

    #[test]
    fn test_scheme_tag_switches_weights() {
        let (mut coord, mut w) = worker(1);
        // X が1個落ちた局面（玉数差の重みが変わる）
        let mut board = Board::new();
        board.set_field(Square::from_name("I5").unwrap(), Field::Free);
        board.set_side_to_move(Color::X);
        let mut evaluator = abalone_core::DefaultEvaluator::new();
        evaluator.set_scheme(2);
        let expected = -evaluator.evaluate(&board, Color::X);
        assert_ne!(expected, -abalone_core::DefaultEvaluator::new().evaluate(&board, Color::X));

        coord.send(1, SCHEME_TAG, crate::comm::encode_scheme(2)).unwrap();
        coord.send(1, 0, board.to_bytes()).unwrap();
        coord.send(1, TERMINATE_TAG, vec![0]).unwrap();
        assert_eq!(w.serve_cycle().unwrap(), WorkerExit::Terminated);

        // 重みタグには返信しない
        let reply = coord.recv().unwrap();
        assert_eq!(reply.tag, 0);
        assert_eq!(decode_eval(&reply.payload).unwrap(), expected);
        assert_eq!(w.served(), 1);
    }

    #[test]
    fn test_terminate_without_reply() {
        let (mut coord, mut w) = worker(2);
        coord.send(1, TERMINATE_TAG, vec![0]).unwrap();
        assert_eq!(w.serve_cycle().unwrap(), WorkerExit::Terminated);
        assert_eq!(w.served(), 0);
        drop(coord);
        assert_eq!(w.serve_cycle().unwrap(), WorkerExit::Disconnected);
    }

    #[test]
    fn test_run_returns_when_coordinator_leaves() {
        let (mut coord, w) = worker(1);
        let handle = std::thread::spawn(move || w.run());
        for _ in 0..3 {
            coord.send(1, TERMINATE_TAG, vec![0]).unwrap();
        }
        drop(coord);
        assert!(handle.join().unwrap().is_ok());
    }
}
