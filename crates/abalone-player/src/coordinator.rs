//! コーディネーター（初手ごとの並列評価）
//!
//! 0. 評価の重みが前回の探索から変わっていれば全ワーカーへ重みタグを送る
//! 1. 初手を `min(W, N)` 個、ワーカー 1..=W へ初手のインデックスをタグにして配る
//! 2. 返信が届くたびに、返信したワーカーへ残りの初手を1つ送る
//! 3. N 個の返信が揃ったら全ワーカーへ終了タグを送る
//! 4. 評価値が最大の初手を選ぶ（同点は生成順で先の手）

use abalone_core::search::SearchResult;
use abalone_core::{Board, MoveList, Value};
use thiserror::Error;

use crate::comm::{
    decode_eval, encode_scheme, CommError, Communicator, Rank, SCHEME_TAG, TERMINATE_TAG,
};

/// 1回の探索でのメッセージ数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    /// 送った局面数
    pub dispatched: usize,
    /// 受け取った評価値の数
    pub received: usize,
    /// 送った終了タグの数
    pub terminated: usize,
    /// 送った重みタグの数
    pub reconfigured: usize,
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("coordinator needs at least one worker (world size {0})")]
    NoWorkers(usize),
    #[error("coordinator must be rank 0, got rank {0}")]
    NotCoordinator(Rank),
    #[error("{0} candidate moves cannot be tagged below the terminate tag")]
    TooManyMoves(usize),
    #[error("unexpected reply tag {tag} from rank {from}")]
    UnexpectedTag { from: Rank, tag: i32 },
    #[error("duplicate reply for candidate {tag} from rank {from}")]
    DuplicateReply { from: Rank, tag: i32 },
    #[error(transparent)]
    Comm(#[from] CommError),
}

pub struct Coordinator<C: Communicator> {
    comm: C,
    stats: ProtocolStats,
    /// 次の探索で使う重みの番号
    scheme: usize,
    /// ワーカーが使っている重みの番号
    workers_scheme: usize,
}

impl<C: Communicator> Coordinator<C> {
    pub fn new(comm: C) -> Result<Coordinator<C>, CoordinatorError> {
        if comm.rank() != 0 {
            return Err(CoordinatorError::NotCoordinator(comm.rank()));
        }
        if comm.size() < 2 {
            return Err(CoordinatorError::NoWorkers(comm.size()));
        }
        Ok(Coordinator { comm, stats: ProtocolStats::default(), scheme: 0, workers_scheme: 0 })
    }

    /// ワーカー数
    pub fn workers(&self) -> usize {
        self.comm.size() - 1
    }

    /// 通信路を取り出す
    pub fn into_inner(self) -> C {
        self.comm
    }

    /// 直近の探索のメッセージ数
    pub fn stats(&self) -> ProtocolStats {
        self.stats
    }

    /// ワーカーの評価の重みを指定する（次の探索の開始時に送る）
    pub fn set_evaluation_scheme(&mut self, scheme: usize) {
        self.scheme = scheme;
    }

    /// 初手の評価をワーカーに分配して最善手を返す
    ///
    /// 合法手が無ければ `mv: None`。局面は呼び出し前と同じ状態で戻る。
    pub fn search_best_move(&mut self, board: &mut Board) -> Result<SearchResult, CoordinatorError> {
        self.stats = ProtocolStats::default();

        if self.scheme != self.workers_scheme {
            for worker in 1..=self.workers() {
                self.comm.send(worker, SCHEME_TAG, encode_scheme(self.scheme))?;
                self.stats.reconfigured += 1;
            }
            log::debug!("coordinator: workers switched to scheme {}", self.scheme);
            self.workers_scheme = self.scheme;
        }

        let mut list = MoveList::new();
        board.generate_moves(&mut list);
        let n = list.len();
        if n >= TERMINATE_TAG as usize {
            return Err(CoordinatorError::TooManyMoves(n));
        }

        let mut evals: Vec<Option<Value>> = vec![None; n];
        let first_wave = self.workers().min(n);
        for worker in 1..=first_wave {
            self.dispatch(board, &list, worker)?;
        }

        while self.stats.received < n {
            let env = self.comm.recv()?;
            let slot = usize::try_from(env.tag)
                .ok()
                .filter(|&k| k < self.stats.dispatched)
                .ok_or(CoordinatorError::UnexpectedTag { from: env.source, tag: env.tag })?;
            if evals[slot].is_some() {
                return Err(CoordinatorError::DuplicateReply { from: env.source, tag: env.tag });
            }
            evals[slot] = Some(decode_eval(&env.payload)?);
            self.stats.received += 1;

            if self.stats.dispatched < n {
                self.dispatch(board, &list, env.source)?;
            }
        }

        for worker in 1..=self.workers() {
            self.comm.send(worker, TERMINATE_TAG, vec![0])?;
            self.stats.terminated += 1;
        }

        let mut best = SearchResult { mv: None, eval: Value::MIN_EVAL };
        for (k, eval) in evals.into_iter().enumerate() {
            let eval = eval.unwrap_or(Value::MIN_EVAL);
            if best.mv.is_none() || eval > best.eval {
                best = SearchResult { mv: list.get(k), eval };
            }
        }

        log::debug!(
            "coordinator: {} candidates over {} workers, best {:?} ({}), {:?}",
            n,
            self.workers(),
            best.mv.map(|m| m.to_string()),
            best.eval,
            self.stats
        );
        if best.eval.is_win() {
            log::info!("coordinator: {:?} wins by force", best.mv.map(|m| m.to_string()));
        } else if best.mv.is_some() && best.eval.is_loss() {
            log::info!("coordinator: every candidate loses");
        }
        Ok(best)
    }

    /// 次の初手を指した局面を `worker` へ送る
    fn dispatch(
        &mut self,
        board: &mut Board,
        list: &MoveList,
        worker: Rank,
    ) -> Result<(), CoordinatorError> {
        let k = self.stats.dispatched;
        let payload = {
            let after = board.play_scoped(list[k]);
            after.to_bytes()
        };
        self.comm.send(worker, k as i32, payload)?;
        self.stats.dispatched += 1;
        Ok(())
    }
}
