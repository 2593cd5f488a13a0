//! # abalone-player
//!
//! 放送チャネル上で相手と局面をやり取りし、自分の手番では初手ごとの評価を
//! ワーカーへ分配して最善手を決めるプレイヤー。
//!
//! ## モジュール構成
//!
//! - `comm`: ランク間のメッセージ通信（スレッド / 子プロセス）
//! - `worker`: ワーカーの受信ループ
//! - `coordinator`: 初手の分配・負荷分散・集計・終了通知
//! - `engine`: 対局セッション（定跡 → 分散探索 → 単一プロセス探索）
//! - `network`: TCP の放送ハブ
//! - `domain`: `pos` / `quit` 行の処理
//! - `config`: TOML 設定ファイル
//! - `cli`: コマンドライン

pub mod cli;
pub mod comm;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod engine;
pub mod network;
pub mod worker;

pub use coordinator::{Coordinator, CoordinatorError, ProtocolStats};
pub use domain::PlayerDomain;
pub use engine::{Engine, MoveSource};
pub use network::{Action, LineHandler, NetworkHub};
pub use worker::{Worker, WorkerExit};
