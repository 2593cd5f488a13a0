//! ランク間メッセージ通信
//!
//! ランク 0 がコーディネーター、1..size がワーカー。メッセージは
//! `(送信元, タグ, ペイロード)` の組で、同じ送信元・宛先の組の間では順序が保たれる。
//!
//! - `local`: 同一プロセス内のスレッドをランクとして扱う
//! - `process`: 子プロセスをランクとして扱い、標準入出力でフレームを送受信する

mod frame;
mod local;
mod process;

pub use frame::{read_frame, write_frame, MAX_FRAME_LEN};
pub use local::{local_world, LocalComm};
pub use process::{ProcessPool, StdioComm};

use abalone_core::Value;
use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// ランク番号
pub type Rank = usize;

/// コーディネーターのランク
pub const COORDINATOR: Rank = 0;

/// ワーカーに探索サイクルの終了を伝えるタグ
pub const TERMINATE_TAG: i32 = 1000;

/// ワーカーの評価の重みを切り替えるタグ（返信なし）
pub const SCHEME_TAG: i32 = 1001;

/// 受信したメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub source: Rank,
    pub tag: i32,
    pub payload: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum CommError {
    #[error("peer disconnected")]
    Disconnected,
    #[error("rank {dest} is not reachable from rank {rank} (world size {size})")]
    Unreachable { rank: Rank, dest: Rank, size: usize },
    #[error("malformed frame: {0}")]
    Frame(String),
    #[error("failed to spawn worker process {rank}: {source}")]
    Spawn {
        rank: Rank,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// メッセージ通信路
///
/// `send` はペイロードの所有権を通信路へ移し、相手の受信を待たずに戻る。
/// `recv` は任意の送信元・任意のタグのメッセージが届くまでブロックする。
pub trait Communicator: Send {
    fn rank(&self) -> Rank;

    /// ランク総数（コーディネーター込み）
    fn size(&self) -> usize;

    fn send(&mut self, dest: Rank, tag: i32, payload: Vec<u8>) -> Result<(), CommError>;

    fn recv(&mut self) -> Result<Envelope, CommError>;
}

impl<C: Communicator + ?Sized> Communicator for Box<C> {
    fn rank(&self) -> Rank {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn send(&mut self, dest: Rank, tag: i32, payload: Vec<u8>) -> Result<(), CommError> {
        (**self).send(dest, tag, payload)
    }

    fn recv(&mut self) -> Result<Envelope, CommError> {
        (**self).recv()
    }
}

/// 評価値の返信ペイロード（i32 LE）
pub fn encode_eval(value: Value) -> Vec<u8> {
    let mut buf = vec![0u8; 4];
    LittleEndian::write_i32(&mut buf, value.raw());
    buf
}

pub fn decode_eval(payload: &[u8]) -> Result<Value, CommError> {
    if payload.len() != 4 {
        return Err(CommError::Frame(format!(
            "evaluation reply must be 4 bytes, got {}",
            payload.len()
        )));
    }
    Ok(Value::new(LittleEndian::read_i32(payload)))
}

/// 重みの番号のペイロード（u32 LE）
pub fn encode_scheme(scheme: usize) -> Vec<u8> {
    let mut buf = vec![0u8; 4];
    LittleEndian::write_u32(&mut buf, scheme as u32);
    buf
}

pub fn decode_scheme(payload: &[u8]) -> Result<usize, CommError> {
    if payload.len() != 4 {
        return Err(CommError::Frame(format!(
            "scheme payload must be 4 bytes, got {}",
            payload.len()
        )));
    }
    Ok(LittleEndian::read_u32(payload) as usize)
}
