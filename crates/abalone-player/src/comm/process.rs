//! 子プロセスとの通信路
//!
//! コーディネーターは同じバイナリを `--worker-rank` 付きで起動し、子の stdin へフレームを
//! 書き、stdout から読む。子ごとの受信スレッドが1本のチャネルへ合流するので、
//! `recv` は最初に届いた子のフレームを返す。

use std::io::{self, BufReader, BufWriter, Stdin, Stdout};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};

use super::frame::{read_frame, write_frame};
use super::{CommError, Communicator, Envelope, Rank, COORDINATOR};

const WORKER_QUIT_TIMEOUT: Duration = Duration::from_millis(500);
const WORKER_QUIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

struct WorkerProcess {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
}

/// コーディネーター側: ワーカープロセス群
pub struct ProcessPool {
    workers: Vec<WorkerProcess>,
    rx: Receiver<Result<Envelope, String>>,
}

impl ProcessPool {
    /// `program` を `workers` 個起動する
    ///
    /// 各子には `args` に続けて `--worker-rank <r> --world-size <n>` を渡す。
    pub fn spawn(program: &Path, args: &[String], workers: usize) -> Result<ProcessPool, CommError> {
        let size = workers + 1;
        let (tx, rx) = unbounded();
        let mut procs = Vec::with_capacity(workers);

        for rank in 1..size {
            let mut child = Command::new(program)
                .args(args)
                .arg("--worker-rank")
                .arg(rank.to_string())
                .arg("--world-size")
                .arg(size.to_string())
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .spawn()
                .map_err(|source| CommError::Spawn { rank, source })?;

            let broken = |what: &str| CommError::Spawn {
                rank,
                source: io::Error::other(format!("no {what} pipe")),
            };
            let stdin = child.stdin.take().ok_or_else(|| broken("stdin"))?;
            let stdout = child.stdout.take().ok_or_else(|| broken("stdout"))?;

            let tx = tx.clone();
            thread::spawn(move || {
                let mut reader = BufReader::new(stdout);
                loop {
                    let msg = match read_frame(&mut reader) {
                        Ok(Some((tag, payload))) => Ok(Envelope { source: rank, tag, payload }),
                        Ok(None) => break,
                        Err(e) => Err(format!("worker {rank}: {e}")),
                    };
                    let failed = msg.is_err();
                    if tx.send(msg).is_err() || failed {
                        break;
                    }
                }
                log::debug!("worker {rank} output closed");
            });

            procs.push(WorkerProcess { child, stdin: Some(BufWriter::new(stdin)) });
        }

        log::info!("spawned {workers} worker processes");
        Ok(ProcessPool { workers: procs, rx })
    }
}

impl Communicator for ProcessPool {
    fn rank(&self) -> Rank {
        COORDINATOR
    }

    fn size(&self) -> usize {
        self.workers.len() + 1
    }

    fn send(&mut self, dest: Rank, tag: i32, payload: Vec<u8>) -> Result<(), CommError> {
        let size = self.size();
        let stdin = dest
            .checked_sub(1)
            .and_then(|i| self.workers.get_mut(i))
            .and_then(|w| w.stdin.as_mut())
            .ok_or(CommError::Unreachable { rank: COORDINATOR, dest, size })?;
        write_frame(stdin, tag, &payload)
    }

    fn recv(&mut self) -> Result<Envelope, CommError> {
        match self.rx.recv() {
            Ok(Ok(env)) => Ok(env),
            Ok(Err(msg)) => Err(CommError::Frame(msg)),
            Err(_) => Err(CommError::Disconnected),
        }
    }
}

impl Drop for ProcessPool {
    fn drop(&mut self) {
        // stdin を閉じるとワーカーは切断を検知して終了する
        for w in &mut self.workers {
            w.stdin.take();
        }
        let deadline = Instant::now() + WORKER_QUIT_TIMEOUT;
        for w in &mut self.workers {
            while Instant::now() < deadline {
                if let Ok(Some(_)) = w.child.try_wait() {
                    break;
                }
                thread::sleep(WORKER_QUIT_POLL_INTERVAL);
            }
            if let Ok(None) = w.child.try_wait() {
                let _ = w.child.kill();
            }
            let _ = w.child.wait();
        }
    }
}

/// ワーカー側: 自プロセスの stdin / stdout を使う通信路
///
/// stdout はフレーム専用になるため、ワーカーのログは stderr へ出すこと。
pub struct StdioComm {
    rank: Rank,
    size: usize,
    reader: BufReader<Stdin>,
    writer: BufWriter<Stdout>,
}

impl StdioComm {
    pub fn new(rank: Rank, size: usize) -> StdioComm {
        StdioComm {
            rank,
            size,
            reader: BufReader::new(io::stdin()),
            writer: BufWriter::new(io::stdout()),
        }
    }
}

impl Communicator for StdioComm {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&mut self, dest: Rank, tag: i32, payload: Vec<u8>) -> Result<(), CommError> {
        if dest != COORDINATOR {
            return Err(CommError::Unreachable { rank: self.rank, dest, size: self.size });
        }
        write_frame(&mut self.writer, tag, &payload)
    }

    fn recv(&mut self) -> Result<Envelope, CommError> {
        match read_frame(&mut self.reader)? {
            Some((tag, payload)) => Ok(Envelope { source: COORDINATOR, tag, payload }),
            None => Err(CommError::Disconnected),
        }
    }
}
