//! 放送チャネル（TCP）
//!
//! 全ての接続を対等に扱い、ある接続から届いた1行を他の全接続へ中継してから
//! `LineHandler` に渡す。ハンドラが返した `Action::Broadcast` は全接続へ送る。
//!
//! 接続ごとに受信スレッドを立て、イベントは1本のチャネルに集めて
//! `run` を呼んだスレッドだけで処理する。

use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use thiserror::Error;

/// 既定のポート
pub const DEFAULT_PORT: u16 = 23412;

type ConnId = usize;

/// ハンドラが返す指示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 全接続へ送る（改行込み）
    Broadcast(String),
    /// イベントループを抜ける
    Exit,
}

/// 受信行の処理
pub trait LineHandler {
    type Error: std::error::Error + Send + Sync + 'static;

    fn on_line(&mut self, line: &str) -> Result<Vec<Action>, Self::Error>;

    /// 新しい接続に最初に送る内容
    fn on_connect(&mut self) -> Option<String> {
        None
    }
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("failed to listen on port {port}: {source}")]
    Listen {
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("line handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

enum Event {
    Connected(ConnId, TcpStream),
    Line(ConnId, String),
    Closed(ConnId),
}

pub struct NetworkHub {
    tx: Sender<Event>,
    rx: Receiver<Event>,
    conns: BTreeMap<ConnId, TcpStream>,
    /// 待ち受けスレッドと共有する接続 ID の採番
    next_id: Arc<AtomicUsize>,
}

impl NetworkHub {
    pub fn new() -> NetworkHub {
        let (tx, rx) = unbounded();
        NetworkHub { tx, rx, conns: BTreeMap::new(), next_id: Arc::new(AtomicUsize::new(0)) }
    }

    /// ポートで待ち受ける（0 なら空きポート）。実際のポートを返す
    pub fn listen(&mut self, port: u16) -> Result<u16, NetworkError> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .map_err(|source| NetworkError::Listen { port, source })?;
        let bound = listener
            .local_addr()
            .map_err(|source| NetworkError::Listen { port, source })?
            .port();

        let tx = self.tx.clone();
        let next_id = Arc::clone(&self.next_id);
        thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        let id = next_id.fetch_add(1, Ordering::Relaxed);
                        if let Err(e) = spawn_reader(id, stream, tx.clone()) {
                            log::warn!("connection {id}: {e}");
                        }
                    }
                    Err(e) => log::warn!("accept failed: {e}"),
                }
            }
        });
        log::info!("listening on port {bound}");
        Ok(bound)
    }

    /// `addr`（host:port）へ接続する
    pub fn connect(&mut self, addr: impl ToSocketAddrs + std::fmt::Display) -> Result<(), NetworkError> {
        let stream = TcpStream::connect(&addr).map_err(|source| NetworkError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        spawn_reader(id, stream, self.tx.clone()).map_err(|source| NetworkError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        log::info!("connected to {addr}");
        Ok(())
    }

    /// 現在の接続数
    pub fn connections(&self) -> usize {
        self.conns.len()
    }

    /// 全接続へ送る
    pub fn broadcast(&mut self, msg: &str) {
        self.send_except(None, msg);
    }

    fn send_except(&mut self, skip: Option<ConnId>, msg: &str) {
        let mut broken = Vec::new();
        for (&id, stream) in self.conns.iter_mut() {
            if Some(id) == skip {
                continue;
            }
            if let Err(e) = stream.write_all(msg.as_bytes()).and_then(|_| stream.flush()) {
                log::warn!("connection {id}: send failed: {e}");
                broken.push(id);
            }
        }
        for id in broken {
            self.close(id);
        }
    }

    fn close(&mut self, id: ConnId) {
        if let Some(stream) = self.conns.remove(&id) {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    /// イベントループ。ハンドラが `Action::Exit` を返すまで処理する
    pub fn run<H: LineHandler>(&mut self, handler: &mut H) -> Result<(), NetworkError> {
        let result = self.event_loop(handler);
        let ids: Vec<ConnId> = self.conns.keys().copied().collect();
        for id in ids {
            self.close(id);
        }
        result
    }

    fn event_loop<H: LineHandler>(&mut self, handler: &mut H) -> Result<(), NetworkError> {
        // self.tx を持っているので受信が切れることはない
        while let Ok(event) = self.rx.recv() {
            match event {
                Event::Connected(id, stream) => {
                    self.conns.insert(id, stream);
                    log::debug!("connection {id} opened ({} open)", self.connections());
                    if let Some(greeting) = handler.on_connect() {
                        self.send_to(id, &greeting);
                    }
                }
                Event::Closed(id) => {
                    self.close(id);
                    log::debug!("connection {id} closed ({} open)", self.connections());
                }
                Event::Line(id, line) => {
                    let mut relay = line.clone();
                    relay.push('\n');
                    self.send_except(Some(id), &relay);

                    let actions = handler
                        .on_line(&line)
                        .map_err(|e| NetworkError::Handler(Box::new(e)))?;
                    for action in actions {
                        match action {
                            Action::Broadcast(msg) => self.broadcast(&msg),
                            Action::Exit => return Ok(()),
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn send_to(&mut self, id: ConnId, msg: &str) {
        let failed = match self.conns.get_mut(&id) {
            Some(stream) => stream.write_all(msg.as_bytes()).and_then(|_| stream.flush()).is_err(),
            None => false,
        };
        if failed {
            self.close(id);
        }
    }
}

impl Default for NetworkHub {
    fn default() -> Self {
        NetworkHub::new()
    }
}

/// 受信スレッドを立て、書き込み用の複製をイベントで渡す
fn spawn_reader(id: ConnId, stream: TcpStream, tx: Sender<Event>) -> io::Result<()> {
    let writer = stream.try_clone()?;
    if tx.send(Event::Connected(id, writer)).is_err() {
        return Ok(());
    }
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            let line = line.trim_end_matches('\r').to_string();
            if tx.send(Event::Line(id, line)).is_err() {
                return;
            }
        }
        let _ = tx.send(Event::Closed(id));
    });
    Ok(())
}
