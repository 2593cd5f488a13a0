//! abalone-player
//!
//! ```shell
//! # O 側、3 手読み、4 ワーカー（スレッド）で待ち受け
//! abalone-player O 3 -w 4
//! # X 側、別ホストのプレイヤーへ接続し、20 手指したら終了
//! abalone-player X 2 -p otherhost:23412 -20
//! ```

use std::io::Write;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

use abalone_core::search;
use abalone_player::cli::{self, Settings};
use abalone_player::comm::{
    local_world, CommError, Communicator, LocalComm, ProcessPool, StdioComm,
};
use abalone_player::config::{PlayerConfig, WorkerMode};
use abalone_player::{Coordinator, Engine, NetworkHub, PlayerDomain, Worker};

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .target(env_logger::Target::Stderr)
    .init();
}

/// 子プロセスとして起動されたワーカー
fn run_worker_process(rank: usize, size: usize, settings: &Settings) -> Result<()> {
    let strategy = search::create(settings.strategy, settings.max_depth)
        .with_context(|| format!("unknown strategy {}", settings.strategy))?;
    let comm = StdioComm::new(rank, size);
    Worker::new(comm, strategy).run().with_context(|| format!("worker {rank} failed"))
}

/// ワーカー群を起動してコーディネーター側の通信路を返す
fn start_workers(
    settings: &Settings,
) -> Result<(Box<dyn Communicator>, Vec<JoinHandle<Result<(), CommError>>>)> {
    match settings.worker_mode {
        WorkerMode::Threads => {
            let mut world = local_world(settings.workers + 1);
            let workers: Vec<LocalComm> = world.split_off(1);
            let coord = world.pop().context("empty worker world")?;
            let mut handles = Vec::with_capacity(workers.len());
            for comm in workers {
                let strategy = search::create(settings.strategy, settings.max_depth)
                    .with_context(|| format!("unknown strategy {}", settings.strategy))?;
                let rank = comm.rank();
                let handle = thread::Builder::new()
                    .name(format!("worker-{rank}"))
                    .spawn(move || Worker::new(comm, strategy).run())
                    .with_context(|| format!("failed to spawn worker thread {rank}"))?;
                handles.push(handle);
            }
            Ok((Box::new(coord), handles))
        }
        WorkerMode::Processes => {
            let exe = std::env::current_exe().context("failed to locate own executable")?;
            let pool = ProcessPool::spawn(&exe, &settings.worker_args(), settings.workers)
                .context("failed to start worker processes")?;
            Ok((Box::new(pool), Vec::new()))
        }
    }
}

fn main() -> Result<()> {
    let cli = match cli::parse_args(std::env::args()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_logger(cli.verbose);

    let file = match cli.config.as_deref() {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    let settings = match Settings::resolve(&cli, &file) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}\n");
            eprintln!("{}", cli::command().render_help());
            std::process::exit(2);
        }
    };

    if let (Some(rank), Some(size)) = (cli.worker_rank, cli.world_size) {
        return run_worker_process(rank, size, &settings);
    }
    log::debug!("{settings:?}");

    let strategy = search::create(settings.strategy, settings.max_depth)
        .with_context(|| format!("unknown strategy {}", settings.strategy))?;
    println!(
        "Using strategy '{}' (depth {}) for {} ...",
        strategy.name(),
        settings.max_depth,
        settings.color
    );

    let mut engine = Engine::new(settings.color, strategy).with_rotation(settings.change_evaluation);
    let mut worker_threads = Vec::new();
    if settings.workers > 0 {
        let (comm, handles) = start_workers(&settings)?;
        engine = engine.with_coordinator(Coordinator::new(comm)?);
        worker_threads = handles;
        log::info!("searching with {} workers ({:?})", settings.workers, settings.worker_mode);
    }

    let mut hub = NetworkHub::new();
    match hub.listen(settings.port) {
        Ok(port) => println!("Listening on port {port}"),
        // 接続先があれば待ち受けなしでも対局できる
        Err(e) if settings.remote.is_some() => log::warn!("{e}"),
        Err(e) => return Err(e.into()),
    }
    if let Some(remote) = settings.remote.as_deref() {
        hub.connect(remote)?;
    }

    let mut domain = PlayerDomain::new(engine)
        .with_max_moves(settings.max_moves)
        .with_time_limit(settings.time_limit_ms);
    hub.run(&mut domain)?;

    // コーディネーターを落とすとワーカーは切断を検知して抜ける
    drop(domain);
    for handle in worker_threads {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("worker failed: {e}"),
            Err(_) => log::warn!("worker thread panicked"),
        }
    }
    Ok(())
}
