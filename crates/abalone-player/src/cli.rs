//! コマンドライン
//!
//! `abalone-player [X|O] [<strength>] [-s <strategy>] [-n] [-<moves>] [-p [host:]port] [-v]`
//!
//! `-<数字>` は clap が解釈できないため、解析前に `--max-moves <数字>` へ書き換える。

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use thiserror::Error;

use abalone_core::search::{self, DEFAULT_STRATEGY};
use abalone_core::Color;

use crate::config::{parse_color, ConfigError, PlayerConfig, WorkerMode};
use crate::network::DEFAULT_PORT;

#[derive(Parser, Debug, Default)]
#[command(name = "abalone-player", about = "Abalone player with a distributed minimax search")]
pub struct Cli {
    /// Side to play (X or O) and/or search strength (plies)
    #[arg(value_name = "X|O|STRENGTH")]
    pub args: Vec<String>,

    /// Strategy number or name
    #[arg(short = 's', long = "strategy")]
    pub strategy: Option<String>,

    /// Do not change the evaluation after each own move
    #[arg(short = 'n', long = "no-change-eval")]
    pub no_change_eval: bool,

    /// Stop after drawing this many moves (also given as -<moves>)
    #[arg(long = "max-moves")]
    pub max_moves: Option<u32>,

    /// Local port, or host[:port] of a peer to connect to
    #[arg(short = 'p', long = "port", value_name = "[HOST:]PORT")]
    pub port: Vec<String>,

    /// Verbose output (repeat for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Number of workers for the first-ply search (0 = search in this process)
    #[arg(short = 'w', long = "workers")]
    pub workers: Option<usize>,

    /// How workers are run
    #[arg(long = "worker-mode", value_enum)]
    pub worker_mode: Option<WorkerMode>,

    /// Time limit per side in milliseconds, used when a received position has none
    #[arg(long = "time-limit", value_name = "MS")]
    pub time_limit: Option<u32>,

    /// TOML config file
    #[arg(long = "config")]
    pub config: Option<std::path::PathBuf>,

    #[arg(long = "worker-rank", hide = true, requires = "world_size")]
    pub worker_rank: Option<usize>,

    #[arg(long = "world-size", hide = true)]
    pub world_size: Option<usize>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid argument '{0}'")]
    Argument(String),
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
    #[error("invalid port '{0}'")]
    Port(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// 解決済みの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub color: Color,
    /// 探索の深さ（初手を含む手数、1 以上）
    pub max_depth: u32,
    pub strategy: usize,
    pub max_moves: Option<u32>,
    pub change_evaluation: bool,
    pub port: u16,
    /// 接続先（host:port）
    pub remote: Option<String>,
    pub workers: usize,
    pub worker_mode: WorkerMode,
    pub time_limit_ms: Option<u32>,
    pub verbose: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            color: Color::O,
            max_depth: 1,
            strategy: DEFAULT_STRATEGY,
            max_moves: None,
            change_evaluation: true,
            port: DEFAULT_PORT,
            remote: None,
            workers: 0,
            worker_mode: WorkerMode::Threads,
            time_limit_ms: None,
            verbose: 0,
        }
    }
}

/// 戦略一覧（ヘルプの末尾に付ける）
pub fn strategy_help() -> String {
    let mut text = String::from("Strategies:\n");
    for (i, name) in search::strategies().iter().enumerate() {
        let default = if i == DEFAULT_STRATEGY { " (default)" } else { "" };
        text.push_str(&format!("  {i:2} : Strategy '{name}'{default}\n"));
    }
    text
}

pub fn command() -> clap::Command {
    Cli::command().after_help(strategy_help())
}

/// `-<数字>` を `--max-moves <数字>` に置き換える
pub fn rewrite_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = Vec::new();
    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        let digits = arg
            .strip_prefix('-')
            .filter(|d| i > 0 && !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .map(str::to_string);
        match digits {
            Some(d) => {
                out.push("--max-moves".to_string());
                out.push(d);
            }
            None => out.push(arg),
        }
    }
    out
}

/// 引数を解析する（先頭はプログラム名）
pub fn parse_args<I, S>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let matches = command().try_get_matches_from(rewrite_args(args))?;
    Cli::from_arg_matches(&matches)
}

/// 戦略の番号または名前を解釈する
pub fn parse_strategy(s: &str) -> Result<usize, CliError> {
    let index = match s.parse::<usize>() {
        Ok(i) => Some(i).filter(|&i| i < search::strategies().len()),
        Err(_) => search::strategies().iter().position(|n| n.eq_ignore_ascii_case(s)),
    };
    index.ok_or_else(|| CliError::UnknownStrategy(s.to_string()))
}

fn parse_port(s: &str) -> Result<u16, CliError> {
    s.parse().map_err(|_| CliError::Port(s.to_string()))
}

/// `host[:port]` を `host:port` にする
fn remote_address(s: &str) -> Result<String, CliError> {
    match s.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => Ok(format!("{host}:{}", parse_port(port)?)),
        Some(_) => Err(CliError::Port(s.to_string())),
        None => Ok(format!("{s}:{DEFAULT_PORT}")),
    }
}

impl Settings {
    /// 設定ファイルの値にコマンドラインの値を上書きして解決する
    pub fn resolve(cli: &Cli, file: &PlayerConfig) -> Result<Settings, CliError> {
        let mut settings = Settings::default();

        if let Some(color) = file.color()? {
            settings.color = color;
        }
        if let Some(strength) = file.strength {
            settings.max_depth = strength;
        }
        if let Some(strategy) = file.strategy.as_deref() {
            settings.strategy = parse_strategy(strategy)?;
        }
        settings.max_moves = file.max_moves;
        if let Some(change) = file.change_evaluation {
            settings.change_evaluation = change;
        }
        if let Some(port) = file.port {
            settings.port = port;
        }
        if let Some(remote) = file.remote.as_deref() {
            settings.remote = Some(remote_address(remote)?);
        }
        settings.workers = file.workers.unwrap_or(0);
        settings.worker_mode = file.worker_mode.unwrap_or_default();
        settings.time_limit_ms = file.time_limit_ms;

        for arg in &cli.args {
            if let Some(color) = parse_color(arg) {
                settings.color = color;
            } else if let Ok(strength) = arg.parse::<u32>() {
                settings.max_depth = strength;
            } else {
                return Err(CliError::Argument(arg.clone()));
            }
        }
        if let Some(strategy) = cli.strategy.as_deref() {
            settings.strategy = parse_strategy(strategy)?;
        }
        if cli.no_change_eval {
            settings.change_evaluation = false;
        }
        if cli.max_moves.is_some() {
            settings.max_moves = cli.max_moves;
        }
        for p in &cli.port {
            // 1-9 で始まればローカルのポート、それ以外は接続先
            if p.starts_with(|c: char| ('1'..='9').contains(&c)) {
                settings.port = parse_port(p)?;
            } else {
                settings.remote = Some(remote_address(p)?);
            }
        }
        if let Some(workers) = cli.workers {
            settings.workers = workers;
        }
        if let Some(mode) = cli.worker_mode {
            settings.worker_mode = mode;
        }
        if cli.time_limit.is_some() {
            settings.time_limit_ms = cli.time_limit;
        }
        settings.verbose = cli.verbose;

        // 深さ 0 は 1 手読みとして扱う
        settings.max_depth = settings.max_depth.max(1);
        settings.max_moves = settings.max_moves.filter(|&n| n > 0);
        Ok(settings)
    }

    /// ワーカープロセスに渡す引数
    pub fn worker_args(&self) -> Vec<String> {
        let mut args = vec!["-s".to_string(), self.strategy.to_string(), self.max_depth.to_string()];
        if self.verbose > 0 {
            args.push(format!("-{}", "v".repeat(self.verbose as usize)));
        }
        args
    }
}
