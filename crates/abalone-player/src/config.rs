//! 設定ファイル（TOML）
//!
//! ```toml
//! color = "X"
//! strength = 3
//! strategy = "MinMax"
//! max_moves = 40
//! workers = 4
//! worker_mode = "processes"
//! port = 23412
//! remote = "localhost:23413"
//! change_evaluation = false
//! time_limit_ms = 300000
//! ```
//!
//! すべて省略可能。コマンドラインで指定した値が優先される。

use std::path::{Path, PathBuf};

use abalone_core::Color;
use serde::Deserialize;
use thiserror::Error;

/// ワーカーの実行形態
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WorkerMode {
    /// 同一プロセス内のスレッド
    #[default]
    Threads,
    /// 子プロセス（同じバイナリを起動する）
    Processes,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// "O" または "X"
    pub color: Option<String>,
    pub strength: Option<u32>,
    /// 戦略名または番号
    pub strategy: Option<String>,
    pub max_moves: Option<u32>,
    pub workers: Option<usize>,
    pub worker_mode: Option<WorkerMode>,
    pub port: Option<u16>,
    pub remote: Option<String>,
    pub change_evaluation: Option<bool>,
    pub time_limit_ms: Option<u32>,
}

impl PlayerConfig {
    pub fn load(path: &Path) -> Result<PlayerConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = PlayerConfig::parse(&text)?;
        log::debug!("loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<PlayerConfig, ConfigError> {
        let config: PlayerConfig = toml::from_str(text)?;
        config.color()?;
        Ok(config)
    }

    /// `color` を解釈する
    pub fn color(&self) -> Result<Option<Color>, ConfigError> {
        let Some(label) = self.color.as_deref() else {
            return Ok(None);
        };
        parse_color(label)
            .map(Some)
            .ok_or_else(|| ConfigError::Invalid(format!("color must be O or X, got '{label}'")))
    }
}

/// "O" / "X"（大文字小文字は区別しない）
pub fn parse_color(s: &str) -> Option<Color> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Color::from_label(c),
        _ => None,
    }
}
