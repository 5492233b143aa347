pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "JUNPANEL_CONFIG_PATH";

/// カレントディレクトリで探すファイル名（優先順）
const CANDIDATES: [&str; 3] = ["junpanel.local.yaml", "junpanel.yaml", ".junpanel.yaml"];

/// junpanel の設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub server: ServerConfig,
    pub health: HealthConfig,
    pub log: LogConfig,
}

/// HTTP サーバー設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// ヘルスチェック設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// リクエストで timeout が省略されたときの秒数
    pub default_timeout_secs: u64,
    /// 同時に実行するプローブ数の上限（未指定なら無制限）
    pub max_concurrency: Option<usize>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 5,
            max_concurrency: None,
        }
    }
}

/// ログ設定（RUST_LOG が優先される）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// junpanel の設定ディレクトリ（~/.config/junpanel など）
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("junpanel"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 JUNPANEL_CONFIG_PATH (直接パス指定、存在しなければエラー)
/// 2. カレントディレクトリ: junpanel.local.yaml, junpanel.yaml, .junpanel.yaml
/// 3. ~/.config/junpanel/config.yaml (グローバル設定)
///
/// どこにもなければ None（デフォルト設定で起動する）。
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    // 2. カレントディレクトリで検索
    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. グローバル設定ファイル
    if let Some(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// 指定したファイルから設定を読み込む。省略された項目はデフォルト値
pub fn load_from(path: &Path) -> Result<PanelConfig> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(PanelConfig::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 設定を探して読み込む。見つかったファイルのパスも返す
pub fn load() -> Result<(PanelConfig, Option<PathBuf>)> {
    match find_config_file()? {
        Some(path) => Ok((load_from(&path)?, Some(path))),
        None => Ok((PanelConfig::default(), None)),
    }
}
