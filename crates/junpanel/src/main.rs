mod commands;

use clap::{Parser, Subcommand};
use junpanel_config::PanelConfig;
use junpanel_container::RuntimeClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "junpanel")]
#[command(about = "ナビゲーションダッシュボードのバックエンド", long_about = None)]
struct Cli {
    /// 設定ファイルのパス
    #[arg(short, long, env = "JUNPANEL_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// HTTP API サーバーを起動
    Serve {
        /// バインドするホスト
        #[arg(long, env = "JUNPANEL_HOST")]
        host: Option<String>,
        /// バインドするポート
        #[arg(short, long, env = "JUNPANEL_PORT")]
        port: Option<u16>,
    },
    /// Docker の接続状態を表示
    Status,
    /// コンテナの一覧を表示
    Ps {
        /// 停止中のコンテナも表示
        #[arg(short, long)]
        all: bool,
    },
    /// コンテナを操作 (start, stop, restart, pause, unpause)
    Action {
        /// コンテナ ID または名前
        container: String,
        /// 実行する操作
        action: String,
    },
    /// URL の疎通を確認
    Check {
        /// 確認する URL
        #[arg(required = true)]
        urls: Vec<String>,
        /// タイムアウト（秒）。省略時は設定ファイルの値
        #[arg(short, long)]
        timeout: Option<u64>,
    },
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<PanelConfig> {
    let config = match path {
        Some(path) => junpanel_config::load_from(path)?,
        None => junpanel_config::load()?.0,
    };
    Ok(config)
}

fn init_tracing(level: &str) {
    // RUST_LOG が設定されていればそちらを優先
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.log.level);

    let runtime = Arc::new(RuntimeClient::docker());

    match cli.command {
        Commands::Serve { host, port } => {
            commands::serve::handle(&config, runtime, host, port).await?;
        }
        Commands::Status => {
            commands::status::handle(&runtime).await?;
        }
        Commands::Ps { all } => {
            commands::ps::handle(runtime, all).await?;
        }
        Commands::Action { container, action } => {
            commands::action::handle(runtime, &container, &action).await?;
        }
        Commands::Check { urls, timeout } => {
            commands::check::handle(&config, &urls, timeout).await?;
        }
    }

    Ok(())
}
