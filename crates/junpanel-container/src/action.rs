use crate::client::RuntimeClient;
use crate::error::{ContainerError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// stop / restart で強制終了までに待つ時間
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// コンテナに対して実行できる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
    Pause,
    Unpause,
}

impl ContainerAction {
    pub const ALL: [ContainerAction; 5] = [
        ContainerAction::Start,
        ContainerAction::Stop,
        ContainerAction::Restart,
        ContainerAction::Pause,
        ContainerAction::Unpause,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
            ContainerAction::Pause => "pause",
            ContainerAction::Unpause => "unpause",
        }
    }

    /// 完了メッセージ用の表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            ContainerAction::Start => "起動",
            ContainerAction::Stop => "停止",
            ContainerAction::Restart => "再起動",
            ContainerAction::Pause => "一時停止",
            ContainerAction::Unpause => "再開",
        }
    }
}

impl std::fmt::Display for ContainerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerAction {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self> {
        ContainerAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ContainerError::InvalidAction(s.to_string()))
    }
}

/// 操作をエンジンの状態遷移呼び出しに振り分ける
#[derive(Clone)]
pub struct ActionDispatcher {
    runtime: Arc<RuntimeClient>,
}

impl ActionDispatcher {
    pub fn new(runtime: Arc<RuntimeClient>) -> Self {
        Self { runtime }
    }

    /// コンテナに操作を実行する
    ///
    /// エンジン側のエラー（存在しない、不正な状態遷移、権限など）は区別せず
    /// ActionFailed として返す。リトライはしない。
    pub async fn dispatch(&self, id: &str, action: ContainerAction) -> Result<()> {
        let engine = self
            .runtime
            .engine()
            .await
            .ok_or(ContainerError::RuntimeUnavailable)?;

        let outcome = match action {
            ContainerAction::Start => engine.start(id).await,
            ContainerAction::Stop => engine.stop(id, STOP_GRACE_PERIOD).await,
            ContainerAction::Restart => engine.restart(id, STOP_GRACE_PERIOD).await,
            ContainerAction::Pause => engine.pause(id).await,
            ContainerAction::Unpause => engine.unpause(id).await,
        };

        match outcome {
            Ok(()) => {
                info!(container = %id, action = %action, "コンテナ操作が完了しました");
                Ok(())
            }
            Err(e) => {
                error!(container = %id, action = %action, error = %e, "コンテナ操作に失敗しました");
                Err(ContainerError::ActionFailed {
                    action: action.to_string(),
                    container: id.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// 成否だけを返す版
    pub async fn dispatch_checked(&self, id: &str, action: ContainerAction) -> bool {
        self.dispatch(id, action).await.is_ok()
    }
}
