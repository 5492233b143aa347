use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(
        "Dockerに接続できません: {0}\n\nヒント:\n  • Dockerが起動しているか確認してください\n  • /var/run/docker.sock へのアクセス権限を確認してください"
    )]
    DockerConnectionFailed(String),

    #[error("Docker サービスが利用できません")]
    RuntimeUnavailable,

    #[error("コンテナ '{container}' が見つかりません")]
    ContainerNotFound { container: String },

    #[error("サポートされていない操作です: '{0}' (start, stop, restart, pause, unpause のいずれかを指定してください)")]
    InvalidAction(String),

    #[error("コンテナ '{container}' の {action} に失敗しました: {reason}")]
    ActionFailed {
        action: String,
        container: String,
        reason: String,
    },

    #[error("Docker APIエラー: {0}")]
    DockerApiError(String),
}

impl ContainerError {
    /// 404 を ContainerNotFound に振り分けて変換する
    pub fn from_bollard(err: bollard::errors::Error, container: &str) -> Self {
        match &err {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => ContainerError::ContainerNotFound {
                container: container.to_string(),
            },
            _ => err.into(),
        }
    }
}

impl From<bollard::errors::Error> for ContainerError {
    fn from(err: bollard::errors::Error) -> Self {
        match &err {
            bollard::errors::Error::DockerResponseServerError { .. } => {
                ContainerError::DockerApiError(err.to_string())
            }
            _ => {
                // 接続エラーの可能性をチェック
                let err_str = err.to_string();
                if err_str.contains("Connection refused")
                    || err_str.contains("No such file or directory")
                {
                    ContainerError::DockerConnectionFailed(err_str)
                } else {
                    ContainerError::DockerApiError(err_str)
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ContainerError>;
