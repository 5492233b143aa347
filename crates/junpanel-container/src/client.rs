//! コンテナエンジンへの共有接続
//!
//! 接続は最初に必要になった時点で確立し、利用のたびに ping で生存確認する。
//! ping に失敗したハンドルは破棄され、次の呼び出しで改めて接続を試みる。

use crate::docker::DockerConnector;
use crate::engine::{ContainerEngine, EngineConnector};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// プロセス全体で1つだけ共有するエンジンクライアント
///
/// キャッシュされるのは ping に成功したハンドルだけで、
/// 生成済みだが疎通確認前のハンドルが呼び出し側に見えることはない。
pub struct RuntimeClient {
    connector: Arc<dyn EngineConnector>,
    handle: RwLock<Option<Arc<dyn ContainerEngine>>>,
}

impl RuntimeClient {
    pub fn new(connector: Arc<dyn EngineConnector>) -> Self {
        Self {
            connector,
            handle: RwLock::new(None),
        }
    }

    /// ローカルの Docker デーモンを使うクライアント
    pub fn docker() -> Self {
        Self::new(Arc::new(DockerConnector))
    }

    /// エンジンが利用可能かどうか
    ///
    /// 失敗はすべて false に畳み込まれ、エラーとしては返らない。
    pub async fn is_available(&self) -> bool {
        self.engine().await.is_some()
    }

    /// 直近の生存確認に成功したハンドル
    pub async fn handle(&self) -> Option<Arc<dyn ContainerEngine>> {
        self.handle.read().await.clone()
    }

    /// 生存確認済みのハンドルを返す。必要なら新しく接続する
    pub async fn engine(&self) -> Option<Arc<dyn ContainerEngine>> {
        if let Some(cached) = self.handle().await {
            return match cached.ping().await {
                Ok(()) => Some(cached),
                Err(e) => {
                    warn!(error = %e, "Docker が応答しません。接続を破棄します");
                    self.invalidate(&cached).await;
                    None
                }
            };
        }

        let fresh = match self.connector.connect().await {
            Ok(engine) => engine,
            Err(e) => {
                warn!(error = %e, "Docker 接続失敗");
                return None;
            }
        };

        if let Err(e) = fresh.ping().await {
            warn!(error = %e, "Docker 接続失敗");
            return None;
        }

        // 同時に接続した場合は先に登録されたハンドルに合わせる
        let mut slot = self.handle.write().await;
        match slot.as_ref() {
            Some(existing) => {
                debug!("他の呼び出しが登録済みの接続を使用します");
                Some(existing.clone())
            }
            None => {
                info!("Docker に接続しました");
                *slot = Some(fresh.clone());
                Some(fresh)
            }
        }
    }

    /// キャッシュがまだ `stale` を指している場合だけ破棄する
    async fn invalidate(&self, stale: &Arc<dyn ContainerEngine>) {
        let mut slot = self.handle.write().await;
        if slot
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, stale))
        {
            *slot = None;
        }
    }
}
