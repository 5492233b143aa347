use crate::error::Result;
use crate::model::ContainerState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// エンジンから取得したままのコンテナ情報（正規化前）
#[derive(Debug, Clone)]
pub struct ContainerSnapshot {
    /// フル ID
    pub id: String,
    /// 先頭の `/` が付いている場合がある
    pub name: String,
    /// 作成時に指定されたイメージ参照
    pub image_ref: String,
    pub image_id: String,
    pub status: String,
    pub state: ContainerState,
    pub created: String,
    /// ポート仕様ごとの各バインディングのホストポート
    pub ports: HashMap<String, Vec<Option<String>>>,
}

/// イメージのタグと ID
#[derive(Debug, Clone, Default)]
pub struct ImageSnapshot {
    pub id: String,
    pub tags: Vec<String>,
}

/// コンテナエンジンのトレイト
///
/// 1回の呼び出しはエンジンへの1往復で、リトライはしない。
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// 疎通確認
    async fn ping(&self) -> Result<()>;

    /// コンテナ ID 一覧（`all` が false なら起動中のみ）
    async fn list_container_ids(&self, all: bool) -> Result<Vec<String>>;

    async fn inspect_container(&self, id: &str) -> Result<ContainerSnapshot>;

    async fn inspect_image(&self, image: &str) -> Result<ImageSnapshot>;

    async fn start(&self, id: &str) -> Result<()>;

    /// `grace` 経過後もコンテナが終了しなければエンジンが強制終了する
    async fn stop(&self, id: &str, grace: Duration) -> Result<()>;

    async fn restart(&self, id: &str, grace: Duration) -> Result<()>;

    async fn pause(&self, id: &str) -> Result<()>;

    async fn unpause(&self, id: &str) -> Result<()>;
}

/// エンジンへの接続を生成する
#[async_trait]
pub trait EngineConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ContainerEngine>>;
}
