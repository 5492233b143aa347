use crate::client::RuntimeClient;
use crate::engine::ContainerEngine;
use crate::error::{ContainerError, Result};
use crate::model::{ContainerRecord, normalize_ports, resolve_image, short_container_id};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, error};

/// コンテナ一覧・詳細の取得
#[derive(Clone)]
pub struct ContainerInspector {
    runtime: Arc<RuntimeClient>,
}

impl ContainerInspector {
    pub fn new(runtime: Arc<RuntimeClient>) -> Self {
        Self { runtime }
    }

    /// コンテナ一覧を取得
    ///
    /// Docker が利用できない場合やエラー時は空のリストを返す。
    pub async fn list(&self, include_stopped: bool) -> Vec<ContainerRecord> {
        let Some(engine) = self.runtime.engine().await else {
            return Vec::new();
        };

        let ids = match engine.list_container_ids(include_stopped).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "コンテナ一覧の取得に失敗しました");
                return Vec::new();
            }
        };

        let described = join_all(ids.iter().map(|id| describe(engine.as_ref(), id))).await;

        ids.iter()
            .zip(described)
            .filter_map(|(id, result)| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    // 一覧取得後に削除されたコンテナなど
                    debug!(container = %id, error = %e, "コンテナをスキップします");
                    None
                }
            })
            .collect()
    }

    /// 単一コンテナの情報を取得
    ///
    /// 見つからない場合以外のエラーもログに残した上で ContainerNotFound に畳み込む。
    pub async fn get(&self, id: &str) -> Result<ContainerRecord> {
        let engine = self
            .runtime
            .engine()
            .await
            .ok_or(ContainerError::RuntimeUnavailable)?;

        match describe(engine.as_ref(), id).await {
            Ok(record) => Ok(record),
            Err(e @ ContainerError::ContainerNotFound { .. }) => Err(e),
            Err(e) => {
                error!(container = %id, error = %e, "コンテナ情報の取得に失敗しました");
                Err(ContainerError::ContainerNotFound {
                    container: id.to_string(),
                })
            }
        }
    }
}

/// エンジンの情報を ContainerRecord に正規化する
async fn describe(engine: &dyn ContainerEngine, id: &str) -> Result<ContainerRecord> {
    let snapshot = engine.inspect_container(id).await?;

    let image = match engine.inspect_image(&snapshot.image_id).await {
        Ok(image) => resolve_image(&image.tags, &image.id),
        Err(e) => {
            debug!(image = %snapshot.image_id, error = %e, "イメージ情報を取得できません");
            if snapshot.image_ref.is_empty() {
                resolve_image(&[], &snapshot.image_id)
            } else {
                snapshot.image_ref.clone()
            }
        }
    };

    Ok(ContainerRecord {
        id: short_container_id(&snapshot.id),
        name: snapshot.name.trim_start_matches('/').to_string(),
        image,
        status: snapshot.status,
        state: snapshot.state,
        created: snapshot.created,
        ports: normalize_ports(&snapshot.ports),
    })
}
