//! API 境界でやり取りするコンテナ情報の正規化モデル

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// コンテナの状態（エンジン側が管理し、ローカルでは追跡しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Running,
    Exited,
    Paused,
    Restarting,
    Created,
    Dead,
    Unknown,
}

impl ContainerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Exited => "exited",
            ContainerState::Paused => "paused",
            ContainerState::Restarting => "restarting",
            ContainerState::Created => "created",
            ContainerState::Dead => "dead",
            ContainerState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// エンジンから毎回取り直すコンテナ情報。キャッシュも永続化もしない
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub state: ContainerState,
    /// エンジンの表現をそのまま保持する（パースしない）
    pub created: String,
    pub ports: BTreeMap<String, Vec<String>>,
}

/// コンテナ ID の短縮形（先頭12文字）
pub fn short_container_id(id: &str) -> String {
    id.chars().take(12).collect()
}

/// イメージ ID の短縮形
///
/// `sha256:` 付きの場合はプレフィックス込みで19文字、それ以外は先頭12文字。
pub fn short_image_id(id: &str) -> String {
    if id.starts_with("sha256:") {
        id.chars().take(19).collect()
    } else {
        id.chars().take(12).collect()
    }
}

/// ポートバインディングを正規化する
///
/// ホストポートが1つも割り当てられていないポート仕様は結果に含めない。
pub fn normalize_ports(
    bindings: &HashMap<String, Vec<Option<String>>>,
) -> BTreeMap<String, Vec<String>> {
    bindings
        .iter()
        .filter_map(|(spec, hosts)| {
            let bound: Vec<String> = hosts
                .iter()
                .flatten()
                .filter(|port| !port.is_empty())
                .cloned()
                .collect();
            (!bound.is_empty()).then(|| (spec.clone(), bound))
        })
        .collect()
}

/// 表示用のイメージ名を決定する
///
/// 1. タグがあれば最初のタグ
/// 2. タグがなければイメージの短縮 ID
pub fn resolve_image(tags: &[String], image_id: &str) -> String {
    match tags.first() {
        Some(tag) => tag.clone(),
        None => short_image_id(image_id),
    }
}
