//! Docker API のレスポンスから エンジン非依存のスナップショットへの変換

use crate::engine::{ContainerSnapshot, ImageSnapshot};
use crate::model::ContainerState;
use bollard::models::{
    ContainerInspectResponse, ContainerStateStatusEnum, ImageInspect, PortMap,
};
use std::collections::HashMap;

/// Docker のステータスを ContainerState に変換
pub fn state_from_docker(status: Option<ContainerStateStatusEnum>) -> ContainerState {
    match status {
        Some(ContainerStateStatusEnum::RUNNING) => ContainerState::Running,
        Some(ContainerStateStatusEnum::EXITED) => ContainerState::Exited,
        Some(ContainerStateStatusEnum::PAUSED) => ContainerState::Paused,
        Some(ContainerStateStatusEnum::RESTARTING) => ContainerState::Restarting,
        Some(ContainerStateStatusEnum::CREATED) => ContainerState::Created,
        Some(ContainerStateStatusEnum::DEAD) => ContainerState::Dead,
        // removing や空文字は一時的な状態なので unknown 扱い
        _ => ContainerState::Unknown,
    }
}

/// PortMap をポート仕様 → ホストポート一覧に変換
pub fn port_bindings_from_docker(ports: Option<PortMap>) -> HashMap<String, Vec<Option<String>>> {
    ports
        .unwrap_or_default()
        .into_iter()
        .map(|(spec, bindings)| {
            let hosts = bindings
                .unwrap_or_default()
                .into_iter()
                .map(|binding| binding.host_port)
                .collect();
            (spec, hosts)
        })
        .collect()
}

/// inspect の結果をスナップショットに変換
pub fn snapshot_from_inspect(inspect: ContainerInspectResponse) -> ContainerSnapshot {
    let state = state_from_docker(inspect.state.and_then(|s| s.status));
    let image_ref = inspect
        .config
        .and_then(|config| config.image)
        .unwrap_or_default();

    ContainerSnapshot {
        id: inspect.id.unwrap_or_default(),
        name: inspect.name.unwrap_or_default(),
        image_ref,
        image_id: inspect.image.unwrap_or_default(),
        status: state.as_str().to_string(),
        state,
        created: inspect.created.unwrap_or_default(),
        ports: port_bindings_from_docker(inspect.network_settings.and_then(|n| n.ports)),
    }
}

/// イメージ inspect の結果をスナップショットに変換
pub fn image_from_inspect(image: ImageInspect) -> ImageSnapshot {
    ImageSnapshot {
        id: image.id.unwrap_or_default(),
        tags: image.repo_tags.unwrap_or_default(),
    }
}
