//! テスト用のインメモリ Docker
//!
//! `test-utils` feature で公開される。状態遷移は Docker と同じ規則に従う。

use crate::engine::{ContainerEngine, ContainerSnapshot, EngineConnector, ImageSnapshot};
use crate::error::{ContainerError, Result};
use crate::model::ContainerState;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// テスト用コンテナ定義
#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub name: String,
    pub image_ref: String,
    pub image_id: String,
    pub state: ContainerState,
    pub created: String,
    pub ports: HashMap<String, Vec<Option<String>>>,
}

impl FakeContainer {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("/{}", name),
            image_ref: "busybox:latest".to_string(),
            image_id: "sha256:1111111111111111111111".to_string(),
            state: ContainerState::Running,
            created: "2024-01-01T00:00:00.000000000Z".to_string(),
            ports: HashMap::new(),
        }
    }

    pub fn image(mut self, image_ref: &str, image_id: &str) -> Self {
        self.image_ref = image_ref.to_string();
        self.image_id = image_id.to_string();
        self
    }

    pub fn state(mut self, state: ContainerState) -> Self {
        self.state = state;
        self
    }

    /// `host` が None の場合はホストポート未割当のバインディング
    pub fn port(mut self, spec: &str, host: Option<&str>) -> Self {
        self.ports
            .entry(spec.to_string())
            .or_default()
            .push(host.map(str::to_string));
        self
    }

    /// バインディングを1つも持たない公開ポート
    pub fn exposed(mut self, spec: &str) -> Self {
        self.ports.entry(spec.to_string()).or_default();
        self
    }
}

/// インメモリの Docker デーモン
pub struct FakeDocker {
    containers: Mutex<BTreeMap<String, FakeContainer>>,
    images: Mutex<HashMap<String, ImageSnapshot>>,
    vanishing: Mutex<Vec<String>>,
    reachable: AtomicBool,
    alive: AtomicBool,
    connect_delay: Option<Duration>,
    connects: AtomicUsize,
    engine_calls: AtomicUsize,
}

impl FakeDocker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    pub fn with_connect_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(Some(delay)))
    }

    fn build(connect_delay: Option<Duration>) -> Self {
        Self {
            containers: Mutex::new(BTreeMap::new()),
            images: Mutex::new(HashMap::new()),
            vanishing: Mutex::new(Vec::new()),
            reachable: AtomicBool::new(true),
            alive: AtomicBool::new(true),
            connect_delay,
            connects: AtomicUsize::new(0),
            engine_calls: AtomicUsize::new(0),
        }
    }

    pub fn connector(self: &Arc<Self>) -> Arc<dyn EngineConnector> {
        Arc::new(FakeConnector {
            docker: Arc::clone(self),
        })
    }

    /// false ならソケットが存在しない扱い（接続生成に失敗）
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// false ならデーモンが応答しない扱い（ping に失敗）
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// ping 以外のエンジン呼び出し回数
    pub fn engine_calls(&self) -> usize {
        self.engine_calls.load(Ordering::SeqCst)
    }

    pub fn add_container(&self, container: FakeContainer) {
        self.lock_containers()
            .insert(container.id.clone(), container);
    }

    pub fn remove_container(&self, id: &str) {
        self.lock_containers().remove(id);
    }

    /// 次の一覧取得の直後にコンテナを削除する（一覧と inspect の間に消えたコンテナ）
    pub fn vanish_after_listing(&self, id: &str) {
        self.vanishing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(id.to_string());
    }

    pub fn add_image(&self, id: &str, tags: &[&str]) {
        self.images.lock().unwrap_or_else(|e| e.into_inner()).insert(
            id.to_string(),
            ImageSnapshot {
                id: id.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        );
    }

    pub fn state_of(&self, id: &str) -> Option<ContainerState> {
        let containers = self.lock_containers();
        find_key(&containers, id).map(|key| containers[&key].state)
    }

    fn lock_containers(&self) -> MutexGuard<'_, BTreeMap<String, FakeContainer>> {
        self.containers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_alive(&self) -> Result<()> {
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ContainerError::DockerConnectionFailed(
                "daemon is not responding".to_string(),
            ))
        }
    }

    fn transition(
        &self,
        id: &str,
        apply: impl FnOnce(ContainerState) -> Result<ContainerState>,
    ) -> Result<()> {
        self.engine_calls.fetch_add(1, Ordering::SeqCst);
        self.check_alive()?;
        let mut containers = self.lock_containers();
        let key = find_key(&containers, id).ok_or_else(|| ContainerError::ContainerNotFound {
            container: id.to_string(),
        })?;
        let container = containers
            .get_mut(&key)
            .ok_or_else(|| ContainerError::ContainerNotFound {
                container: id.to_string(),
            })?;
        container.state = apply(container.state)?;
        Ok(())
    }
}

/// ID 完全一致、名前、ID 前方一致の順で探す
fn find_key(containers: &BTreeMap<String, FakeContainer>, id: &str) -> Option<String> {
    if containers.contains_key(id) {
        return Some(id.to_string());
    }
    let by_name = containers
        .values()
        .find(|c| c.name.trim_start_matches('/') == id.trim_start_matches('/'));
    if let Some(container) = by_name {
        return Some(container.id.clone());
    }
    let mut by_prefix = containers.keys().filter(|key| key.starts_with(id));
    match (by_prefix.next(), by_prefix.next()) {
        (Some(key), None) if !id.is_empty() => Some(key.clone()),
        _ => None,
    }
}

fn conflict(message: &str) -> ContainerError {
    ContainerError::DockerApiError(format!("409 Conflict: {}", message))
}

struct FakeConnector {
    docker: Arc<FakeDocker>,
}

#[async_trait]
impl EngineConnector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn ContainerEngine>> {
        if let Some(delay) = self.docker.connect_delay {
            tokio::time::sleep(delay).await;
        }
        self.docker.connects.fetch_add(1, Ordering::SeqCst);
        if !self.docker.reachable.load(Ordering::SeqCst) {
            return Err(ContainerError::DockerConnectionFailed(
                "No such file or directory".to_string(),
            ));
        }
        Ok(Arc::new(FakeEngine {
            docker: Arc::clone(&self.docker),
        }))
    }
}

/// 接続ごとに生成されるハンドル
struct FakeEngine {
    docker: Arc<FakeDocker>,
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn ping(&self) -> Result<()> {
        self.docker.check_alive()
    }

    async fn list_container_ids(&self, all: bool) -> Result<Vec<String>> {
        self.docker.engine_calls.fetch_add(1, Ordering::SeqCst);
        self.docker.check_alive()?;
        let ids: Vec<String> = self
            .docker
            .lock_containers()
            .values()
            .filter(|c| all || c.state == ContainerState::Running)
            .map(|c| c.id.clone())
            .collect();

        let vanishing: Vec<String> = self
            .docker
            .vanishing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for id in &vanishing {
            self.docker.remove_container(id);
        }

        Ok(ids)
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerSnapshot> {
        self.docker.engine_calls.fetch_add(1, Ordering::SeqCst);
        self.docker.check_alive()?;
        let containers = self.docker.lock_containers();
        let container = find_key(&containers, id)
            .and_then(|key| containers.get(&key))
            .ok_or_else(|| ContainerError::ContainerNotFound {
                container: id.to_string(),
            })?;
        Ok(ContainerSnapshot {
            id: container.id.clone(),
            name: container.name.clone(),
            image_ref: container.image_ref.clone(),
            image_id: container.image_id.clone(),
            status: container.state.as_str().to_string(),
            state: container.state,
            created: container.created.clone(),
            ports: container.ports.clone(),
        })
    }

    async fn inspect_image(&self, image: &str) -> Result<ImageSnapshot> {
        self.docker.engine_calls.fetch_add(1, Ordering::SeqCst);
        self.docker.check_alive()?;
        self.docker
            .images
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(image)
            .cloned()
            .ok_or_else(|| ContainerError::DockerApiError(format!("No such image: {}", image)))
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.docker.transition(id, |state| match state {
            ContainerState::Paused => Err(conflict("cannot start a paused container")),
            _ => Ok(ContainerState::Running),
        })
    }

    async fn stop(&self, id: &str, _grace: Duration) -> Result<()> {
        self.docker.transition(id, |state| match state {
            ContainerState::Running | ContainerState::Paused | ContainerState::Restarting => {
                Ok(ContainerState::Exited)
            }
            other => Ok(other),
        })
    }

    async fn restart(&self, id: &str, _grace: Duration) -> Result<()> {
        self.docker.transition(id, |_| Ok(ContainerState::Running))
    }

    async fn pause(&self, id: &str) -> Result<()> {
        self.docker.transition(id, |state| match state {
            ContainerState::Running => Ok(ContainerState::Paused),
            _ => Err(conflict("container is not running")),
        })
    }

    async fn unpause(&self, id: &str) -> Result<()> {
        self.docker.transition(id, |state| match state {
            ContainerState::Paused => Ok(ContainerState::Running),
            _ => Err(conflict("container is not paused")),
        })
    }
}
