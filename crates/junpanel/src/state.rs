use junpanel_config::HealthConfig;
use junpanel_container::{ActionDispatcher, ContainerInspector, RuntimeClient};
use junpanel_health::HealthProbeCoordinator;
use std::sync::Arc;

/// ハンドラ間で共有する状態
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<RuntimeClient>,
    pub inspector: ContainerInspector,
    pub dispatcher: ActionDispatcher,
    pub probes: HealthProbeCoordinator,
    /// リクエストで timeout が省略されたときの秒数
    pub default_timeout_secs: u64,
}

impl AppState {
    pub fn new(runtime: Arc<RuntimeClient>, health: &HealthConfig) -> Self {
        Self {
            inspector: ContainerInspector::new(runtime.clone()),
            dispatcher: ActionDispatcher::new(runtime.clone()),
            runtime,
            probes: HealthProbeCoordinator::new().with_max_concurrency(health.max_concurrency),
            default_timeout_secs: health.default_timeout_secs,
        }
    }
}
