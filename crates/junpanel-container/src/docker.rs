use crate::converter::{image_from_inspect, snapshot_from_inspect};
use crate::engine::{ContainerEngine, ContainerSnapshot, EngineConnector, ImageSnapshot};
use crate::error::{ContainerError, Result};
use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::{
    InspectContainerOptions, ListContainersOptions, RestartContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// ローカルの Docker デーモンへ接続するコネクタ
///
/// DOCKER_HOST が設定されていればそれを、なければ既定のソケットを使う。
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerConnector;

#[async_trait]
impl EngineConnector for DockerConnector {
    async fn connect(&self) -> Result<Arc<dyn ContainerEngine>> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| ContainerError::DockerConnectionFailed(e.to_string()))?;
        debug!("Docker クライアントを生成しました");
        Ok(Arc::new(DockerEngine::new(docker)))
    }
}

/// bollard による ContainerEngine 実装
#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }
}

fn grace_secs(grace: Duration) -> i32 {
    i32::try_from(grace.as_secs()).unwrap_or(i32::MAX)
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn ping(&self) -> Result<()> {
        self.docker
            .ping()
            .await
            .map_err(|e| ContainerError::DockerConnectionFailed(e.to_string()))?;
        Ok(())
    }

    async fn list_container_ids(&self, all: bool) -> Result<Vec<String>> {
        let options = ListContainersOptions {
            all,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        Ok(containers.into_iter().filter_map(|c| c.id).collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerSnapshot> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| ContainerError::from_bollard(e, id))?;
        Ok(snapshot_from_inspect(inspect))
    }

    async fn inspect_image(&self, image: &str) -> Result<ImageSnapshot> {
        let inspect = self.docker.inspect_image(image).await?;
        Ok(image_from_inspect(inspect))
    }

    async fn start(&self, id: &str) -> Result<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await
            .map_err(|e| ContainerError::from_bollard(e, id))
    }

    async fn stop(&self, id: &str, grace: Duration) -> Result<()> {
        let options = StopContainerOptions {
            t: Some(grace_secs(grace)),
            ..Default::default()
        };
        self.docker
            .stop_container(id, Some(options))
            .await
            .map_err(|e| ContainerError::from_bollard(e, id))
    }

    async fn restart(&self, id: &str, grace: Duration) -> Result<()> {
        let options = RestartContainerOptions {
            t: Some(grace_secs(grace)),
            ..Default::default()
        };
        self.docker
            .restart_container(id, Some(options))
            .await
            .map_err(|e| ContainerError::from_bollard(e, id))
    }

    async fn pause(&self, id: &str) -> Result<()> {
        self.docker
            .pause_container(id)
            .await
            .map_err(|e| ContainerError::from_bollard(e, id))
    }

    async fn unpause(&self, id: &str) -> Result<()> {
        self.docker
            .unpause_container(id)
            .await
            .map_err(|e| ContainerError::from_bollard(e, id))
    }
}
