//! HTTP API
//!
//! コア層の結果（可用性、ContainerError、プローブ結果）をステータスコードに対応付ける。
//! 503: Docker 利用不可 / 404: コンテナなし / 400: 未対応の操作 / 500: 操作失敗

use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use junpanel_container::{ContainerAction, ContainerError, ContainerRecord};
use junpanel_health::HealthCheckReport;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/docker/status", get(docker_status))
        .route("/api/docker/containers", get(list_containers))
        .route("/api/docker/containers/{id}", get(get_container))
        .route("/api/docker/containers/{id}/action", post(container_action))
        .route("/api/health/check", post(check_services))
        .with_state(state)
}

// ============================================================================
// リクエスト / レスポンス
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 停止中のコンテナも含める
    #[serde(default = "default_true")]
    pub all_containers: bool,
}

fn default_true() -> bool {
    true
}

/// 操作名は文字列で受け取り、未対応なら 400 を返す
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ServiceCheckRequest {
    pub urls: Vec<String>,
    pub timeout: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuntimeStatus {
    pub available: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub success: bool,
}

// ============================================================================
// エラー
// ============================================================================

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            detail: "Docker サービスが利用できません".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ContainerError> for ApiError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::RuntimeUnavailable | ContainerError::DockerConnectionFailed(_) => {
                Self::unavailable()
            }
            ContainerError::ContainerNotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                detail: "コンテナが存在しません".to_string(),
            },
            ContainerError::InvalidAction(_) => Self {
                status: StatusCode::BAD_REQUEST,
                detail: "サポートされていない操作です".to_string(),
            },
            ContainerError::ActionFailed { action, .. } => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: format!("操作 {} に失敗しました", action),
            },
            ContainerError::DockerApiError(message) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: message,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

// ============================================================================
// ハンドラ
// ============================================================================

async fn docker_status(State(state): State<AppState>) -> Json<RuntimeStatus> {
    let available = state.runtime.is_available().await;
    let message = if available {
        "Docker サービスは正常です"
    } else {
        "Docker サービスが利用できません"
    };
    Json(RuntimeStatus {
        available,
        message: message.to_string(),
    })
}

async fn list_containers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ContainerRecord>>, ApiError> {
    if !state.runtime.is_available().await {
        return Err(ApiError::unavailable());
    }
    Ok(Json(state.inspector.list(query.all_containers).await))
}

async fn get_container(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ContainerRecord>, ApiError> {
    if !state.runtime.is_available().await {
        return Err(ApiError::unavailable());
    }
    Ok(Json(state.inspector.get(&id).await?))
}

async fn container_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // エンジンに触れる前に操作名を検証する
    let action: ContainerAction = request.action.parse()?;

    state.dispatcher.dispatch(&id, action).await?;

    Ok(Json(MessageResponse {
        message: format!("コンテナの{}に成功しました", action.display_name()),
        success: true,
    }))
}

async fn check_services(
    State(state): State<AppState>,
    Json(request): Json<ServiceCheckRequest>,
) -> Json<HealthCheckReport> {
    let timeout = request.timeout.unwrap_or(state.default_timeout_secs);
    Json(state.probes.check(&request.urls, timeout).await)
}
