use junpanel::AppState;
use junpanel_config::HealthConfig;
use junpanel_container::testing::{FakeContainer, FakeDocker};
use junpanel_container::{ContainerState, RuntimeClient};
use serde_json::{Value, json};
use std::sync::Arc;

const WEB_ID: &str = "4f2a9c1b7d3e8f00aa11bb22cc33dd44";
const DB_ID: &str = "9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c4b";

struct TestApp {
    base: String,
    docker: Arc<FakeDocker>,
    http: reqwest::Client,
}

impl TestApp {
    async fn spawn() -> Self {
        let docker = FakeDocker::new();
        docker.add_image("sha256:aaaaaaaaaaaaaaaaaaaa", &["nginx:alpine"]);
        docker.add_container(
            FakeContainer::new(WEB_ID, "web")
                .image("nginx:alpine", "sha256:aaaaaaaaaaaaaaaaaaaa")
                .port("80/tcp", Some("8080")),
        );
        docker.add_container(
            FakeContainer::new(DB_ID, "db")
                .image("postgres:16", "sha256:bbbbbbbbbbbbbbbbbbbb")
                .state(ContainerState::Exited),
        );

        let runtime = Arc::new(RuntimeClient::new(docker.connector()));
        let state = AppState::new(runtime, &HealthConfig::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, junpanel::router(state)).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            docker,
            http: reqwest::Client::builder().no_proxy().build().unwrap(),
        }
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .http
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_docker_status() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/docker/status").await;
    assert_eq!(status, 200);
    assert_eq!(body["available"], json!(true));

    app.docker.set_alive(false);
    let (_, body) = app.get("/api/docker/status").await;
    assert_eq!(body["available"], json!(false));
}

#[tokio::test]
async fn test_list_containers() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/docker/containers").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app
        .get("/api/docker/containers?all_containers=false")
        .await;
    assert_eq!(status, 200);
    let running = body.as_array().unwrap();
    assert_eq!(running.len(), 1);
    assert_eq!(running[0]["name"], json!("web"));
}

#[tokio::test]
async fn test_list_containers_unavailable() {
    let app = TestApp::spawn().await;
    app.docker.set_reachable(false);

    let (status, body) = app.get("/api/docker/containers").await;

    assert_eq!(status, 503);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_get_container_record_shape() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/api/docker/containers/web").await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "id": "4f2a9c1b7d3e",
            "name": "web",
            "image": "nginx:alpine",
            "status": "running",
            "state": "running",
            "created": "2024-01-01T00:00:00.000000000Z",
            "ports": { "80/tcp": ["8080"] },
        })
    );
}

#[tokio::test]
async fn test_get_container_not_found_and_unavailable() {
    let app = TestApp::spawn().await;

    let (status, _) = app.get("/api/docker/containers/ghost").await;
    assert_eq!(status, 404);

    app.docker.set_alive(false);
    let (status, _) = app.get("/api/docker/containers/web").await;
    assert_eq!(status, 503);
}

#[tokio::test]
async fn test_container_action_success() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post(
            "/api/docker/containers/web/action",
            json!({ "action": "stop" }),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], json!(true));
    assert_eq!(app.docker.state_of(WEB_ID), Some(ContainerState::Exited));
}

#[tokio::test]
async fn test_container_action_unknown_is_bad_request() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .post(
            "/api/docker/containers/web/action",
            json!({ "action": "kill" }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(app.docker.engine_calls(), 0);
    assert_eq!(app.docker.state_of(WEB_ID), Some(ContainerState::Running));
}

#[tokio::test]
async fn test_container_action_failure_names_action() {
    let app = TestApp::spawn().await;

    // 停止中のコンテナは一時停止できない
    let (status, body) = app
        .post("/api/docker/containers/db/action", json!({ "action": "pause" }))
        .await;

    assert_eq!(status, 500);
    assert!(body["detail"].as_str().unwrap().contains("pause"));
}

#[tokio::test]
async fn test_container_action_unavailable() {
    let app = TestApp::spawn().await;
    app.docker.set_reachable(false);

    let (status, _) = app
        .post(
            "/api/docker/containers/web/action",
            json!({ "action": "restart" }),
        )
        .await;

    assert_eq!(status, 503);
}

#[tokio::test]
async fn test_health_check_batch() {
    let app = TestApp::spawn().await;

    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}/", listener.local_addr().unwrap())
    };
    let own_status = format!("{}/api/docker/status", app.base);

    let (status, body) = app
        .post(
            "/api/health/check",
            json!({ "urls": [own_status, closed], "timeout": 2 }),
        )
        .await;

    assert_eq!(status, 200);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["url"], json!(own_status));
    assert_eq!(results[0]["is_online"], json!(true));
    assert_eq!(results[0]["status_code"], json!(200));
    assert!(results[0]["response_time"].is_number());

    assert_eq!(results[1]["url"], json!(closed));
    assert_eq!(results[1]["is_online"], json!(false));
    assert!(results[1]["error"].is_string());
    assert!(results[1].get("status_code").is_none());

    assert!(body["checked_at"].is_string());
}

#[tokio::test]
async fn test_health_check_empty_batch_uses_default_timeout() {
    let app = TestApp::spawn().await;

    let (status, body) = app.post("/api/health/check", json!({ "urls": [] })).await;

    assert_eq!(status, 200);
    assert_eq!(body["results"], json!([]));
}
