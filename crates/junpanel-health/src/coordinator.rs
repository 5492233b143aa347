//! 複数 URL への一括ヘルスチェック

use crate::probe::{ServiceProbeResult, probe};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// 1 URL あたりのデフォルトタイムアウト（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// 一括チェックの結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckReport {
    pub results: Vec<ServiceProbeResult>,
    pub checked_at: DateTime<Utc>,
}

/// URL の疎通確認を並行実行する
///
/// 上限を指定しない場合はすべての URL を同時に確認するため、件数分のソケットを同時に開く。
/// 大量の URL を扱う場合は `max_concurrency` で同時実行数を制限する。
#[derive(Debug, Clone, Default)]
pub struct HealthProbeCoordinator {
    max_concurrency: Option<usize>,
}

impl HealthProbeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同時に実行するプローブ数の上限。0 は 1 として扱う
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.map(|n| n.max(1));
        self
    }

    /// 各 URL を1回ずつ確認し、入力と同じ順序で結果を返す
    pub async fn probe_all(&self, urls: &[String], timeout_secs: u64) -> Vec<ServiceProbeResult> {
        if urls.is_empty() {
            return Vec::new();
        }

        let client = match build_client(Duration::from_secs(timeout_secs)) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "HTTP クライアントの生成に失敗しました");
                return urls
                    .iter()
                    .map(|url| ServiceProbeResult::offline(url, format!("Request failed: {}", e)))
                    .collect();
            }
        };

        // 各 future はクライアントと URL を所有する
        let probes: Vec<_> = urls
            .iter()
            .map(|url| {
                let client = client.clone();
                let url = url.clone();
                async move { probe(&client, &url).await }
            })
            .collect();
        let results: Vec<ServiceProbeResult> = match self.max_concurrency {
            // buffered は入力順を保つ
            Some(limit) => stream::iter(probes).buffered(limit).collect().await,
            None => join_all(probes).await,
        };

        let online = results.iter().filter(|r| r.is_online).count();
        info!(total = results.len(), online, "ヘルスチェックが完了しました");
        results
    }

    /// `probe_all` の結果に完了時刻を付ける
    pub async fn check(&self, urls: &[String], timeout_secs: u64) -> HealthCheckReport {
        let results = self.probe_all(urls, timeout_secs).await;
        HealthCheckReport {
            results,
            checked_at: Utc::now(),
        }
    }
}

/// 疎通確認専用: 証明書を検証せず、プロキシも使わない
fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .no_proxy()
        .timeout(timeout)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::TIMEOUT_ERROR;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// `delay` 待ってから `status` を返すサーバー
    async fn serve_status(status: u16, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    tokio::time::sleep(delay).await;
                    let response = format!(
                        "HTTP/1.1 {} Probe\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                        status
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });
        format!("http://{}/", addr)
    }

    /// 接続を受け付けるが応答しないサーバー
    async fn serve_silent() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    drop(socket);
                });
            }
        });
        format!("http://{}/", addr)
    }

    /// 何も待ち受けていないポート
    fn closed_port() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = HealthProbeCoordinator::new().probe_all(&[], 1).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_good_and_timeout_targets_in_input_order() {
        let good = serve_status(200, Duration::from_millis(50)).await;
        let silent = serve_silent().await;
        let urls = vec![good.clone(), silent.clone()];

        let results = HealthProbeCoordinator::new().probe_all(&urls, 2).await;

        assert_eq!(results.len(), 2);

        assert_eq!(results[0].url, good);
        assert!(results[0].is_online);
        assert_eq!(results[0].status_code, Some(200));
        let elapsed = results[0].response_time_ms.unwrap();
        assert!(elapsed >= 50.0, "elapsed {elapsed} should include server delay");
        assert!(results[0].error.is_none());

        assert_eq!(results[1].url, silent);
        assert!(!results[1].is_online);
        assert_eq!(results[1].error.as_deref(), Some(TIMEOUT_ERROR));
        assert!(results[1].status_code.is_none());
        assert!(results[1].response_time_ms.is_none());
    }

    #[tokio::test]
    async fn test_error_status_counts_as_online() {
        let url = serve_status(503, Duration::ZERO).await;

        let results = HealthProbeCoordinator::new()
            .probe_all(std::slice::from_ref(&url), 2)
            .await;

        assert!(results[0].is_online);
        assert_eq!(results[0].status_code, Some(503));
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        let url = closed_port();

        let results = HealthProbeCoordinator::new()
            .probe_all(std::slice::from_ref(&url), 2)
            .await;

        assert!(!results[0].is_online);
        let error = results[0].error.as_deref().unwrap();
        assert!(error.starts_with("Connection error"), "got {error}");
    }

    #[tokio::test]
    async fn test_invalid_url_is_generic_failure() {
        let urls = vec!["not a url".to_string()];

        let results = HealthProbeCoordinator::new().probe_all(&urls, 1).await;

        assert_eq!(results[0].url, "not a url");
        assert!(!results[0].is_online);
        let error = results[0].error.as_deref().unwrap();
        assert!(error.starts_with("Request failed"), "got {error}");
    }

    #[tokio::test]
    async fn test_timeouts_do_not_delay_siblings() {
        let good = serve_status(200, Duration::ZERO).await;
        let mut urls = Vec::new();
        for _ in 0..5 {
            urls.push(serve_silent().await);
        }
        urls.insert(2, good.clone());
        urls.push(closed_port());

        let started = Instant::now();
        let results = HealthProbeCoordinator::new().probe_all(&urls, 1).await;
        let total = started.elapsed();

        assert_eq!(results.len(), urls.len());
        for (result, url) in results.iter().zip(&urls) {
            assert_eq!(&result.url, url);
        }
        assert!(results[2].is_online);
        assert_eq!(
            results.iter().filter(|r| r.error.as_deref() == Some(TIMEOUT_ERROR)).count(),
            5
        );
        // 並行実行なので全体でもタイムアウト1回分程度で終わる
        assert!(total < Duration::from_secs(3), "batch took {total:?}");
    }

    #[tokio::test]
    async fn test_bounded_concurrency_preserves_order() {
        let slow = serve_status(200, Duration::from_millis(200)).await;
        let fast = serve_status(204, Duration::ZERO).await;
        let urls = vec![slow.clone(), fast.clone(), slow.clone(), fast.clone()];

        let coordinator = HealthProbeCoordinator::new().with_max_concurrency(Some(2));
        let results = coordinator.probe_all(&urls, 2).await;

        let codes: Vec<_> = results.iter().map(|r| r.status_code).collect();
        assert_eq!(codes, vec![Some(200), Some(204), Some(200), Some(204)]);
    }

    #[tokio::test]
    async fn test_zero_concurrency_limit_still_probes() {
        let url = serve_status(200, Duration::ZERO).await;
        let coordinator = HealthProbeCoordinator::new().with_max_concurrency(Some(0));

        // 上限 0 のままだと buffered が進まず終わらない
        let results = tokio::time::timeout(
            Duration::from_secs(5),
            coordinator.probe_all(std::slice::from_ref(&url), 2),
        )
        .await
        .expect("probe_all should finish with a zero limit");

        assert_eq!(results.len(), 1);
        assert!(results[0].is_online);
    }

    #[tokio::test]
    async fn test_check_report_serialization() {
        let report = HealthProbeCoordinator::new().check(&[], 1).await;
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["results"], serde_json::json!([]));
        assert!(json["checked_at"].as_str().unwrap().ends_with('Z'));
    }
}
