//! 単一 URL の疎通確認

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// タイムアウト時に記録するエラー文字列
pub const TIMEOUT_ERROR: &str = "Timeout";

/// 1 URL の確認結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceProbeResult {
    pub url: String,
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// レスポンスヘッダー受信までのミリ秒（小数点以下2桁）
    #[serde(
        rename = "response_time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub response_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceProbeResult {
    pub fn online(url: impl Into<String>, status_code: u16, response_time_ms: f64) -> Self {
        Self {
            url: url.into(),
            is_online: true,
            status_code: Some(status_code),
            response_time_ms: Some(response_time_ms),
            error: None,
        }
    }

    pub fn offline(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_online: false,
            status_code: None,
            response_time_ms: None,
            error: Some(error.into()),
        }
    }
}

/// `url` に GET を1回送る。HTTP ステータスが返れば内容によらずオンライン
///
/// タイムアウトと証明書の扱いはクライアント側の設定に従う。リトライはしない。
pub async fn probe(client: &reqwest::Client, url: &str) -> ServiceProbeResult {
    let started = Instant::now();

    match client.get(url).send().await {
        Ok(response) => {
            let elapsed_ms = round_ms(started.elapsed().as_secs_f64() * 1000.0);
            let status = response.status().as_u16();
            debug!(url, status, elapsed_ms, "サービスはオンラインです");
            ServiceProbeResult::online(url, status, elapsed_ms)
        }
        Err(err) => {
            let diagnostic = describe_error(&err);
            debug!(url, error = %diagnostic, "サービスに接続できません");
            ServiceProbeResult::offline(url, diagnostic)
        }
    }
}

/// 失敗したリクエストの短い説明
pub fn describe_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        TIMEOUT_ERROR.to_string()
    } else if err.is_connect() {
        format!("Connection error: {}", root_cause(err))
    } else {
        format!("Request failed: {}", root_cause(err))
    }
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}
