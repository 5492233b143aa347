//! junpanel バックエンド
//!
//! Docker コンテナの操作と外部サービスのヘルスチェックを HTTP API として公開する。

pub mod api;
pub mod state;

pub use api::router;
pub use state::AppState;
