//! サービスのヘルスチェック
//!
//! URL ごとに HTTP で疎通を確認し、入力と同じ順序で結果を返す。
//! 1件の失敗はその結果に記録されるだけで、他の URL には影響しない。

pub mod coordinator;
pub mod probe;

pub use coordinator::*;
pub use probe::*;
