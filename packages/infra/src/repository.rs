//! # リポジトリ実装
//!
//! 監査ログストアへの書き込みを担当する。
//!
//! ## 設計方針
//!
//! - **追記のみ**: 監査ログは INSERT だけを提供し、更新・削除はしない
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod email_log_repository;

pub use email_log_repository::{EmailLogRepository, PostgresEmailLogRepository};
