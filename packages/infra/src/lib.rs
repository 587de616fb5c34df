//! # Mailflow インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とマイグレーション
//! - **リポジトリ実装**: 監査ログ（`email_logs`）の書き込み
//! - **メール送信**: SMTP / Noop の送信実装
//! - **添付ファイル**: 添付ディレクトリからの読み込み
//!
//! ## 依存関係
//!
//! ```text
//! mail-service → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`attachment`] - 添付ファイルストア
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信
//! - [`repository`] - リポジトリ実装

pub mod attachment;
pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use attachment::AttachmentStore;
pub use error::{InfraError, InfraErrorKind};
pub use notification::{
    NoopNotificationSender,
    NotificationSender,
    SmtpConfig,
    SmtpNotificationSender,
    SmtpSecurity,
};
