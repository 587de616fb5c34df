//! # Mailflow ドメイン層
//!
//! 通知メール送信パイプラインのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **値オブジェクト**: 送信リクエスト、組み立て済みメッセージ、監査ログは不変
//! - **設定の注入**: テンプレート登録表は起動時に構築し、以後変更しない
//! - **エラー分類**: パイプラインの各段階の失敗を [`notification::NotificationError`] で表現
//!
//! ## 依存関係の方向
//!
//! ```text
//! mail-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、SMTP）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ
//! - [`email_log`] - 監査ログ（`email_logs`）
//! - [`error`] - ドメインエラー
//! - [`message`] - 組み立て済みメッセージと添付ファイル
//! - [`notification`] - 送信リクエストとパイプラインのエラー分類
//! - [`template`] - テンプレート登録表

#[macro_use]
mod macros;

pub mod clock;
pub mod email_log;
pub mod error;
pub mod message;
pub mod notification;
pub mod template;

pub use error::DomainError;
