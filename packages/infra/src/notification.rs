//! # 通知送信
//!
//! 組み立て済みメッセージの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（本番・Mailpit）、Noop（送信無効化）
//! - **環境変数切替**: `MAIL_BACKEND` でランタイム選択
//! - **失敗は 1 種類**: 接続・認証・送信・メッセージ構築の失敗はすべて
//!   `NotificationError::Delivery` として返す

mod noop;
mod smtp;

use async_trait::async_trait;
use mailflow_domain::{message::ComposedMessage, notification::NotificationError};
pub use noop::NoopNotificationSender;
pub use smtp::{SmtpConfig, SmtpNotificationSender, SmtpSecurity};

/// メール送信トレイト
///
/// 宛先（To + Cc）すべてに 1 通のメッセージとして送信する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, message: &ComposedMessage) -> Result<(), NotificationError>;
}
