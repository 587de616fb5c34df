//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 送信を止めたい環境（ステージングなど）で使用する。

use async_trait::async_trait;
use mailflow_domain::{message::ComposedMessage, notification::NotificationError};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, message: &ComposedMessage) -> Result<(), NotificationError> {
        tracing::info!(
            to = %message.to.join(", "),
            cc = message.cc_header().as_deref().unwrap_or(""),
            subject = %message.subject,
            attachments = ?message.attachment_names(),
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}
