//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailflow-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mailflow_domain::{
    email_log::EmailLog,
    message::ComposedMessage,
    notification::NotificationError,
};

use crate::{error::InfraError, notification::NotificationSender, repository::EmailLogRepository};

// ===== MockNotificationSender =====

/// 送信したメッセージを記録するモック送信
///
/// [`failing`](Self::failing) で作成すると、記録したうえで常に `Delivery` エラーを返す。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:         Arc<Mutex<Vec<ComposedMessage>>>,
    fail_message: Option<String>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 送信に失敗するモックを作成する
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent:         Arc::new(Mutex::new(Vec::new())),
            fail_message: Some(message.into()),
        }
    }

    /// 送信を試みたメッセージの一覧
    pub fn sent_messages(&self) -> Vec<ComposedMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, message: &ComposedMessage) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(message.clone());
        match &self.fail_message {
            Some(msg) => Err(NotificationError::Delivery(msg.clone())),
            None => Ok(()),
        }
    }
}

// ===== MockEmailLogRepository =====

/// 監査ログの失敗モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockLogFailure {
    /// 接続を取得できない
    Connection,
    /// INSERT が拒否される
    Update,
}

/// 監査ログをメモリに記録するモックリポジトリ
#[derive(Clone, Default)]
pub struct MockEmailLogRepository {
    logs:    Arc<Mutex<Vec<EmailLog>>>,
    failure: Option<MockLogFailure>,
}

impl MockEmailLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 書き込みに失敗するモックを作成する
    pub fn failing(failure: MockLogFailure) -> Self {
        Self {
            logs:    Arc::new(Mutex::new(Vec::new())),
            failure: Some(failure),
        }
    }

    /// 記録された監査ログの一覧
    pub fn logs(&self) -> Vec<EmailLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailLogRepository for MockEmailLogRepository {
    async fn insert(&self, log: &EmailLog) -> Result<(), InfraError> {
        match self.failure {
            Some(MockLogFailure::Connection) => {
                Err(InfraError::connection(sqlx::Error::PoolTimedOut))
            }
            Some(MockLogFailure::Update) => Err(InfraError::from(sqlx::Error::Protocol(
                "email_logs への INSERT が拒否されました".to_string(),
            ))),
            None => {
                self.logs.lock().unwrap().push(log.clone());
                Ok(())
            }
        }
    }
}
