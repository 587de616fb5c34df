//! # EmailLogRepository
//!
//! 監査ログ（email_logs）の永続化を担当するリポジトリ。
//!
//! 接続の取得と INSERT を分けて実行し、どちらで失敗したかを
//! [`InfraError`] の種別で区別できるようにしている。

use async_trait::async_trait;
use mailflow_domain::email_log::EmailLog;
use sqlx::PgPool;

use crate::error::InfraError;

/// 監査ログリポジトリトレイト
#[async_trait]
pub trait EmailLogRepository: Send + Sync {
    /// 監査ログを挿入する
    ///
    /// 接続を取得できない場合は接続エラー、INSERT が拒否された場合は
    /// データベースエラーを返す。
    async fn insert(&self, log: &EmailLog) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の EmailLogRepository
#[derive(Debug, Clone)]
pub struct PostgresEmailLogRepository {
    pool: PgPool,
}

impl PostgresEmailLogRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailLogRepository for PostgresEmailLogRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(email_log.id = %log.id))]
    async fn insert(&self, log: &EmailLog) -> Result<(), InfraError> {
        let mut conn = self.pool.acquire().await.map_err(InfraError::connection)?;

        let status: &'static str = log.status.into();

        sqlx::query(
            r#"
            INSERT INTO email_logs (
                id, notification_type, "to", cc, subject, template,
                body, attachments, date, sent_at, status, error_message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(log.id.as_uuid())
        .bind(&log.notification_type)
        .bind(&log.to)
        .bind(&log.cc)
        .bind(&log.subject)
        .bind(&log.template)
        .bind(&log.body)
        .bind(&log.attachments)
        .bind(log.date)
        .bind(log.sent_at)
        .bind(status)
        .bind(&log.error_message)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
