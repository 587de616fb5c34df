//! # 通知サービス
//!
//! テンプレートレンダリング → メッセージ組み立て → メール送信 → 監査ログ記録を
//! 1 回のパイプラインとして実行する。
//!
//! ## 設計方針
//!
//! - **type による絞り込み**: `type` が email 以外のリクエストは何もせず正常終了する
//! - **送信前の失敗は即中断**: テンプレート未登録・レンダリング失敗では監査ログを書かない
//! - **送信後は必ず監査ログ**: 組み立てまで到達したら、送信の成否にかかわらず 1 件記録する。
//!   送信失敗は記録のあとで呼び出し元に返す
//! - **依存性注入**: `NotificationSender` と `EmailLogRepository` は trait で抽象化

use std::sync::Arc;

use mailflow_domain::{
    clock::Clock,
    email_log::EmailLog,
    notification::{NotificationError, NotificationRequest},
};
use mailflow_infra::{notification::NotificationSender, repository::EmailLogRepository};
use mailflow_shared::{
    event_log::{error::category, event},
    log_business_event,
};

use super::{MessageComposer, TemplateRenderer};

/// パイプライン 1 回の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// type が email 以外のため処理しなかった
    Skipped,
    /// 送信と監査ログの記録が完了した
    Delivered,
}

/// 通知サービス
pub struct NotificationService {
    renderer: TemplateRenderer,
    composer: MessageComposer,
    sender:   Arc<dyn NotificationSender>,
    log_repo: Arc<dyn EmailLogRepository>,
    clock:    Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(
        renderer: TemplateRenderer,
        composer: MessageComposer,
        sender: Arc<dyn NotificationSender>,
        log_repo: Arc<dyn EmailLogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            renderer,
            composer,
            sender,
            log_repo,
            clock,
        }
    }

    /// パイプラインを実行する
    ///
    /// 送信と監査ログの両方が失敗した場合は監査ログのエラーを返し、
    /// 送信エラーはログにのみ残る。
    pub async fn run(
        &self,
        request: &NotificationRequest,
    ) -> Result<PipelineOutcome, NotificationError> {
        if !request.is_email() {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SKIPPED,
                event.result = event::result::SUCCESS,
                notification.notification_type = %request.notification_type,
                "email 以外の通知種別のため処理をスキップ"
            );
            return Ok(PipelineOutcome::Skipped);
        }

        let template = request.template_name.as_str();

        let html_body = self
            .renderer
            .render(template, &request.email_body, &request.subject)
            .inspect_err(|e| {
                tracing::error!(
                    error.category = error_category(e),
                    error.kind = e.kind(),
                    template,
                    "メール本文の生成に失敗: {}",
                    e
                );
            })?;

        let message = self.composer.compose(request, html_body).await;

        let sent_at = self.clock.now();
        let delivery = self.sender.send_email(&message).await;

        let recipient = request.to.joined();
        match &delivery {
            Ok(()) => log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SENT,
                event.entity_type = event::entity_type::EMAIL_LOG,
                event.result = event::result::SUCCESS,
                notification.template = template,
                notification.recipient = %recipient,
                notification.attachments = message.attachments.len(),
                "通知メール送信成功"
            ),
            Err(e) => log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_FAILED,
                event.entity_type = event::entity_type::EMAIL_LOG,
                event.result = event::result::FAILURE,
                notification.template = template,
                notification.recipient = %recipient,
                error = %e,
                "通知メール送信失敗"
            ),
        }

        let log = EmailLog::from_attempt(request, sent_at, delivery.as_ref().map(|_| ()));
        self.record(&log).await?;

        delivery.map(|()| PipelineOutcome::Delivered)
    }

    /// 監査ログを記録する
    async fn record(&self, log: &EmailLog) -> Result<(), NotificationError> {
        match self.log_repo.insert(log).await {
            Ok(()) => {
                tracing::info!(
                    email_log.id = %log.id,
                    email_log.status = %log.status,
                    "監査ログを記録"
                );
                Ok(())
            }
            Err(e) => {
                let error = NotificationError::from(e);
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = error.kind(),
                    email_log.id = %log.id,
                    email_log.status = %log.status,
                    "監査ログの記録に失敗: {}",
                    error
                );
                Err(error)
            }
        }
    }
}

/// エラーの発生源をログのカテゴリに対応付ける
pub(crate) fn error_category(error: &NotificationError) -> &'static str {
    match error {
        NotificationError::InvalidRequest(_) => category::REQUEST,
        NotificationError::TemplateNotFound(_) | NotificationError::Render(_) => {
            category::CONFIGURATION
        }
        NotificationError::Delivery(_)
        | NotificationError::DatabaseConnection(_)
        | NotificationError::DatabaseUpdate(_) => category::INFRASTRUCTURE,
    }
}
