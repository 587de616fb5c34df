//! # ディスパッチャ
//!
//! パイプラインを同期で実行するか、バックグラウンドに投入するかを決める。
//!
//! - バックグラウンド実行: 投入した時点で `processing` を返す。以後の結果は
//!   呼び出し元に返らず、ログと監査ログの `status` でのみ観測できる
//! - 同期実行: パイプラインの完了を待ち、エラーはそのまま返す
//!
//! 投入前の検証エラーはログに出したうえで返す。握りつぶさない。

use std::{future::Future, pin::Pin, sync::Arc};

use mailflow_domain::notification::{NotificationError, NotificationRequest};
use mailflow_shared::{event_log::event, log_business_event};
use serde::{Deserialize, Serialize};

use super::{
    NotificationService,
    service::{PipelineOutcome, error_category},
};

/// バックグラウンドで実行する処理
pub type BackgroundTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// バックグラウンド実行基盤
///
/// 投入した処理の結果を受け取る手段は持たない。
pub trait BackgroundRunner: Send + Sync {
    fn submit(&self, task: BackgroundTask);
}

/// tokio ランタイムに spawn する実装
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioBackgroundRunner;

impl BackgroundRunner for TokioBackgroundRunner {
    fn submit(&self, task: BackgroundTask) {
        tokio::spawn(task);
    }
}

/// ディスパッチ結果の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DispatchStatus {
    /// バックグラウンドに投入した
    Processing,
    /// 同期実行が完了した
    Success,
}

/// ディスパッチ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub status:  DispatchStatus,
    pub message: String,
}

impl DispatchResult {
    fn processing() -> Self {
        Self {
            status:  DispatchStatus::Processing,
            message: "Email queued for sending".to_string(),
        }
    }

    fn completed(outcome: PipelineOutcome) -> Self {
        let message = match outcome {
            PipelineOutcome::Delivered => "Email sent successfully",
            PipelineOutcome::Skipped => "Notification type is not email; nothing was sent",
        };
        Self {
            status:  DispatchStatus::Success,
            message: message.to_string(),
        }
    }
}

/// ディスパッチャ
#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<NotificationService>,
}

impl Dispatcher {
    pub fn new(service: Arc<NotificationService>) -> Self {
        Self { service }
    }

    /// リクエストを実行する
    ///
    /// `runner` を渡した場合はバックグラウンドに投入して即座に返る。
    pub async fn dispatch(
        &self,
        request: NotificationRequest,
        runner: Option<&dyn BackgroundRunner>,
    ) -> Result<DispatchResult, NotificationError> {
        if request.is_email() {
            request
                .validate()
                .map_err(NotificationError::from)
                .inspect_err(|e| {
                    tracing::error!(
                        error.category = error_category(e),
                        error.kind = e.kind(),
                        template = %request.template_name,
                        "通知リクエストの検証に失敗: {}",
                        e
                    );
                })?;
        }

        let Some(runner) = runner else {
            let outcome = self.service.run(&request).await?;
            return Ok(DispatchResult::completed(outcome));
        };

        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::NOTIFICATION_QUEUED,
            event.result = event::result::SUCCESS,
            notification.template = %request.template_name,
            notification.recipient = %request.to.joined(),
            "通知メールをバックグラウンドに投入"
        );

        let service = Arc::clone(&self.service);
        runner.submit(Box::pin(async move {
            if let Err(e) = service.run(&request).await {
                tracing::error!(
                    error.category = error_category(&e),
                    error.kind = e.kind(),
                    template = %request.template_name,
                    "バックグラウンドの通知処理に失敗: {}",
                    e
                );
            }
        }));

        Ok(DispatchResult::processing())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use mailflow_domain::{
        clock::{Clock, FixedClock},
        email_log::DeliveryStatus,
        message::Sender,
        template::{TemplateDescriptor, TemplateRegistry},
    };
    use mailflow_infra::{
        AttachmentStore,
        mock::{MockEmailLogRepository, MockNotificationSender},
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::usecase::notification::{MessageComposer, TemplateRenderer};

    /// 投入された処理を実行せずに保持するランナー
    #[derive(Default)]
    struct RecordingRunner {
        tasks: Mutex<Vec<BackgroundTask>>,
    }

    impl RecordingRunner {
        fn take(&self) -> Vec<BackgroundTask> {
            std::mem::take(&mut *self.tasks.lock().unwrap())
        }
    }

    impl BackgroundRunner for RecordingRunner {
        fn submit(&self, task: BackgroundTask) {
            self.tasks.lock().unwrap().push(task);
        }
    }

    fn make_dispatcher(
        sender: MockNotificationSender,
        log_repo: MockEmailLogRepository,
    ) -> Dispatcher {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(Utc::now()));
        let renderer = TemplateRenderer::from_raw(
            vec![("plain.html", "<p>{{ Reciever_Name }}</p>")],
            TemplateRegistry::new([TemplateDescriptor::new(
                "Normal-Information",
                "plain.html",
                false,
            )]),
            Arc::clone(&clock),
        )
        .unwrap();
        let composer = MessageComposer::new(
            Sender::new("notice@example.com", None),
            AttachmentStore::new(std::env::temp_dir().join("mailflow-no-attachments")),
        );
        Dispatcher::new(Arc::new(NotificationService::new(
            renderer,
            composer,
            Arc::new(sender),
            Arc::new(log_repo),
            clock,
        )))
    }

    fn make_request(value: serde_json::Value) -> NotificationRequest {
        serde_json::from_value(value).unwrap()
    }

    fn valid_request() -> NotificationRequest {
        make_request(json!({
            "EmailType": "Normal-Information",
            "RecieverMail": "tanaka@example.com",
            "Subject": "件名",
            "EmailBody": {"Reciever_Name": "田中"}
        }))
    }

    #[tokio::test]
    async fn ランナーを渡すとレンダリング前にprocessingを返す() {
        let sender = MockNotificationSender::new();
        let log_repo = MockEmailLogRepository::new();
        let sut = make_dispatcher(sender.clone(), log_repo.clone());
        let runner = RecordingRunner::default();

        let result = sut.dispatch(valid_request(), Some(&runner)).await.unwrap();

        assert_eq!(result.status, DispatchStatus::Processing);
        assert_eq!(result.message, "Email queued for sending");
        assert!(sender.sent_messages().is_empty());
        assert!(log_repo.logs().is_empty());
        assert_eq!(runner.take().len(), 1);
    }

    #[tokio::test]
    async fn 投入された処理を実行すると送信と監査ログの記録が行われる() {
        let sender = MockNotificationSender::new();
        let log_repo = MockEmailLogRepository::new();
        let sut = make_dispatcher(sender.clone(), log_repo.clone());
        let runner = RecordingRunner::default();

        sut.dispatch(valid_request(), Some(&runner)).await.unwrap();
        for task in runner.take() {
            task.await;
        }

        assert_eq!(sender.sent_messages().len(), 1);
        assert_eq!(log_repo.logs().len(), 1);
    }

    #[tokio::test]
    async fn バックグラウンドの失敗は呼び出し元に返らない() {
        let log_repo = MockEmailLogRepository::new();
        let sut = make_dispatcher(MockNotificationSender::failing("refused"), log_repo.clone());
        let runner = RecordingRunner::default();

        let result = sut.dispatch(valid_request(), Some(&runner)).await;
        for task in runner.take() {
            task.await;
        }

        assert!(result.is_ok());
        assert_eq!(log_repo.logs()[0].status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn ランナーがない場合は同期実行してsuccessを返す() {
        let sender = MockNotificationSender::new();
        let sut = make_dispatcher(sender.clone(), MockEmailLogRepository::new());

        let result = sut.dispatch(valid_request(), None).await.unwrap();

        assert_eq!(result.status, DispatchStatus::Success);
        assert_eq!(result.message, "Email sent successfully");
        assert_eq!(sender.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn 同期実行の送信失敗はそのまま返す() {
        let sut = make_dispatcher(
            MockNotificationSender::failing("refused"),
            MockEmailLogRepository::new(),
        );

        let result = sut.dispatch(valid_request(), None).await;

        assert!(matches!(result, Err(NotificationError::Delivery(_))));
    }

    #[tokio::test]
    async fn 検証エラーは投入前に返す() {
        let sut = make_dispatcher(MockNotificationSender::new(), MockEmailLogRepository::new());
        let runner = RecordingRunner::default();
        let request = make_request(json!({
            "EmailType": "Normal-Information",
            "RecieverMail": "not-an-address",
            "Subject": "件名"
        }));

        let result = sut.dispatch(request, Some(&runner)).await;

        assert!(matches!(result, Err(NotificationError::InvalidRequest(_))));
        assert!(runner.take().is_empty());
    }

    #[tokio::test]
    async fn email以外の通知種別は検証せず同期実行でsuccessを返す() {
        let sender = MockNotificationSender::new();
        let sut = make_dispatcher(sender.clone(), MockEmailLogRepository::new());
        let request = make_request(json!({
            "Type": "sms",
            "EmailType": "Normal-Information",
            "RecieverMail": [],
            "Subject": "件名"
        }));

        let result = sut.dispatch(request, None).await.unwrap();

        assert_eq!(result.status, DispatchStatus::Success);
        assert!(sender.sent_messages().is_empty());
    }

    #[test]
    fn dispatch_statusは小文字でシリアライズされる() {
        assert_eq!(
            serde_json::to_value(DispatchStatus::Processing).unwrap(),
            json!("processing")
        );
        assert_eq!(DispatchStatus::Success.to_string(), "success");
    }
}
