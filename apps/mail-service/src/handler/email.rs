//! # 通知メール送信ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/v1/send-emails` - 通知メールを送信する
//!
//! 既定ではバックグラウンドに投入して `202 Accepted` を返す。
//! `?mode=sync` を付けると送信と監査ログの記録まで待ち、`200 OK` を返す。
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "status": "processing",
//!   "message": "Email queued for sending",
//!   "details": {
//!     "template_used": "Table-Information",
//!     "recipient": ["tanaka@example.com"],
//!     "cc_recipients": [],
//!     "has_attachments": true,
//!     "sent_at": "2026-10-19T09:30:00+00:00"
//!   }
//! }
//! ```

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query,
        State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use mailflow_domain::{clock::Clock, notification::NotificationRequest};
use serde::{Deserialize, Serialize};

use crate::{
    error::MailError,
    usecase::notification::{BackgroundRunner, DispatchStatus, Dispatcher},
};

/// 通知メール API の共有状態
pub struct EmailState {
    pub dispatcher: Dispatcher,
    pub runner:     Arc<dyn BackgroundRunner>,
    pub clock:      Arc<dyn Clock>,
}

/// 実行モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// バックグラウンドに投入して即座に返す
    #[default]
    Background,
    /// 完了まで待つ
    Sync,
}

/// クエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct SendEmailsQuery {
    #[serde(default)]
    pub mode: DispatchMode,
}

/// 送信レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct SendEmailsResponse {
    pub status:  DispatchStatus,
    pub message: String,
    pub details: SendEmailsDetails,
}

/// 送信レスポンスの詳細
#[derive(Debug, Serialize, Deserialize)]
pub struct SendEmailsDetails {
    pub template_used:   String,
    pub recipient:       Vec<String>,
    pub cc_recipients:   Vec<String>,
    pub has_attachments: bool,
    pub sent_at:         String,
}

/// POST /api/v1/send-emails
///
/// ## レスポンス
///
/// - `202 Accepted`: バックグラウンドに投入した
/// - `200 OK`: 同期実行が完了した
/// - `400 Bad Request`: リクエストが不正
/// - `404 Not Found`: テンプレートが登録されていない（同期実行のみ）
/// - `5xx`: レンダリング・送信・監査ログの失敗（同期実行のみ）
#[tracing::instrument(skip_all)]
pub async fn send_emails(
    State(state): State<Arc<EmailState>>,
    query: Result<Query<SendEmailsQuery>, QueryRejection>,
    body: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, MailError> {
    let Query(query) = query.map_err(|e| MailError::BadRequest(e.body_text()))?;
    let Json(request) = body.map_err(|e| MailError::BadRequest(e.body_text()))?;

    let details = SendEmailsDetails {
        template_used:   request.template_name.clone(),
        recipient:       request.to.as_slice().to_vec(),
        cc_recipients:   request.cc.as_slice().to_vec(),
        has_attachments: !request.attachments.is_empty(),
        sent_at:         state.clock.now().to_rfc3339(),
    };

    let runner = match query.mode {
        DispatchMode::Background => Some(state.runner.as_ref()),
        DispatchMode::Sync => None,
    };

    let result = state.dispatcher.dispatch(request, runner).await?;

    let status = match result.status {
        DispatchStatus::Processing => StatusCode::ACCEPTED,
        DispatchStatus::Success => StatusCode::OK,
    };

    Ok((
        status,
        Json(SendEmailsResponse {
            status: result.status,
            message: result.message,
            details,
        }),
    ))
}
