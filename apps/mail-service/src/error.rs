//! # Mail Service エラー定義
//!
//! パイプラインのエラーと、HTTP レスポンスへの変換を定義する。
//!
//! 5xx 系はサーバー側の詳細を返さず、ログにのみ残す。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailflow_domain::notification::NotificationError;
use serde::Serialize;
use thiserror::Error;

const ERROR_TYPE_BASE: &str = "https://mailflow.example.com/errors";

/// エラーレスポンス（RFC 7807 Problem Details）
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

/// Mail Service で発生するエラー
#[derive(Debug, Error)]
pub enum MailError {
    /// パイプラインのエラー
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// リクエストボディを解釈できない
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),
}

impl MailError {
    fn status_code(&self) -> StatusCode {
        match self {
            MailError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MailError::Notification(e) => match e {
                NotificationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                NotificationError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
                NotificationError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
                NotificationError::Delivery(_) => StatusCode::BAD_GATEWAY,
                NotificationError::DatabaseConnection(_) | NotificationError::DatabaseUpdate(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            },
        }
    }

    fn slug_and_title(&self) -> (&'static str, &'static str) {
        match self {
            MailError::BadRequest(_) => ("bad-request", "Bad Request"),
            MailError::Notification(e) => match e {
                NotificationError::InvalidRequest(_) => ("validation-error", "Validation Error"),
                NotificationError::TemplateNotFound(_) => {
                    ("template-not-found", "Template Not Found")
                }
                NotificationError::Render(_) => ("render-error", "Render Error"),
                NotificationError::Delivery(_) => ("delivery-error", "Delivery Error"),
                NotificationError::DatabaseConnection(_) | NotificationError::DatabaseUpdate(_) => {
                    ("audit-store-unavailable", "Audit Store Unavailable")
                }
            },
        }
    }
}

impl IntoResponse for MailError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (slug, title) = self.slug_and_title();

        let detail = if status.is_server_error() {
            tracing::error!(
                error.category = "infrastructure",
                error.kind = slug,
                "リクエスト処理で内部エラー: {}",
                self
            );
            "内部エラーが発生しました".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error_type: format!("{ERROR_TYPE_BASE}/{slug}"),
                title: title.to_string(),
                status: status.as_u16(),
                detail,
            }),
        )
            .into_response()
    }
}
