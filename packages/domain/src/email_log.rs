//! # 監査ログ（email_logs）
//!
//! 送信試行 1 回ごとの記録。送信の成否にかかわらず必ず 1 件書き込み、
//! 以後は更新しない。送信成功の唯一の判断材料は [`EmailLog::status`] である。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::notification::{NotificationError, NotificationRequest};

define_uuid_id! {
    /// 監査ログ ID
    ///
    /// email_logs テーブルの主キー。UUID v7 を使用。
    pub struct EmailLogId;
}

/// 送信結果
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failed,
}

/// 監査ログ
#[derive(Debug, Clone, PartialEq)]
pub struct EmailLog {
    pub id:                EmailLogId,
    pub notification_type: String,
    pub to:                Vec<String>,
    pub cc:                Vec<String>,
    pub subject:           String,
    pub template:          String,
    /// リクエストの EmailBody をそのまま保存する
    pub body:              Value,
    /// リクエストで指定された添付ファイル名（実際に添付できたかは問わない）
    pub attachments:       Vec<String>,
    /// 実行日
    pub date:              NaiveDate,
    /// 送信を試みた時刻
    pub sent_at:           DateTime<Utc>,
    pub status:            DeliveryStatus,
    /// 送信失敗時のエラー内容
    pub error_message:     Option<String>,
}

impl EmailLog {
    /// 送信試行の結果から監査ログを作成する
    pub fn from_attempt(
        request: &NotificationRequest,
        sent_at: DateTime<Utc>,
        outcome: Result<(), &NotificationError>,
    ) -> Self {
        let (status, error_message) = match outcome {
            Ok(()) => (DeliveryStatus::Success, None),
            Err(e) => (DeliveryStatus::Failed, Some(e.to_string())),
        };

        Self {
            id: EmailLogId::new(),
            notification_type: request.notification_type.clone(),
            to: request.to.as_slice().to_vec(),
            cc: request.cc.as_slice().to_vec(),
            subject: request.subject.clone(),
            template: request.template_name.clone(),
            body: Value::Object(request.email_body.clone()),
            attachments: request.attachments.clone(),
            date: sent_at.date_naive(),
            sent_at,
            status,
            error_message,
        }
    }
}
