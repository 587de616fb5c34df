//! # 通知
//!
//! 通知メール送信リクエストと、送信パイプラインのエラー分類を定義する。
//!
//! ## 設計方針
//!
//! - **ワイヤ形式の互換**: JSON のフィールド名は既存クライアントが送っている
//!   PascalCase（`EmailType`, `RecieverMail` など）をそのまま受け付ける
//! - **type による絞り込み**: `type` が大文字小文字を無視して `"email"` の場合のみ処理する。
//!   それ以外はエラーではなく何もしない
//! - **宛先の正規化**: 単一アドレス・配列のどちらでも受け付け、順序付きリストに揃える

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::DomainError;

/// パイプラインが処理する通知種別
pub const EMAIL_NOTIFICATION_TYPE: &str = "email";

/// 通知パイプラインのエラー
///
/// `IntoStaticStr` の値は構造化ログの `error.kind` にそのまま使う。
#[derive(Debug, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationError {
    /// リクエストの形式が不正（パイプライン開始前に検出）
    #[error("リクエストが不正です: {0}")]
    InvalidRequest(String),

    /// テンプレート名が登録表にない、またはテンプレートファイルがない
    #[error("テンプレートが見つかりません: {0}")]
    TemplateNotFound(String),

    /// テンプレートエンジンが出力を生成できなかった
    #[error("テンプレートレンダリングに失敗: {0}")]
    Render(String),

    /// SMTP の接続・認証・送信のいずれかに失敗
    #[error("メール送信に失敗: {0}")]
    Delivery(String),

    /// 監査ログストアへの接続に失敗
    #[error("監査ログストアへの接続に失敗: {0}")]
    DatabaseConnection(String),

    /// 監査ログの書き込みが拒否された
    #[error("監査ログの記録に失敗: {0}")]
    DatabaseUpdate(String),
}

impl NotificationError {
    /// 構造化ログ用のエラー種別
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<DomainError> for NotificationError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => Self::InvalidRequest(msg),
        }
    }
}

/// 宛先リスト
///
/// JSON 上は単一の文字列・文字列の配列・`null` のいずれでもよい。
/// 内部では常に順序付きの `Vec<String>` として保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<OneOrMany>", into = "Vec<String>")]
pub struct Recipients(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<Option<OneOrMany>> for Recipients {
    fn from(value: Option<OneOrMany>) -> Self {
        match value {
            None => Self::default(),
            Some(OneOrMany::One(address)) => Self(vec![address]),
            Some(OneOrMany::Many(addresses)) => Self(addresses),
        }
    }
}

impl From<Recipients> for Vec<String> {
    fn from(value: Recipients) -> Self {
        value.0
    }
}

impl From<Vec<String>> for Recipients {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl Recipients {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// ヘッダ値として `, ` 区切りで連結する
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

fn default_notification_type() -> String {
    EMAIL_NOTIFICATION_TYPE.to_string()
}

/// 通知メール送信リクエスト
///
/// パイプライン 1 回分の入力。生成後は変更しない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// 通知種別。`"email"`（大文字小文字は無視）以外は処理しない
    #[serde(rename = "Type", default = "default_notification_type")]
    pub notification_type: String,
    /// テンプレート名（テンプレート登録表のキー）
    #[serde(rename = "EmailType")]
    pub template_name:     String,
    /// テンプレートに渡す値
    #[serde(rename = "EmailBody", default)]
    pub email_body:        Map<String, Value>,
    /// 宛先
    #[serde(rename = "RecieverMail")]
    pub to:                Recipients,
    /// CC
    #[serde(rename = "CarbonCopyTo", default)]
    pub cc:                Recipients,
    /// 件名
    #[serde(rename = "Subject")]
    pub subject:           String,
    /// 添付ファイル名（添付ディレクトリからの相対名）
    #[serde(rename = "Attachments", default)]
    pub attachments:       Vec<String>,
}

impl NotificationRequest {
    /// パイプラインの処理対象（type が email）かどうか
    pub fn is_email(&self) -> bool {
        self.notification_type
            .eq_ignore_ascii_case(EMAIL_NOTIFICATION_TYPE)
    }

    /// リクエストの形式を検証する
    ///
    /// - 宛先が 1 件以上あること
    /// - すべてのアドレス（To / CC）が妥当な形式であること
    /// - 件名に改行を含まないこと（ヘッダインジェクション対策）
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.to.is_empty() {
            return Err(DomainError::Validation(
                "宛先（RecieverMail）は必須です".to_string(),
            ));
        }

        for address in self.to.as_slice().iter().chain(self.cc.as_slice()) {
            validate_address(address)?;
        }

        if self.subject.contains(['\r', '\n']) {
            return Err(DomainError::Validation(
                "件名に改行を含めることはできません".to_string(),
            ));
        }

        Ok(())
    }
}

/// メールアドレスの簡易検証
///
/// 厳密な RFC 5322 パースは SMTP 送信時に lettre が行う。
/// ここでは明らかな入力ミスだけを弾く。
fn validate_address(address: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::Validation(format!("メールアドレスの形式が不正です: {address:?}"));

    if address.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let Some((local, domain)) = address.split_once('@') else {
        return Err(invalid());
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    Ok(())
}
