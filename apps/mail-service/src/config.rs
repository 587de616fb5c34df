//! # Mail Service 設定
//!
//! 環境変数から Mail Service サーバーの設定を読み込む。

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use mailflow_domain::message::Sender;
use mailflow_infra::{SmtpConfig, SmtpSecurity};
use thiserror::Error;

/// 送信元アドレスのフォールバック
const DEFAULT_FROM_ADDRESS: &str = "no-reply@example.com";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MailBackend {
    /// SMTP サーバー経由で送信
    #[default]
    Smtp,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// Mail Service サーバーの設定
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// バインドアドレス
    pub host:           String,
    /// ポート番号
    pub port:           u16,
    /// データベース接続 URL
    pub database_url:   String,
    /// テンプレートディレクトリ
    pub template_dir:   PathBuf,
    /// 添付ファイルディレクトリ
    pub attachment_dir: PathBuf,
    /// 送信設定
    pub notification:   NotificationConfig,
}

/// 送信機能の設定
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend: MailBackend,
    pub smtp:    SmtpConfig,
    /// 送信元
    pub from:    Sender,
}

impl MailConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列の値は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let smtp_user = get("SMTP_USER");
        let from_address = get("MAIL_FROM_ADDRESS")
            .or_else(|| smtp_user.clone())
            .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string());

        let smtp = SmtpConfig {
            host:     get("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            port:     parse_or("SMTP_PORT", get("SMTP_PORT"), 587)?,
            security: parse_or("SMTP_SECURITY", get("SMTP_SECURITY"), SmtpSecurity::default())?,
            username: smtp_user,
            password: get("SMTP_PASSWORD"),
            timeout:  Duration::from_secs(parse_or(
                "SMTP_TIMEOUT_SECS",
                get("SMTP_TIMEOUT_SECS"),
                30,
            )?),
        };

        Ok(Self {
            host: get("MAIL_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_required("MAIL_PORT", get("MAIL_PORT"))?,
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            template_dir: get("TEMPLATE_DIR")
                .unwrap_or_else(|| "apps/mail-service/templates".to_string())
                .into(),
            attachment_dir: get("ATTACHMENT_DIR")
                .unwrap_or_else(|| "Attachments".to_string())
                .into(),
            notification: NotificationConfig {
                backend: parse_or("MAIL_BACKEND", get("MAIL_BACKEND"), MailBackend::default())?,
                smtp,
                from: Sender::new(from_address, get("MAIL_FROM_NAME")),
            },
        })
    }
}

fn parse_required<T: FromStr>(name: &'static str, value: Option<String>) -> Result<T, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(name))?;
    parse_value(name, value)
}

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    value.map_or(Ok(default), |value| parse_value(name, value))
}

fn parse_value<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
