//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//!
//! 暗号化は `SMTP_SECURITY` で選ぶ。既定の STARTTLS では、認証情報は
//! TLS へのアップグレード後にのみ送られる。

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{
        Attachment as MimeAttachment,
        Mailbox,
        Message,
        MultiPart,
        SinglePart,
        header::ContentType,
    },
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use mailflow_domain::{message::ComposedMessage, notification::NotificationError};

use super::NotificationSender;

/// SMTP の暗号化方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SmtpSecurity {
    /// 平文で接続し、STARTTLS で必ずアップグレードする
    #[default]
    Starttls,
    /// 接続時から TLS（SMTPS）
    Tls,
    /// 暗号化なし（Mailpit などのローカルリレー向け）
    #[strum(serialize = "none")]
    Plain,
}

/// SMTP 接続設定
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host:     String,
    pub port:     u16,
    pub security: SmtpSecurity,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 接続・送信の I/O タイムアウト
    pub timeout:  Duration,
}

impl SmtpConfig {
    /// ユーザー名とパスワードの両方が空でない場合のみ認証情報を返す
    ///
    /// 認証情報がない場合は匿名リレーとして扱う。
    fn credentials(&self) -> Option<Credentials> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some(Credentials::new(user.to_string(), password.to_string()))
            }
            _ => None,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 接続はまだ行わない。TLS パラメータの構築に失敗した場合のみエラーを返す。
    pub fn new(config: &SmtpConfig) -> Result<Self, lettre::transport::smtp::Error> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host);

        let builder = match config.security {
            SmtpSecurity::Starttls => {
                builder.tls(Tls::Required(TlsParameters::new(config.host.clone())?))
            }
            SmtpSecurity::Tls => builder.tls(Tls::Wrapper(TlsParameters::new(config.host.clone())?)),
            SmtpSecurity::Plain => builder,
        };

        let builder = builder.port(config.port).timeout(Some(config.timeout));

        let builder = match config.credentials() {
            Some(credentials) => builder.credentials(credentials),
            None => builder,
        };

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, message: &ComposedMessage) -> Result<(), NotificationError> {
        let email = build_message(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Delivery(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}

/// 組み立て済みメッセージを lettre の `Message` に変換する
///
/// HTML 本文 1 つと添付ファイルを `multipart/mixed` にまとめる。
/// 複数の CC は 1 つの Cc ヘッダにカンマ区切りで並ぶ。
fn build_message(message: &ComposedMessage) -> Result<Message, NotificationError> {
    let from = mailbox(&message.from.address, message.from.display_name.clone())?;

    let mut builder = Message::builder().from(from).subject(&message.subject);
    for to in &message.to {
        builder = builder.to(mailbox(to, None)?);
    }
    for cc in &message.cc {
        builder = builder.cc(mailbox(cc, None)?);
    }

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(message.html_body.clone()));
    for attachment in &message.attachments {
        let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
            NotificationError::Delivery(format!(
                "添付ファイルの Content-Type が不正です（{}）: {e}",
                attachment.filename
            ))
        })?;
        body = body.singlepart(
            MimeAttachment::new(attachment.filename.clone())
                .body(attachment.content.clone(), content_type),
        );
    }

    builder
        .multipart(body)
        .map_err(|e| NotificationError::Delivery(format!("メッセージ構築失敗: {e}")))
}

fn mailbox(address: &str, name: Option<String>) -> Result<Mailbox, NotificationError> {
    let address: Address = address.parse().map_err(|e| {
        NotificationError::Delivery(format!("メールアドレス不正（{address}）: {e}"))
    })?;
    Ok(Mailbox::new(name, address))
}
