//! # メッセージ組み立て
//!
//! リクエストとレンダリング済み HTML 本文から送信直前のメッセージを組み立てる。
//! ネットワークや DB へのアクセスはしない。
//!
//! 添付ファイルが見つからない場合は警告を出してスキップし、組み立ては続行する。

use mailflow_domain::{
    message::{ComposedMessage, Sender},
    notification::NotificationRequest,
};
use mailflow_infra::AttachmentStore;

/// メッセージ組み立て
pub struct MessageComposer {
    sender:      Sender,
    attachments: AttachmentStore,
}

impl MessageComposer {
    pub fn new(sender: Sender, attachments: AttachmentStore) -> Self {
        Self {
            sender,
            attachments,
        }
    }

    /// メッセージを組み立てる
    ///
    /// To / Cc / 件名はリクエストの値をそのまま使う。
    /// 添付はリクエストの順序で読み込み、読めたものだけを添付する。
    pub async fn compose(&self, request: &NotificationRequest, html_body: String) -> ComposedMessage {
        let mut attachments = Vec::with_capacity(request.attachments.len());
        for filename in &request.attachments {
            if let Some(attachment) = self.attachments.load(filename).await {
                tracing::info!(
                    filename = %attachment.filename,
                    content_type = %attachment.content_type,
                    size = attachment.content.len(),
                    "添付ファイルを追加"
                );
                attachments.push(attachment);
            }
        }

        ComposedMessage {
            from: self.sender.clone(),
            to: request.to.as_slice().to_vec(),
            cc: request.cc.as_slice().to_vec(),
            subject: request.subject.clone(),
            html_body,
            attachments,
        }
    }
}
