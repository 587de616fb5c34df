//! # 組み立て済みメッセージ
//!
//! テンプレートのレンダリング結果と添付ファイルから組み立てた、
//! 送信直前のメールを表す。送信結果とは独立しており、1 回の送信ごとに新しく作る。

/// 送信元
///
/// 表示名がある場合は `Name <address>` 形式、ない場合はアドレスのみを
/// From ヘッダに使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub address:      String,
    pub display_name: Option<String>,
}

impl Sender {
    pub fn new(address: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.filter(|name| !name.trim().is_empty()),
        }
    }

    /// From ヘッダの値
    pub fn header_value(&self) -> String {
        match &self.display_name {
            Some(name) => format!("{name} <{}>", self.address),
            None => self.address.clone(),
        }
    }
}

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// リクエストで指定されたファイル名
    pub filename:     String,
    /// MIME タイプ（拡張子から推定）
    pub content_type: String,
    pub content:      Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename);
        Self {
            filename,
            content_type,
            content,
        }
    }
}

/// 拡張子から MIME タイプを推定する
///
/// 推定できない拡張子は `application/octet-stream` として扱う。
pub fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

/// 組み立て済みメッセージ
///
/// HTML 本文 1 つと 0 個以上の添付ファイルを持つ multipart メール。
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    pub from:        Sender,
    pub to:          Vec<String>,
    pub cc:          Vec<String>,
    pub subject:     String,
    pub html_body:   String,
    pub attachments: Vec<Attachment>,
}

impl ComposedMessage {
    /// Cc ヘッダの値（`, ` 区切り）。CC がない場合はヘッダを付けない
    pub fn cc_header(&self) -> Option<String> {
        if self.cc.is_empty() {
            None
        } else {
            Some(self.cc.join(", "))
        }
    }

    /// 実際に添付されたファイル名
    pub fn attachment_names(&self) -> Vec<&str> {
        self.attachments
            .iter()
            .map(|attachment| attachment.filename.as_str())
            .collect()
    }
}
