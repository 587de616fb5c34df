//! # ドメイン層エラー定義
//!
//! 送信リクエストの検証で発生するエラー型。
//!
//! パイプライン実行中の失敗は [`crate::notification::NotificationError`] で表現し、
//! こちらは「パイプラインに入る前に弾く」入力不備のみを扱う。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
