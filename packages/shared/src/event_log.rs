//! # ビジネスイベントログ
//!
//! `jq` で送信結果を追跡できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! バックグラウンド送信の結果は呼び出し元に返らないため、
//! 送信結果の観測手段はこのイベントログと監査ログ（`email_logs`）の 2 つに限られる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`event.action`）を使用する。
//! JSON 出力ではフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
        /// type が email 以外のため処理しなかった
        pub const NOTIFICATION_SKIPPED: &str = "notification.skipped";
        pub const NOTIFICATION_QUEUED: &str = "notification.queued";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const EMAIL_LOG: &str = "email_log";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
///
/// `tracing::error!` に `error.category` + `error.kind` として付与する。
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 設定不備（テンプレート未登録など）
        pub const CONFIGURATION: &str = "configuration";
        /// インフラストラクチャ（DB、SMTP）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// クライアント入力
        pub const REQUEST: &str = "request";
    }

    /// エラー種別
    pub mod kind {
        pub const TEMPLATE_NOT_FOUND: &str = "template_not_found";
        pub const RENDER: &str = "render";
        pub const DELIVERY: &str = "delivery";
        pub const DATABASE_CONNECTION: &str = "database_connection";
        pub const DATABASE_UPDATE: &str = "database_update";
        pub const INVALID_REQUEST: &str = "invalid_request";
    }
}
