//! # ユースケース層
//!
//! Mail Service の通知パイプラインを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 送信とリポジトリを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//!
//! ## モジュール構成
//!
//! - `notification`: 通知メールのレンダリング・送信・監査ログ記録

pub mod notification;

pub use notification::{
    BackgroundRunner,
    DispatchResult,
    DispatchStatus,
    Dispatcher,
    MessageComposer,
    NotificationService,
    TemplateRenderer,
    TokioBackgroundRunner,
};
