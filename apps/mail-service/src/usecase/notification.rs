//! # 通知ユースケース
//!
//! 通知メールの生成・送信・監査ログ記録を統合する。
//!
//! ## モジュール構成
//!
//! - [`table_formatter`] - 表データの HTML 化
//! - [`template_renderer`] - tera テンプレートエンジンによる本文生成
//! - [`composer`] - 添付ファイルを含むメッセージの組み立て
//! - [`service`] - レンダリング + 組み立て + 送信 + 監査ログ記録の統合サービス
//! - [`dispatcher`] - 同期実行とバックグラウンド実行の切り替え

pub mod composer;
pub mod dispatcher;
pub mod service;
pub mod table_formatter;
pub mod template_renderer;

pub use composer::MessageComposer;
pub use dispatcher::{
    BackgroundRunner,
    BackgroundTask,
    DispatchResult,
    DispatchStatus,
    Dispatcher,
    TokioBackgroundRunner,
};
pub use service::{NotificationService, PipelineOutcome};
pub use template_renderer::TemplateRenderer;
