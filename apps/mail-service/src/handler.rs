//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、パイプラインはユースケース層に委譲

pub mod email;
pub mod health;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
pub use email::{DispatchMode, EmailState, SendEmailsQuery, send_emails};
pub use health::health_check;

/// Mail Service のルーター
pub fn router(state: Arc<EmailState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/send-emails", post(send_emails))
        .with_state(state)
}
