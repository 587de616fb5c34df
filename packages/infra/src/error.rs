//! # インフラ層エラー定義
//!
//! 監査ログストア（PostgreSQL）との通信で発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Connection / Database）
//!
//! 接続の取得失敗と書き込み失敗は、パイプライン上で別のエラー
//! （`DatabaseConnection` / `DatabaseUpdate`）として呼び出し元に返すため、
//! 種別を分けて保持する。

use std::fmt;

use derive_more::Display;
use mailflow_domain::notification::NotificationError;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
/// `From<sqlx::Error>` や [`InfraError::connection`] でエラーを生成すると、
/// その時点のスパン情報が自動的にキャプチャされる。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 接続エラー
    ///
    /// プールから接続を取得できなかった（タイムアウト、接続拒否など）。
    #[error("データベース接続エラー: {0}")]
    Connection(#[source] sqlx::Error),

    /// データベースエラー
    ///
    /// 接続は取得できたがクエリが失敗した（制約違反、型不一致など）。
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 接続取得の失敗であるか
    pub fn is_connection(&self) -> bool {
        matches!(self.kind, InfraErrorKind::Connection(_))
    }

    // ===== Convenience constructors =====

    /// 接続エラーを生成する
    pub fn connection(source: sqlx::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Connection(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Database(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

/// 監査ログストアのエラーをパイプラインのエラーに変換する
///
/// 接続の取得失敗のみ `DatabaseConnection`、それ以外はすべて `DatabaseUpdate`。
impl From<InfraError> for NotificationError {
    fn from(e: InfraError) -> Self {
        if e.is_connection() {
            Self::DatabaseConnection(e.to_string())
        } else {
            Self::DatabaseUpdate(e.to_string())
        }
    }
}
