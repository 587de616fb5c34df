//! # Clock（時刻プロバイダ）
//!
//! テンプレートに埋め込む日付と監査ログの送信時刻を、
//! テストで固定できるようにするための抽象化。

use chrono::{DateTime, Local, Utc};

/// テンプレートの `Date` 変数の書式（例: `October 19, 2026 09:30 AM`）
pub const RENDER_DATE_FORMAT: &str = "%B %d, %Y %I:%M %p";

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// テンプレート用の日付文字列を返す
    ///
    /// 書式は実行ごとに変わらない（[`RENDER_DATE_FORMAT`]）。
    /// タイムゾーンはプロセスのローカルタイムに揃える。
    fn render_date(&self) -> String {
        self.now()
            .with_timezone(&Local)
            .format(RENDER_DATE_FORMAT)
            .to_string()
    }
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻を返すテスト用実装
///
/// `render_date` も UTC で書式化するため、実行環境のタイムゾーンに依存しない。
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn render_date(&self) -> String {
        self.now.format(RENDER_DATE_FORMAT).to_string()
    }
}
