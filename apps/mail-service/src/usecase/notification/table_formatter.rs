//! # 表フォーマッタ
//!
//! 行データ（JSON オブジェクトの配列）を HTML の表に変換する。副作用なし。
//!
//! - ヘッダは 1 行目のキー順
//! - 2 要素の配列は `"a - b"`（期間・範囲を表すフィールド向け）
//! - セルの値とヘッダ名はすべて HTML エスケープする

use serde_json::{Map, Value};
use tera::escape_html;

/// 行データ
pub type Row = Map<String, Value>;

/// 行データが空の場合の出力
pub const EMPTY_TABLE_HTML: &str = "<p>No data available.</p>";

const TABLE_OPEN: &str = r#"<table style="width:100%; border-collapse: collapse;" border="1" cellpadding="8" cellspacing="0">"#;
const HEADER_ROW_OPEN: &str = r#"<tr style="background-color: #f2f2f2;">"#;

/// 行データを HTML の表に変換する
///
/// 2 行目以降に 1 行目のキーがない場合は空のセルになる。
/// 1 行目にないキーは出力しない。
pub fn format_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return EMPTY_TABLE_HTML.to_string();
    };

    let headers: Vec<&String> = first.keys().collect();

    let mut html = String::from(TABLE_OPEN);

    html.push_str(HEADER_ROW_OPEN);
    for header in &headers {
        html.push_str("<th style='text-align:left'>");
        html.push_str(&escape_html(header));
        html.push_str("</th>");
    }
    html.push_str("</tr>");

    for row in rows {
        html.push_str("<tr>");
        for header in &headers {
            html.push_str("<td>");
            if let Some(value) = row.get(header.as_str()) {
                html.push_str(&escape_html(&render_cell(value)));
            }
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }

    html.push_str("</table>");
    html
}

/// セルの表示文字列（エスケープ前）
fn render_cell(value: &Value) -> String {
    match value {
        Value::Array(items) if items.len() == 2 => {
            format!("{} - {}", render_scalar(&items[0]), render_scalar(&items[1]))
        }
        Value::Array(items) => items
            .iter()
            .map(render_scalar)
            .collect::<Vec<_>>()
            .join(", "),
        other => render_scalar(other),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        // 数値・真偽値・ネストしたオブジェクトは JSON 表記のまま
        other => other.to_string(),
    }
}
