//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールの HTML 本文を生成する。
//!
//! ## 設計方針
//!
//! - **起動時に読み込み**: 登録表にあるテンプレートファイルを起動時にすべて読み込む。
//!   ファイルがなければ起動を失敗させる
//! - **ファイル名で登録**: tera の自動エスケープは拡張子で判定されるため、
//!   テンプレートはファイル名（`*.html`）で登録する
//! - **レンダリングコンテキスト**: `EmailBody` の全フィールド + `Date` + `Subject`。
//!   表データが必要なテンプレートには `DYNAMIC_TABLE` も渡す

use std::{error::Error as _, path::Path, sync::Arc};

use mailflow_domain::{
    clock::Clock,
    notification::NotificationError,
    template::{TemplateDescriptor, TemplateRegistry},
};
use serde_json::{Map, Value};
use tera::{Context, Tera};

use super::table_formatter::{Row, format_table};

/// 表データの格納場所（`EmailBody.Table_Filter_infor.data`）
const TABLE_FIELD: &str = "Table_Filter_infor";
const TABLE_DATA_FIELD: &str = "data";

/// テンプレートレンダラー
pub struct TemplateRenderer {
    engine:   Tera,
    registry: TemplateRegistry,
    clock:    Arc<dyn Clock>,
}

impl TemplateRenderer {
    /// テンプレートディレクトリから登録表のテンプレートを読み込む
    ///
    /// 登録表にあるファイルが 1 つでも見つからない場合は `TemplateNotFound` を返す。
    pub fn from_dir(
        dir: &Path,
        registry: TemplateRegistry,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        for descriptor in registry.iter() {
            let path = dir.join(&descriptor.file);
            if !path.is_file() {
                return Err(NotificationError::TemplateNotFound(format!(
                    "{}（{}）",
                    descriptor.name,
                    path.display()
                )));
            }
            engine
                .add_template_file(&path, Some(descriptor.file.as_str()))
                .map_err(|e| NotificationError::Render(describe(&e)))?;
        }

        Ok(Self {
            engine,
            registry,
            clock,
        })
    }

    /// テンプレート本文を直接渡して作成する
    ///
    /// `templates` はファイル名と本文の組。
    pub fn from_raw(
        templates: Vec<(&str, &str)>,
        registry: TemplateRegistry,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();
        engine
            .add_raw_templates(templates)
            .map_err(|e| NotificationError::Render(describe(&e)))?;

        Ok(Self {
            engine,
            registry,
            clock,
        })
    }

    /// テンプレート名から記述子を引く
    pub fn resolve(&self, template_name: &str) -> Result<&TemplateDescriptor, NotificationError> {
        self.registry
            .resolve(template_name)
            .ok_or_else(|| NotificationError::TemplateNotFound(template_name.to_string()))
    }

    /// HTML 本文を生成する
    ///
    /// 表データが必要なテンプレートで表データがない場合は、空の表として扱う。
    pub fn render(
        &self,
        template_name: &str,
        email_body: &Map<String, Value>,
        subject: &str,
    ) -> Result<String, NotificationError> {
        let descriptor = self.resolve(template_name)?;

        let mut context = Context::new();
        for (key, value) in email_body {
            context.insert(key.as_str(), value);
        }
        context.insert("Date", &self.clock.render_date());
        context.insert("Subject", subject);

        if descriptor.requires_table {
            let rows = extract_table_rows(email_body);
            if rows.is_empty() {
                tracing::warn!(template = template_name, "表データがないため空の表を出力します");
            }
            context.insert("DYNAMIC_TABLE", &format_table(&rows));
        }

        self.engine
            .render(&descriptor.file, &context)
            .map_err(|e| match e.kind {
                tera::ErrorKind::TemplateNotFound(_) => {
                    NotificationError::TemplateNotFound(template_name.to_string())
                }
                _ => NotificationError::Render(describe(&e)),
            })
    }
}

/// `EmailBody` から表データを取り出す
///
/// `data` が配列ならオブジェクトの要素を行とし、オブジェクトなら 1 行として扱う。
/// それ以外（未設定を含む）は空。
pub fn extract_table_rows(email_body: &Map<String, Value>) -> Vec<Row> {
    let data = email_body
        .get(TABLE_FIELD)
        .and_then(|table| table.get(TABLE_DATA_FIELD));

    match data {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect(),
        Some(Value::Object(row)) => vec![row.clone()],
        _ => Vec::new(),
    }
}

/// tera のエラーは原因が source に入っているため、連鎖をたどって 1 行にまとめる
fn describe(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use mailflow_domain::clock::FixedClock;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn make_registry() -> TemplateRegistry {
        TemplateRegistry::new([
            TemplateDescriptor::new("Normal-Information", "plain.html", false),
            TemplateDescriptor::new("Table-Information", "table.html", true),
            TemplateDescriptor::new("Strict", "strict.html", false),
        ])
    }

    fn make_renderer() -> TemplateRenderer {
        TemplateRenderer::from_raw(
            vec![
                ("plain.html", "<p>{{ Reciever_Name }}</p><p>{{ Subject }}</p><p>{{ Date }}</p>"),
                ("table.html", "<div>{{ DYNAMIC_TABLE | safe }}</div>"),
                ("strict.html", "<p>{{ Required_Field }}</p>"),
            ],
            make_registry(),
            Arc::new(FixedClock::new(
                Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            )),
        )
        .unwrap()
    }

    fn body(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn email_bodyと件名と日付がコンテキストに入る() {
        let html = make_renderer()
            .render(
                "Normal-Information",
                &body(json!({"Reciever_Name": "田中"})),
                "月次レポート",
            )
            .unwrap();

        assert_eq!(
            html,
            "<p>田中</p><p>月次レポート</p><p>November 14, 2023 10:13 PM</p>"
        );
    }

    #[test]
    fn email_bodyの値はhtmlエスケープされる() {
        let html = make_renderer()
            .render(
                "Normal-Information",
                &body(json!({"Reciever_Name": "<b>田中</b>"})),
                "件名",
            )
            .unwrap();

        assert!(html.contains("&lt;b&gt;田中"));
    }

    #[test]
    fn 表テンプレートには表データが挿入される() {
        let html = make_renderer()
            .render(
                "Table-Information",
                &body(json!({
                    "Table_Filter_infor": {"data": [{"A": "x", "B": ["1", "2"]}]}
                })),
                "件名",
            )
            .unwrap();

        assert!(html.starts_with("<div><table"));
        assert!(html.contains("<td>1 - 2</td>"));
    }

    #[test]
    fn 表データがない場合は空の表として扱う() {
        let html = make_renderer()
            .render("Table-Information", &Map::new(), "件名")
            .unwrap();

        assert_eq!(html, "<div><p>No data available.</p></div>");
    }

    #[test]
    fn 未登録のテンプレート名はtemplate_not_foundになる() {
        let result = make_renderer().render("Unknown", &Map::new(), "件名");

        assert!(matches!(
            result,
            Err(NotificationError::TemplateNotFound(name)) if name == "Unknown"
        ));
    }

    #[test]
    fn 必須の変数がない場合はrenderエラーになる() {
        let result = make_renderer().render("Strict", &Map::new(), "件名");

        match result {
            Err(NotificationError::Render(message)) => {
                assert!(message.contains("Required_Field"), "{message}");
            }
            other => panic!("Render エラーであること: {other:?}"),
        }
    }

    #[test]
    fn 表データがオブジェクトの場合は1行として扱う() {
        let rows = extract_table_rows(&body(json!({
            "Table_Filter_infor": {"data": {"Case_ID": "C-1", "Amount": 100}}
        })));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Case_ID"], json!("C-1"));
    }

    #[test]
    fn 表データが配列の場合はオブジェクトの要素だけを行とする() {
        let rows = extract_table_rows(&body(json!({
            "Table_Filter_infor": {"data": [{"A": 1}, "noise", {"A": 2}]}
        })));

        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn 表データが文字列の場合は空とする() {
        let rows = extract_table_rows(&body(json!({
            "Table_Filter_infor": {"data": "none"}
        })));

        assert!(rows.is_empty());
    }

    #[test]
    fn テンプレートファイルがない場合はtemplate_not_foundになる() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.html"), "<p>{{ Subject }}</p>").unwrap();

        let result = TemplateRenderer::from_dir(
            dir.path(),
            make_registry(),
            Arc::new(FixedClock::new(Utc::now())),
        );

        assert!(matches!(
            result,
            Err(NotificationError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn 同梱のテンプレートをすべて読み込める() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");

        let renderer = TemplateRenderer::from_dir(
            &dir,
            TemplateRegistry::standard(),
            Arc::new(FixedClock::new(Utc::now())),
        )
        .unwrap();

        for descriptor in TemplateRegistry::standard().iter() {
            let html = renderer
                .render(
                    &descriptor.name,
                    &body(json!({"Reciever_Name": "田中"})),
                    "件名",
                )
                .unwrap();
            assert!(html.contains("田中"), "{}", descriptor.name);
        }
    }
}
