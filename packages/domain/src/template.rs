//! # テンプレート登録表
//!
//! テンプレート名からテンプレートファイルへの固定の対応表。
//!
//! ## 設計方針
//!
//! - **起動時に構築して不変**: 登録表はプロセスの起動から終了まで変更しない。
//!   サービスにはコンストラクタで注入する
//! - **表データの要否はフラグで持つ**: `DYNAMIC_TABLE` を注入するかどうかを
//!   テンプレート名の文字列比較ではなく [`TemplateDescriptor::requires_table`] で判断する

use std::collections::HashMap;

/// テンプレート記述子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    /// リクエストで指定されるテンプレート名（例: `Table-Information`）
    pub name:           String,
    /// テンプレートディレクトリ内のファイル名
    pub file:           String,
    /// 表データ（`DYNAMIC_TABLE`）を必要とするか
    pub requires_table: bool,
}

impl TemplateDescriptor {
    pub fn new(name: impl Into<String>, file: impl Into<String>, requires_table: bool) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            requires_table,
        }
    }
}

/// テンプレート登録表
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    descriptors: HashMap<String, TemplateDescriptor>,
}

impl TemplateRegistry {
    /// 記述子の一覧から登録表を作成する
    ///
    /// 同じ名前が複数ある場合は後のものが優先される。
    pub fn new(descriptors: impl IntoIterator<Item = TemplateDescriptor>) -> Self {
        Self {
            descriptors: descriptors
                .into_iter()
                .map(|descriptor| (descriptor.name.clone(), descriptor))
                .collect(),
        }
    }

    /// 運用中のテンプレート一式
    pub fn standard() -> Self {
        Self::new([
            TemplateDescriptor::new("Mediation", "mediation_board_template.html", false),
            TemplateDescriptor::new("Defaulted-Cases", "defaulted_cases_template.html", false),
            TemplateDescriptor::new(
                "Defaulted-Customers",
                "defaulted_customers_template.html",
                false,
            ),
            TemplateDescriptor::new("Normal-Information", "plain_template.html", false),
            TemplateDescriptor::new("Table-Information", "table_template.html", true),
            TemplateDescriptor::new("Action-Required", "action_required_template.html", true),
        ])
    }

    /// テンプレート名から記述子を引く
    pub fn resolve(&self, name: &str) -> Option<&TemplateDescriptor> {
        self.descriptors.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateDescriptor> {
        self.descriptors.values()
    }
}
