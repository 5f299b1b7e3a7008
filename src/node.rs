use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[schemars(description = "Top of a statement hierarchy (type code \"R\")")]
    Root,

    #[schemars(description = "Intermediate total grouping other items (type code \"P\")")]
    Group,

    #[schemars(description = "Account-level line item (any other type code)")]
    Leaf,
}

impl NodeKind {
    /// Maps the backend type code: `"R"` root, `"P"` group, anything else leaf.
    pub fn from_type_code(code: Option<&str>) -> Self {
        match code {
            Some("R") => Self::Root,
            Some("P") => Self::Group,
            _ => Self::Leaf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Group => "group",
            Self::Leaf => "leaf",
        }
    }
}

/// A canonical statement node. Owns its children; there is no parent link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,

    /// Raw reporting-period amount text, `""` when the backend sent none.
    pub amount: String,
    pub comparison: String,
    pub diff_abs: String,
    pub diff_pct: String,

    pub amount_num: f64,
    pub comparison_num: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Structural check. `kind` is taken from the backend as-is and may
    /// disagree with the actual children.
    pub fn is_branch(&self) -> bool {
        !self.children.is_empty()
    }

    /// Copies every field except `children`, which is replaced.
    pub fn with_children(&self, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: self.id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            code: self.code.clone(),
            item_text: self.item_text.clone(),
            account: self.account.clone(),
            account_name: self.account_name.clone(),
            amount: self.amount.clone(),
            comparison: self.comparison.clone(),
            diff_abs: self.diff_abs.clone(),
            diff_pct: self.diff_pct.clone(),
            amount_num: self.amount_num,
            comparison_num: self.comparison_num,
            currency: self.currency.clone(),
            level: self.level.clone(),
            children,
        }
    }

    /// Every field present on this node, by serialized name, with its display
    /// text. Declaration order; `children` is never included.
    pub fn field_values(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("id", self.id.clone()),
            ("kind", self.kind.as_str().to_string()),
            ("name", self.name.clone()),
        ];

        let optional = [
            ("code", &self.code),
            ("itemText", &self.item_text),
            ("account", &self.account),
            ("accountName", &self.account_name),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.clone().map(|v| (key, v))),
        );

        fields.push(("amount", self.amount.clone()));
        fields.push(("comparison", self.comparison.clone()));
        fields.push(("diffAbs", self.diff_abs.clone()));
        fields.push(("diffPct", self.diff_pct.clone()));
        fields.push(("amountNum", self.amount_num.to_string()));
        fields.push(("comparisonNum", self.comparison_num.to_string()));

        if let Some(currency) = &self.currency {
            fields.push(("currency", currency.clone()));
        }
        if let Some(level) = &self.level {
            fields.push(("level", level.clone()));
        }

        fields
    }
}

impl Drop for TreeNode {
    // Deep hierarchies must not recurse on drop
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
