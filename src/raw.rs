use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One financial statement row as the SAP `FinStmntSet` service returns it.
///
/// Every field is optional. Scalars may arrive as JSON strings or numbers;
/// numbers are kept in their textual form so amounts can be re-parsed later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(
        rename = "HierarchyNode",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub hierarchy_node: Option<String>,

    /// `"R"` root, `"P"` group, anything else a leaf.
    #[serde(
        rename = "NodeType",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_type: Option<String>,

    #[serde(
        rename = "ParentNode",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_node: Option<String>,

    #[serde(
        rename = "FinancialStatementItemText",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_text: Option<String>,

    #[serde(
        rename = "OperativeGLAccountName",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gl_account_name: Option<String>,

    #[serde(
        rename = "OperativeGLAccount",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gl_account: Option<String>,

    #[serde(
        rename = "FinancialStatementItem",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_code: Option<String>,

    #[serde(
        rename = "ReportingPeriodAmount",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub reporting_amount: Option<String>,

    #[serde(
        rename = "ComparisonPeriodAmount",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub comparison_amount: Option<String>,

    #[serde(
        rename = "AbsoluteDifferenceAmount",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub absolute_difference: Option<String>,

    #[serde(
        rename = "RelativeDifferencePercent",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub relative_difference: Option<String>,

    #[serde(
        rename = "Currency",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency: Option<String>,

    #[serde(
        rename = "FinStatementHierarchyLevelVal",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub hierarchy_level: Option<String>,

    #[serde(
        rename = "Children",
        default,
        deserialize_with = "lenient_children",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<RawRecord>,
}

impl RawRecord {
    /// The hierarchy node id, if the record carries a non-empty one.
    pub fn node_id(&self) -> Option<&str> {
        self.hierarchy_node.as_deref().filter(|id| !id.is_empty())
    }

    /// The parent reference, if the record carries a non-empty one.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_node.as_deref().filter(|id| !id.is_empty())
    }
}

impl Drop for RawRecord {
    // Deep hierarchies must not recurse on drop
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut record) = pending.pop() {
            pending.append(&mut record.children);
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_children<'de, D>(deserializer: D) -> Result<Vec<RawRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawRecord>>::deserialize(deserializer)?.unwrap_or_default())
}
