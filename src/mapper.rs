use crate::amount::{format_amount, parse_amount};
use crate::node::{NodeKind, TreeNode};
use crate::raw::RawRecord;

/// Maps a single backend row to a [`TreeNode`]. Children are not visited;
/// the returned node always has an empty `children` list.
pub fn map_record(raw: &RawRecord) -> TreeNode {
    let amount = format_amount(raw.reporting_amount.as_deref());
    let comparison = format_amount(raw.comparison_amount.as_deref());

    TreeNode {
        id: raw.hierarchy_node.clone().unwrap_or_default(),
        kind: NodeKind::from_type_code(raw.node_type.as_deref()),
        name: resolve_name(raw),
        code: non_empty(&raw.item_code),
        item_text: non_empty(&raw.item_text),
        account: non_empty(&raw.gl_account),
        account_name: non_empty(&raw.gl_account_name),
        amount_num: parse_amount(Some(&amount)),
        comparison_num: parse_amount(Some(&comparison)),
        amount,
        comparison,
        diff_abs: format_amount(raw.absolute_difference.as_deref()),
        diff_pct: format_amount(raw.relative_difference.as_deref()),
        currency: non_empty(&raw.currency),
        level: non_empty(&raw.hierarchy_level),
        children: Vec::new(),
    }
}

/// Display name: item text, then GL account name, GL account, FS item code
/// and finally the hierarchy node id. Empty when none of them is set.
pub fn resolve_name(raw: &RawRecord) -> String {
    [
        &raw.item_text,
        &raw.gl_account_name,
        &raw.gl_account,
        &raw.item_code,
        &raw.hierarchy_node,
    ]
    .into_iter()
    .find_map(|candidate| non_empty(candidate))
    .unwrap_or_default()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RawRecord {
        let mut record = RawRecord::default();
        record.hierarchy_node = Some("000120".to_string());
        record.node_type = Some("D".to_string());
        record.gl_account = Some("100000".to_string());
        record.gl_account_name = Some("Cash at Bank".to_string());
        record.item_code = Some("A.1".to_string());
        record.reporting_amount = Some("(200)".to_string());
        record.comparison_amount = Some("50".to_string());
        record.absolute_difference = Some("-250".to_string());
        record.currency = Some("EUR".to_string());
        record
    }

    #[test]
    fn test_name_priority_chain() {
        let mut raw = record();
        raw.item_text = Some("Cash".to_string());
        assert_eq!(resolve_name(&raw), "Cash");

        raw.item_text = Some(String::new());
        assert_eq!(resolve_name(&raw), "Cash at Bank");

        raw.gl_account_name = None;
        assert_eq!(resolve_name(&raw), "100000");

        raw.gl_account = None;
        assert_eq!(resolve_name(&raw), "A.1");

        raw.item_code = None;
        assert_eq!(resolve_name(&raw), "000120");

        raw.hierarchy_node = None;
        assert_eq!(resolve_name(&raw), "");
    }

    #[test]
    fn test_map_record_fields() {
        let node = map_record(&record());

        assert_eq!(node.id, "000120");
        assert_eq!(node.kind, NodeKind::Leaf);
        assert_eq!(node.name, "Cash at Bank");
        assert_eq!(node.code.as_deref(), Some("A.1"));
        assert_eq!(node.item_text, None);
        assert_eq!(node.account.as_deref(), Some("100000"));
        assert_eq!(node.amount, "(200)");
        assert_eq!(node.amount_num, -200.0);
        assert_eq!(node.comparison_num, 50.0);
        assert_eq!(node.diff_abs, "-250");
        assert_eq!(node.diff_pct, "");
        assert_eq!(node.level, None);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_map_record_ignores_children() {
        let mut raw = record();
        raw.node_type = Some("R".to_string());
        raw.children.push(record());

        let node = map_record(&raw);
        assert_eq!(node.kind, NodeKind::Root);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_empty_record_maps_to_placeholders() {
        let node = map_record(&RawRecord::default());
        assert_eq!(node.id, "");
        assert_eq!(node.name, "");
        assert_eq!(node.kind, NodeKind::Leaf);
        assert_eq!(node.amount_num, 0.0);
        assert_eq!(node.comparison_num, 0.0);
    }
}
