//! Tree search.
//!
//! A node survives a search when its own text matches or when any of its
//! descendants survives. Surviving ancestors keep their own fields but only
//! the surviving children. The ids of every surviving branch are returned so
//! a tree view can open the path to each match without further input.

use crate::node::TreeNode;
use crate::traversal::preorder;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SearchField {
    Id,
    Name,
    Code,
    Account,
    AccountName,
    ItemText,
    Amount,
    Comparison,
    DiffAbs,
    DiffPct,
    Currency,
    Level,
}

impl SearchField {
    fn value<'a>(&self, node: &'a TreeNode) -> Option<&'a str> {
        let value = match self {
            SearchField::Id => Some(node.id.as_str()),
            SearchField::Name => Some(node.name.as_str()),
            SearchField::Code => node.code.as_deref(),
            SearchField::Account => node.account.as_deref(),
            SearchField::AccountName => node.account_name.as_deref(),
            SearchField::ItemText => node.item_text.as_deref(),
            SearchField::Amount => Some(node.amount.as_str()),
            SearchField::Comparison => Some(node.comparison.as_str()),
            SearchField::DiffAbs => Some(node.diff_abs.as_str()),
            SearchField::DiffPct => Some(node.diff_pct.as_str()),
            SearchField::Currency => node.currency.as_deref(),
            SearchField::Level => node.level.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Which node fields take part in matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct SearchConfig {
    #[schemars(
        description = "Fields joined (in this order, separated by a space) into the text a query is matched against"
    )]
    pub fields: Vec<SearchField>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fields: vec![
                SearchField::Name,
                SearchField::Code,
                SearchField::Account,
                SearchField::ItemText,
                SearchField::Amount,
                SearchField::Currency,
            ],
        }
    }
}

impl SearchConfig {
    /// The lower-cased text a query is matched against.
    pub fn haystack(&self, node: &TreeNode) -> String {
        self.fields
            .iter()
            .filter_map(|field| field.value(node))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Case-insensitive substring match on this node alone.
    pub fn matches(&self, node: &TreeNode, query: &str) -> bool {
        self.haystack(node).contains(&query.to_lowercase())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<'a> {
    /// The filtered forest; the input forest itself for an empty query.
    pub data: Cow<'a, [TreeNode]>,
    /// Ids of every branch in `data`, pre-order.
    pub expand: Vec<String>,
    /// Number of nodes that matched on their own text.
    pub match_count: usize,
}

/// Searches with the default field set.
pub fn search<'a>(forest: &'a [TreeNode], query: &str) -> SearchResult<'a> {
    search_with(forest, query, &SearchConfig::default())
}

pub fn search_with<'a>(
    forest: &'a [TreeNode],
    query: &str,
    config: &SearchConfig,
) -> SearchResult<'a> {
    if query.is_empty() {
        return SearchResult {
            data: Cow::Borrowed(forest),
            expand: Vec::new(),
            match_count: 0,
        };
    }

    let needle = query.to_lowercase();
    let mut match_count = 0;
    let data: Vec<TreeNode> = forest
        .iter()
        .filter_map(|root| filter_tree(root, &needle, config, &mut match_count))
        .collect();

    let expand = preorder(&data)
        .into_iter()
        .filter(|node| node.is_branch())
        .map(|node| node.id.clone())
        .collect::<Vec<_>>();

    debug!(
        "Search {:?} matched {} nodes, kept {} roots, {} branches to expand",
        query,
        match_count,
        data.len(),
        expand.len()
    );

    SearchResult {
        data: Cow::Owned(data),
        expand,
        match_count,
    }
}

// Internal struct to track a node while its children are being filtered
struct Frame<'a> {
    node: &'a TreeNode,
    next_child: usize,
    kept: Vec<TreeNode>,
}

impl<'a> Frame<'a> {
    fn new(node: &'a TreeNode) -> Self {
        Self {
            node,
            next_child: 0,
            kept: Vec::new(),
        }
    }
}

/// Bottom-up filter of one tree. `needle` is already lower-cased.
fn filter_tree(
    root: &TreeNode,
    needle: &str,
    config: &SearchConfig,
    match_count: &mut usize,
) -> Option<TreeNode> {
    let mut stack = vec![Frame::new(root)];
    let mut result = None;

    while let Some(frame) = stack.last_mut() {
        let node = frame.node;
        if let Some(child) = node.children.get(frame.next_child) {
            frame.next_child += 1;
            stack.push(Frame::new(child));
            continue;
        }

        let Some(done) = stack.pop() else {
            break;
        };

        let self_match = config.haystack(done.node).contains(needle);
        if self_match {
            *match_count += 1;
        }

        if !self_match && done.kept.is_empty() {
            continue;
        }

        let kept = done.node.with_children(done.kept);
        match stack.last_mut() {
            Some(parent) => parent.kept.push(kept),
            None => result = Some(kept),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_forest;
    use crate::raw::RawRecord;

    fn raw(id: &str, text: &str, amount: &str, children: Vec<RawRecord>) -> RawRecord {
        let mut record = RawRecord::default();
        record.hierarchy_node = Some(id.to_string());
        record.item_text = Some(text.to_string());
        record.reporting_amount = Some(amount.to_string());
        record.currency = Some("EUR".to_string());
        record.children = children;
        record
    }

    fn sample() -> Vec<TreeNode> {
        build_forest(&[raw(
            "R1",
            "Balance Sheet",
            "0",
            vec![
                raw(
                    "G1",
                    "Assets",
                    "1,000",
                    vec![
                        raw("L1", "Cash", "(200)", vec![]),
                        raw("L2", "Receivables", "1,200", vec![]),
                    ],
                ),
                raw("G2", "Liabilities", "400", vec![raw("L3", "Payables", "400", vec![])]),
            ],
        )])
    }

    #[test]
    fn test_empty_query_returns_input() {
        let forest = sample();
        let result = search(&forest, "");
        assert!(matches!(result.data, Cow::Borrowed(_)));
        assert_eq!(result.data.as_ref(), forest.as_slice());
        assert!(result.expand.is_empty());
    }

    #[test]
    fn test_match_keeps_ancestors_and_prunes_siblings() {
        let forest = sample();
        let result = search(&forest, "CASH");

        assert_eq!(result.data.len(), 1);
        let root = &result.data[0];
        assert_eq!(root.id, "R1");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].id, "G1");
        assert_eq!(root.children[0].children.len(), 1);
        assert_eq!(root.children[0].children[0].id, "L1");
        assert_eq!(root.children[0].amount, "1,000");

        assert_eq!(result.expand, vec!["R1", "G1"]);
        assert_eq!(result.match_count, 1);
    }

    #[test]
    fn test_self_match_keeps_only_matching_children() {
        let forest = sample();
        let result = search(&forest, "assets");

        let group = &result.data[0].children[0];
        assert_eq!(group.id, "G1");
        assert!(group.children.is_empty());
        assert_eq!(result.expand, vec!["R1"]);
    }

    #[test]
    fn test_no_match_yields_empty_forest() {
        let forest = sample();
        let result = search(&forest, "goodwill");
        assert!(result.data.is_empty());
        assert!(result.expand.is_empty());
        assert_eq!(result.match_count, 0);
    }

    #[test]
    fn test_amount_and_currency_are_searchable() {
        let forest = sample();
        let result = search(&forest, "1,200");
        assert_eq!(result.data[0].children[0].children[0].id, "L2");

        let result = search(&forest, "eur");
        assert_eq!(result.match_count, 6);
    }

    #[test]
    fn test_query_can_span_adjacent_fields() {
        let forest = sample();
        let result = search(&forest, "payables 400");
        assert_eq!(result.match_count, 1);
    }

    #[test]
    fn test_custom_field_set() {
        let forest = sample();
        let by_id = SearchConfig {
            fields: vec![SearchField::Id],
        };
        let result = search_with(&forest, "l3", &by_id);
        assert_eq!(result.expand, vec!["R1", "G2"]);

        let result = search_with(&forest, "cash", &by_id);
        assert!(result.data.is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let forest = sample();
        let first = search(&forest, "a");
        let second = search(&forest, "a");
        assert_eq!(first.data, second.data);
        assert_eq!(first.expand, second.expand);
    }

    #[test]
    fn test_deep_chain_search() {
        let depth = 100_000;
        let mut chain = raw("N0", "Cash", "1", vec![]);
        for i in 1..depth {
            chain = raw(&format!("N{}", i), "Total", "1", vec![chain]);
        }
        let forest = build_forest(&[chain]);

        let result = search(&forest, "cash");
        assert_eq!(result.match_count, 1);
        assert_eq!(result.expand.len(), depth - 1);
        assert_eq!(result.expand[0], format!("N{}", depth - 1));
    }

    #[test]
    fn test_haystack_skips_missing_fields() {
        let forest = sample();
        let config = SearchConfig::default();
        assert_eq!(
            config.haystack(&forest[0]),
            "balance sheet balance sheet 0 eur"
        );
        assert!(config.matches(&forest[0], "Sheet"));
    }
}
