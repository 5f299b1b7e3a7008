//! # Statement Tree
//!
//! A library for turning financial statement hierarchies, as delivered by an
//! SAP-style statement service, into canonical trees that can be searched,
//! sliced and compared.
//!
//! ## Core Concepts
//!
//! - **Raw records**: backend rows ([`RawRecord`]) with optional fields,
//!   nested through `Children` or linked through `ParentNode`
//! - **Tree nodes**: canonical [`TreeNode`]s with a derived name, kind and
//!   normalized amounts
//! - **Search**: case-insensitive filtering that keeps the ancestors of every
//!   match and reports which branches to expand
//! - **Scope**: analyses run on a single node or on a node with its subtree
//! - **Variance**: reporting minus comparison amount, per node
//!
//! Every operation is a pure function over in-memory data. Nothing here
//! performs I/O or keeps state between calls.
//!
//! ## Example
//!
//! ```rust,ignore
//! use statement_tree::*;
//!
//! let body = r#"{ "records": [ {
//!     "HierarchyNode": "R1", "NodeType": "R", "FinancialStatementItemText": "Balance Sheet",
//!     "Children": [ {
//!         "HierarchyNode": "L1", "OperativeGLAccountName": "Cash",
//!         "ReportingPeriodAmount": "(200)", "ComparisonPeriodAmount": "50"
//!     } ]
//! } ] }"#;
//!
//! let engine = StatementTreeEngine::default();
//! let forest = engine.forest_from_json(body).unwrap();
//!
//! let hits = engine.search(&forest, "cash");
//! assert_eq!(hits.expand, vec!["R1"]);
//!
//! let root = &forest[0];
//! let series = engine.variance_series(root, Scope::Subtree);
//! assert_eq!(series[1].diff, -250.0);
//! ```

pub mod amount;
pub mod builder;
pub mod columns;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod mapper;
pub mod node;
pub mod query;
pub mod raw;
pub mod search;
pub mod summary;
pub mod traversal;
pub mod variance;

pub use amount::{display_amount, format_amount, parse_amount};
pub use builder::{build_forest, count_nodes};
pub use columns::{discover_columns, tabulate, ColumnTable};
pub use config::{EngineConfig, SummaryConfig};
pub use error::{Result, StatementTreeError};
pub use ingestion::{link_flat_records, records_from_json, records_from_value};
pub use mapper::{map_record, resolve_name};
pub use node::{NodeKind, TreeNode};
pub use query::{normalize_month, sap_year_period, SapPeriod, StatementQuery};
pub use raw::RawRecord;
pub use search::{search, search_with, SearchConfig, SearchField, SearchResult};
pub use summary::{
    local_summary, summarize_or_fallback, Summarizer, SummaryFilters, SummaryNode,
    SummaryOutcome, SummaryRequest, SummaryResponse,
};
pub use traversal::{
    ancestor_path, collect_subtree, find_by_id, flatten_ids, preorder, scope_records, Scope,
};
pub use variance::{
    non_zero, variance, variance_series, Favorability, VariancePoint, VarianceTotals,
};

use log::{debug, info};

/// The engine operations bundled with one [`EngineConfig`].
///
/// Holds configuration only. Forests are passed in and results handed back;
/// a caller keeps its own query, selection and scope.
#[derive(Debug, Clone, Default)]
pub struct StatementTreeEngine {
    config: EngineConfig,
}

impl StatementTreeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses a statement response body, links flat records through their
    /// parent references and builds the canonical forest.
    pub fn forest_from_json(&self, body: &str) -> Result<Vec<TreeNode>> {
        let records = records_from_json(body)?;
        let linked = link_flat_records(records);
        let forest = build_forest(&linked);

        info!(
            "Loaded statement forest: {} roots, {} nodes",
            forest.len(),
            count_nodes(&forest)
        );

        Ok(forest)
    }

    pub fn build(&self, raws: &[RawRecord]) -> Vec<TreeNode> {
        build_forest(raws)
    }

    pub fn search<'a>(&self, forest: &'a [TreeNode], query: &str) -> SearchResult<'a> {
        search_with(forest, query, &self.config.search)
    }

    pub fn columns(&self, node: &TreeNode, scope: Scope) -> Vec<String> {
        discover_columns(scope_records(node, scope))
    }

    pub fn table(&self, node: &TreeNode, scope: Scope) -> ColumnTable {
        tabulate(&scope_records(node, scope))
    }

    pub fn variance_series(&self, node: &TreeNode, scope: Scope) -> Vec<VariancePoint> {
        variance_series(scope_records(node, scope))
    }

    pub fn summary_request(
        &self,
        node: &TreeNode,
        scope: Scope,
        filters: SummaryFilters,
    ) -> SummaryRequest {
        SummaryRequest::new(scope, &scope_records(node, scope), filters)
    }

    pub fn summary_prompt(&self, request: &SummaryRequest) -> Result<String> {
        request.build_prompt(self.config.summary.preview_limit)
    }

    pub fn local_summary(&self, node: &TreeNode, scope: Scope) -> String {
        local_summary(
            &scope_records(node, scope),
            self.config.summary.example_names,
        )
    }

    /// Summarizes `node` in `scope` through `summarizer`, falling back to the
    /// local summary if it fails.
    pub fn summarize<S: Summarizer + ?Sized>(
        &self,
        summarizer: &S,
        node: &TreeNode,
        scope: Scope,
        filters: SummaryFilters,
    ) -> SummaryOutcome {
        let records = scope_records(node, scope);
        let request = SummaryRequest::new(scope, &records, filters);
        debug!(
            "Summarizing {} ({} nodes, scope {})",
            node.id,
            records.len(),
            scope.as_str()
        );
        summarize_or_fallback(
            summarizer,
            &request,
            &records,
            self.config.summary.example_names,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{ "records": [ {
        "HierarchyNode": "R1", "NodeType": "R", "FinancialStatementItemText": "Balance Sheet",
        "Children": [ {
            "HierarchyNode": "G1", "NodeType": "P", "FinancialStatementItemText": "Assets",
            "ReportingPeriodAmount": "1,000", "ComparisonPeriodAmount": "800",
            "Children": [ {
                "HierarchyNode": "L1", "OperativeGLAccountName": "Cash",
                "ReportingPeriodAmount": "(200)", "ComparisonPeriodAmount": "50"
            } ]
        } ]
    } ] }"#;

    #[test]
    fn test_end_to_end_processing() {
        let engine = StatementTreeEngine::default();
        let forest = engine.forest_from_json(BODY).unwrap();

        assert_eq!(count_nodes(&forest), 3);

        let hits = engine.search(&forest, "cash");
        assert_eq!(hits.expand, vec!["R1", "G1"]);

        let root = &forest[0];
        let series = engine.variance_series(root, Scope::Subtree);
        let diffs: Vec<f64> = series.iter().map(|p| p.diff).collect();
        assert_eq!(diffs, vec![0.0, 200.0, -250.0]);

        let columns = engine.columns(root, Scope::Node);
        assert!(columns.contains(&"itemText".to_string()));
        assert!(!columns.contains(&"account".to_string()));
    }

    #[test]
    fn test_configured_search_fields() {
        let config = EngineConfig::from_json_str(r#"{ "search": { "fields": ["id"] } }"#).unwrap();
        let engine = StatementTreeEngine::new(config);
        let forest = engine.forest_from_json(BODY).unwrap();

        assert!(engine.search(&forest, "cash").data.is_empty());
        assert_eq!(engine.search(&forest, "l1").match_count, 1);
    }

    #[test]
    fn test_summary_helpers() {
        let engine = StatementTreeEngine::default();
        let forest = engine.forest_from_json(BODY).unwrap();
        let group = find_by_id(&forest, "G1").unwrap();

        let request = engine.summary_request(group, Scope::Subtree, SummaryFilters::default());
        assert_eq!(request.nodes.len(), 2);
        assert!(engine.summary_prompt(&request).unwrap().contains("Scope: subtree"));

        assert_eq!(
            engine.local_summary(group, Scope::Node),
            "Items: 1. Types: group:1. Columns (unique keys): 10. Examples: Assets"
        );
    }
}
