use crate::columns::discover_columns;
use crate::error::{Result, StatementTreeError};
use crate::node::{NodeKind, TreeNode};
use crate::query::normalize_month;
use crate::traversal::Scope;
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREVIEW_LIMIT: usize = 50;
pub const DEFAULT_EXAMPLE_NAMES: usize = 6;

/// A node as sent to the summarizer: descriptive fields only, no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl From<&TreeNode> for SummaryNode {
    fn from(node: &TreeNode) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind,
            name: node.name.clone(),
            code: node.code.clone(),
            account: node.account.clone(),
            amount: node.amount.clone(),
            currency: node.currency.clone(),
        }
    }
}

/// Filter context passed along with a summary request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryFilters {
    #[serde(rename = "CompanyCode", default)]
    pub company_code: Option<String>,
    #[serde(rename = "P_VERSN", default)]
    pub statement_version: Option<String>,
    #[serde(rename = "endYear", default)]
    pub end_year: Option<String>,
    #[serde(rename = "endMonth", default)]
    #[schemars(description = "Two-digit month, e.g. \"03\"")]
    pub end_month: Option<String>,
    #[serde(rename = "compYear", default)]
    pub comp_year: Option<String>,
    #[serde(rename = "compMonth", default)]
    #[schemars(description = "Two-digit month, e.g. \"03\"")]
    pub comp_month: Option<String>,
}

impl SummaryFilters {
    /// Blank values become `None`; months are rewritten to two digits and
    /// dropped when they are not a month number.
    pub fn normalized(self) -> Self {
        let blank_to_none = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            company_code: blank_to_none(self.company_code),
            statement_version: blank_to_none(self.statement_version),
            end_year: blank_to_none(self.end_year),
            end_month: self.end_month.as_deref().and_then(normalize_month),
            comp_year: blank_to_none(self.comp_year),
            comp_month: self.comp_month.as_deref().and_then(normalize_month),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryRequest {
    pub scope: Scope,
    pub nodes: Vec<SummaryNode>,
    #[serde(default)]
    pub filters: SummaryFilters,
}

impl SummaryRequest {
    pub fn new(scope: Scope, records: &[&TreeNode], filters: SummaryFilters) -> Self {
        Self {
            scope,
            nodes: records.iter().map(|node| SummaryNode::from(*node)).collect(),
            filters: filters.normalized(),
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SummaryRequest)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Prompt text for a language model, covering at most `preview_limit`
    /// nodes.
    pub fn build_prompt(&self, preview_limit: usize) -> Result<String> {
        let preview = &self.nodes[..self.nodes.len().min(preview_limit)];
        let nodes_json = serde_json::to_string_pretty(preview)?;

        Ok(format!(
            "You are an assistant summarizing SAP Financial Statement hierarchies.\n\
             User has selected the following scope and nodes from a tree view.\n\n\
             Scope: {}\n\n\
             Nodes JSON:\n\
             {}\n\n\
             Summarize the key financial insights (major items, directions, and any obvious patterns). \
             Use short, clear bullet points.",
            self.scope.as_str(),
            nodes_json
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryResponse {
    #[serde(default)]
    pub summary: String,
}

impl SummaryResponse {
    pub fn text(&self) -> &str {
        if self.summary.is_empty() {
            "(No summary returned)"
        } else {
            &self.summary
        }
    }
}

/// The external summarization service. Implementations own transport,
/// timeouts and retries.
pub trait Summarizer {
    fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse>;
}

impl<F> Summarizer for F
where
    F: Fn(&SummaryRequest) -> Result<SummaryResponse>,
{
    fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse> {
        self(request)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryOutcome {
    pub summary: String,
    /// Set when the summarizer failed and the local summary was used.
    pub error: Option<String>,
}

impl SummaryOutcome {
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Asks `summarizer` for a summary and falls back to [`local_summary`] when
/// it fails.
pub fn summarize_or_fallback<S: Summarizer + ?Sized>(
    summarizer: &S,
    request: &SummaryRequest,
    records: &[&TreeNode],
    example_names: usize,
) -> SummaryOutcome {
    match summarizer.summarize(request) {
        Ok(response) => {
            debug!(
                "Summarizer returned {} characters for {} nodes",
                response.summary.len(),
                request.nodes.len()
            );
            SummaryOutcome {
                summary: response.text().to_string(),
                error: None,
            }
        }
        Err(err) => {
            warn!("Summarizer failed, using local summary: {}", err);
            let message = match err {
                StatementTreeError::Summarizer(message) => message,
                other => other.to_string(),
            };
            SummaryOutcome {
                summary: format!(
                    "{} (LLM call failed)",
                    local_summary(records, example_names)
                ),
                error: Some(message),
            }
        }
    }
}

/// A short description built without any external service: item count,
/// kinds, column count and the first few names.
///
/// Returns `"(no data)"` for an empty slice.
pub fn local_summary(records: &[&TreeNode], example_names: usize) -> String {
    if records.is_empty() {
        return "(no data)".to_string();
    }

    let mut kinds: Vec<(NodeKind, usize)> = Vec::new();
    for record in records {
        match kinds.iter_mut().find(|(kind, _)| *kind == record.kind) {
            Some((_, count)) => *count += 1,
            None => kinds.push((record.kind, 1)),
        }
    }

    let types = kinds
        .iter()
        .map(|(kind, count)| format!("{}:{}", kind.as_str(), count))
        .collect::<Vec<_>>()
        .join(" | ");

    let names = records
        .iter()
        .take(example_names)
        .map(|record| record.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let columns = discover_columns(records.iter().copied()).len();
    let ellipsis = if records.len() > example_names { "…" } else { "" };

    format!(
        "Items: {}. Types: {}. Columns (unique keys): {}. Examples: {}{}",
        records.len(),
        types,
        columns,
        names,
        ellipsis
    )
}
