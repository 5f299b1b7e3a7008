use crate::node::TreeNode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Favorability {
    #[schemars(description = "Reporting amount is at or above the comparison amount")]
    Favorable,
    #[schemars(description = "Reporting amount is below the comparison amount")]
    Unfavorable,
}

impl Favorability {
    /// Zero counts as favorable.
    pub fn of(diff: f64) -> Self {
        if diff >= 0.0 {
            Favorability::Favorable
        } else {
            Favorability::Unfavorable
        }
    }
}

/// Signed difference between the reporting and comparison amounts, both
/// taken from the normalized numeric fields.
pub fn variance(node: &TreeNode) -> f64 {
    node.amount_num - node.comparison_num
}

/// One bar of a variance chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariancePoint {
    pub id: String,
    /// Node name, or the id when the name is empty.
    pub name: String,
    pub amount: f64,
    pub comparison: f64,
    pub diff: f64,
    pub favorability: Favorability,
}

impl VariancePoint {
    pub fn from_node(node: &TreeNode) -> Self {
        let diff = variance(node);
        let name = if node.name.is_empty() {
            node.id.clone()
        } else {
            node.name.clone()
        };

        Self {
            id: node.id.clone(),
            name,
            amount: node.amount_num,
            comparison: node.comparison_num,
            diff,
            favorability: Favorability::of(diff),
        }
    }
}

/// One point per record, in record order. Zero differences are kept.
pub fn variance_series<'a, I>(records: I) -> Vec<VariancePoint>
where
    I: IntoIterator<Item = &'a TreeNode>,
{
    records.into_iter().map(VariancePoint::from_node).collect()
}

/// Drops points whose difference is exactly zero.
pub fn non_zero(series: Vec<VariancePoint>) -> Vec<VariancePoint> {
    series.into_iter().filter(|point| point.diff != 0.0).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VarianceTotals {
    pub count: usize,
    pub amount: f64,
    pub comparison: f64,
    pub diff: f64,
    pub favorable: usize,
    pub unfavorable: usize,
}

impl VarianceTotals {
    pub fn from_series(series: &[VariancePoint]) -> Self {
        series.iter().fold(Self::default(), |mut totals, point| {
            totals.count += 1;
            totals.amount += point.amount;
            totals.comparison += point.comparison;
            totals.diff += point.diff;
            match point.favorability {
                Favorability::Favorable => totals.favorable += 1,
                Favorability::Unfavorable => totals.unfavorable += 1,
            }
            totals
        })
    }
}
