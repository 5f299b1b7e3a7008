use statement_tree::{
    display_amount, find_by_id, non_zero, Result, Scope, StatementQuery, StatementTreeEngine,
    StatementTreeError, SummaryFilters, SummaryRequest, SummaryResponse, VarianceTotals,
};

const RESPONSE: &str = r#"{ "records": [
    { "HierarchyNode": "R1", "NodeType": "R", "FinancialStatementItemText": "Balance Sheet", "Currency": "EUR" },
    { "HierarchyNode": "G1", "ParentNode": "R1", "NodeType": "P", "FinancialStatementItemText": "Assets",
      "ReportingPeriodAmount": "1,850", "ComparisonPeriodAmount": "1,600", "Currency": "EUR" },
    { "HierarchyNode": "L1", "ParentNode": "G1", "OperativeGLAccount": "100000", "OperativeGLAccountName": "Cash",
      "ReportingPeriodAmount": "(200)", "ComparisonPeriodAmount": "50", "Currency": "EUR" },
    { "HierarchyNode": "L2", "ParentNode": "G1", "OperativeGLAccount": "120000", "OperativeGLAccountName": "Receivables",
      "ReportingPeriodAmount": "2,050", "ComparisonPeriodAmount": "1,550", "Currency": "EUR" },
    { "HierarchyNode": "G2", "ParentNode": "R1", "NodeType": "P", "FinancialStatementItemText": "Liabilities",
      "ReportingPeriodAmount": "900", "ComparisonPeriodAmount": "1,100", "Currency": "EUR" },
    { "HierarchyNode": "L3", "ParentNode": "G2", "OperativeGLAccount": "160000", "OperativeGLAccountName": "Trade Payables",
      "ReportingPeriodAmount": "900", "ComparisonPeriodAmount": "1,100", "Currency": "EUR" }
] }"#;

fn main() -> anyhow::Result<()> {
    let query = StatementQuery::default()
        .with_reporting_period("2025", "3")?
        .with_comparison_period("2024", "3")?;
    println!("Request URL:\n  {}\n", query.odata_url("https://sap.example.com:44300"));

    let engine = StatementTreeEngine::default();
    let forest = engine.forest_from_json(RESPONSE)?;

    let hits = engine.search(&forest, "pay");
    println!("Search \"pay\": {} match(es), expand {:?}", hits.match_count, hits.expand);

    let assets = find_by_id(&forest, "G1").ok_or_else(|| anyhow::anyhow!("no assets node"))?;

    println!("\nColumns of {} (subtree):", assets.name);
    for column in engine.columns(assets, Scope::Subtree) {
        println!("  {}", column);
    }

    let root = &forest[0];
    let series = engine.variance_series(root, Scope::Subtree);
    println!("\nVariance (reporting - comparison):");
    for point in non_zero(series.clone()) {
        println!(
            "  {:<16} {:>10} ({:?})",
            point.name,
            display_amount(point.diff),
            point.favorability
        );
    }
    let totals = VarianceTotals::from_series(&series);
    println!(
        "  {} favorable, {} unfavorable",
        totals.favorable, totals.unfavorable
    );

    let offline = |_: &SummaryRequest| -> Result<SummaryResponse> {
        Err(StatementTreeError::Summarizer("no summarizer configured".to_string()))
    };
    let outcome = engine.summarize(&offline, root, Scope::Subtree, SummaryFilters::default());
    println!("\nSummary:\n  {}", outcome.summary);

    Ok(())
}
