//! Filter parameters of the financial statement endpoint.
//!
//! The engine never sends requests. This module only turns a filter
//! selection into the identifier segment and query string the SAP
//! `FinStmntSet` OData service expects, so a caller's transport can use it.

use crate::error::{Result, StatementTreeError};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const ODATA_BASE_PATH: &str = "/sap/opu/odata/sap/FAC_FINANCIAL_STATEMENT_SRV/FinStmntSet";

const SELECT_FIELDS: &[&str] = &[
    "FinancialStatementVariant",
    "FinancialStatementItem",
    "FinancialStatementItemText",
    "Currency",
    "Ledger",
    "HierarchyNode",
    "OperativeGLAccount",
    "OperativeGLAccountName",
    "FinStatementHierarchyLevelVal",
    "ParentNode",
    "ChildNode",
    "NodeType",
    "ReportingPeriodAmount",
    "ComparisonPeriodAmount",
    "RelativeDifferencePercent",
    "AbsoluteDifferenceAmount",
    "CorporateGroupAccount",
    "CorporateGroupAccountName",
    "PlanningCategory",
    "FunctionalArea",
];

const ORDER_BY: &str = "HierarchyNode,FinStatementHierarchyLevelVal,FinancialStatementItem,OperativeGLAccount asc";

const TOP: u32 = 1_000_000;

/// A posting period in SAP `YYYYPPP` form (year, then a 3-digit period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct SapPeriod {
    pub year: i32,
    pub period: u32,
}

impl SapPeriod {
    pub fn new(year: i32, period: u32) -> Option<Self> {
        (1..=12).contains(&period).then_some(Self { year, period })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            period: date.month(),
        }
    }

    /// Parses friendly year/month text, e.g. `("2025", "01")`.
    pub fn parse(year: &str, month: &str) -> Option<Self> {
        let year = year.trim();
        if year.is_empty() {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.trim().parse().ok()?;
        Self::new(year, month)
    }
}

impl std::fmt::Display for SapPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:03}", self.year, self.period)
    }
}

/// `("2025", "1")` becomes `"2025001"`. Missing or invalid input yields `None`.
pub fn sap_year_period(year: Option<&str>, month: Option<&str>) -> Option<String> {
    match (year, month) {
        (Some(year), Some(month)) => SapPeriod::parse(year, month).map(|p| p.to_string()),
        _ => None,
    }
}

/// Accepts `"1"` or `"01"` and returns the two-digit month, or `None` when
/// the text is not a month number.
pub fn normalize_month(month: &str) -> Option<String> {
    let value: u32 = month.trim().parse().ok()?;
    (1..=12).contains(&value).then(|| format!("{:02}", value))
}

/// Filter selection for the statement endpoint. Empty fields fall back to
/// the service defaults when the URL is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatementQuery {
    #[serde(rename = "P_KTOPL", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Company code / chart of accounts. Defaults to 0808.")]
    pub chart_of_accounts: Option<String>,

    #[serde(rename = "P_VERSN", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Financial statement version. Defaults to 2000_DRAFT.")]
    pub statement_version: Option<String>,

    #[serde(rename = "P_BILABTYP", default, skip_serializing_if = "Option::is_none")]
    pub statement_type: Option<String>,

    #[serde(rename = "P_XKTOP2", default, skip_serializing_if = "Option::is_none")]
    pub alternative_chart: Option<String>,

    #[serde(rename = "P_COMP_YEAR", default, skip_serializing_if = "Option::is_none")]
    pub comparison_year: Option<String>,

    #[serde(rename = "P_YEAR", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    #[serde(rename = "P_BUKRS", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Company code. Defaults to the chart of accounts value.")]
    pub company_code: Option<String>,

    #[serde(rename = "P_RLDNR", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Ledger. Defaults to 0L.")]
    pub ledger: Option<String>,

    #[serde(rename = "P_CURTP", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Currency type. Defaults to 10.")]
    pub currency_type: Option<String>,

    #[serde(rename = "P_FROM_YEARPERIOD", default, skip_serializing_if = "Option::is_none")]
    pub from_period: Option<String>,

    #[serde(rename = "P_TO_YEARPERIOD", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Defaults to the FROM period.")]
    pub to_period: Option<String>,

    #[serde(rename = "P_FROM_COMPYEARPERIOD", default, skip_serializing_if = "Option::is_none")]
    pub from_comparison_period: Option<String>,

    #[serde(rename = "P_TO_COMPYEARPERIOD", default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Defaults to the comparison FROM period.")]
    pub to_comparison_period: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "sap-client URL parameter. Defaults to 100.")]
    pub sap_client: Option<String>,
}

impl StatementQuery {
    /// Sets the reporting period from friendly year/month text. FROM and TO
    /// both become the same period.
    pub fn with_reporting_period(mut self, year: &str, month: &str) -> Result<Self> {
        let period = SapPeriod::parse(year, month).ok_or_else(|| invalid(year, month))?;
        self.from_period = Some(period.to_string());
        self.to_period = Some(period.to_string());
        self.year = Some(year.trim().to_string());
        Ok(self)
    }

    pub fn with_comparison_period(mut self, year: &str, month: &str) -> Result<Self> {
        let period = SapPeriod::parse(year, month).ok_or_else(|| invalid(year, month))?;
        self.from_comparison_period = Some(period.to_string());
        self.to_comparison_period = Some(period.to_string());
        self.comparison_year = Some(year.trim().to_string());
        Ok(self)
    }

    /// Identifier key/value pairs with defaults applied, in service order.
    pub fn resolved_parameters(&self) -> Vec<(&'static str, String)> {
        let chart = or_default(&self.chart_of_accounts, "0808");
        let from_period = or_default(&self.from_period, "");
        let from_comparison = or_default(&self.from_comparison_period, "");

        vec![
            ("P_KTOPL", chart.clone()),
            ("P_VERSN", or_default(&self.statement_version, "2000_DRAFT")),
            ("P_BILABTYP", or_default(&self.statement_type, "1")),
            ("P_XKTOP2", or_default(&self.alternative_chart, "")),
            ("P_COMP_YEAR", or_default(&self.comparison_year, "")),
            ("P_YEAR", or_default(&self.year, "")),
            ("P_BUKRS", or_default(&self.company_code, &chart)),
            ("P_RLDNR", or_default(&self.ledger, "0L")),
            ("P_CURTP", or_default(&self.currency_type, "10")),
            ("P_FROM_YEARPERIOD", from_period.clone()),
            ("P_TO_YEARPERIOD", or_default(&self.to_period, &from_period)),
            ("P_FROM_COMPYEARPERIOD", from_comparison.clone()),
            (
                "P_TO_COMPYEARPERIOD",
                or_default(&self.to_comparison_period, &from_comparison),
            ),
            ("P_ZERO", String::new()),
        ]
    }

    /// Full OData URL under `root`, e.g. `https://host:44300`.
    pub fn odata_url(&self, root: &str) -> String {
        let identifier = self
            .resolved_parameters()
            .into_iter()
            .map(|(key, value)| format!("{}=%27{}%27", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{}{}({})/Result?sap-client={}&$select={}&$top={}&$orderby={}",
            root.trim_end_matches('/'),
            ODATA_BASE_PATH,
            identifier,
            or_default(&self.sap_client, "100"),
            SELECT_FIELDS.join(","),
            TOP,
            ORDER_BY
        )
    }
}

fn or_default(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn invalid(year: &str, month: &str) -> StatementTreeError {
    StatementTreeError::InvalidPeriod {
        year: Some(year.to_string()),
        month: Some(month.to_string()),
    }
}
