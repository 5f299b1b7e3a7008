use crate::node::TreeNode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Distinct field names present across `records`, in order of first
/// appearance. `children` is structural and never reported.
pub fn discover_columns<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TreeNode>,
{
    let mut seen: HashSet<&'static str> = HashSet::new();
    let mut columns = Vec::new();

    for record in records {
        for (key, _) in record.field_values() {
            if seen.insert(key) {
                columns.push(key.to_string());
            }
        }
    }

    columns
}

/// An ad hoc table over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnTable {
    pub columns: Vec<String>,
    /// One row per record, one cell per column. Missing fields are `""`.
    pub rows: Vec<Vec<String>>,
}

impl ColumnTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn tabulate(records: &[&TreeNode]) -> ColumnTable {
    let columns = discover_columns(records.iter().copied());

    let rows = records
        .iter()
        .map(|record| {
            let values = record.field_values();
            columns
                .iter()
                .map(|column| {
                    values
                        .iter()
                        .find(|(key, _)| key == column)
                        .map(|(_, value)| value.clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    ColumnTable { columns, rows }
}
