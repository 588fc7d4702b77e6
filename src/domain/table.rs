//! Table reference and table resource models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fully qualified table name
///
/// Parses both `project:dataset.table` and `project.dataset.table`. Project
/// IDs may themselves contain a domain prefix (`example.com:analytics`), so
/// the last `:` separates the project from the dataset.
///
/// ```
/// use jobrelay::domain::TableReference;
///
/// let table: TableReference = "proj1:sales.orders".parse().unwrap();
/// assert_eq!(table.dataset_id, "sales");
/// assert_eq!(table.to_string(), "proj1:sales.orders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableReference {
    /// Project that owns the dataset
    pub project_id: String,

    /// Dataset containing the table
    pub dataset_id: String,

    /// Table name
    pub table_id: String,
}

impl TableReference {
    /// Create a new table reference, rejecting empty components
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Result<Self, String> {
        let table = Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        };

        if table.project_id.is_empty() || table.dataset_id.is_empty() || table.table_id.is_empty()
        {
            return Err(format!(
                "Table reference '{table}' must have non-empty project, dataset and table"
            ));
        }

        Ok(table)
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

impl FromStr for TableReference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((project, rest)) = s.rsplit_once(':') {
            let (dataset, table) = rest
                .split_once('.')
                .ok_or_else(|| format!("Invalid table reference '{s}': expected dataset.table"))?;
            return Self::new(project, dataset, table);
        }

        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [project, dataset, table] => Self::new(*project, *dataset, *table),
            _ => Err(format!(
                "Invalid table reference '{s}': expected project:dataset.table or project.dataset.table"
            )),
        }
    }
}

/// A single column of a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableField {
    /// Column name
    pub name: String,

    /// Column type as reported by the service (STRING, INTEGER, RECORD, ...)
    #[serde(rename = "type")]
    pub field_type: String,

    /// NULLABLE, REQUIRED or REPEATED
    #[serde(default)]
    pub mode: Option<String>,

    /// Nested columns for RECORD fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TableField>,
}

/// Table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableSchema {
    /// Top-level columns
    #[serde(default)]
    pub fields: Vec<TableField>,
}

/// Table resource: describes the table, not its data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Identity of the table
    pub reference: TableReference,

    /// Schema, absent for tables that have none yet
    #[serde(default)]
    pub schema: Option<TableSchema>,

    /// Number of rows, if reported
    #[serde(default)]
    pub num_rows: Option<u64>,
}
