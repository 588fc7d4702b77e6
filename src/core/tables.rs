//! Table inspection

use crate::adapters::warehouse::TableService;
use crate::core::classify::classify_at;
use crate::domain::{ErrorClass, Result, Stage, Table, TableReference, TableSchema};
use std::sync::Arc;

/// Looks up tables on the remote service
pub struct TableInspector<T: TableService + ?Sized> {
    service: Arc<T>,
}

impl<T: TableService + ?Sized> TableInspector<T> {
    pub fn new(service: Arc<T>) -> Self {
        Self { service }
    }

    /// True if the table exists; only a not-found answer counts as "no"
    pub async fn table_exists(&self, table: &TableReference) -> Result<bool> {
        match self.service.get_table(table).await {
            Ok(_) => Ok(true),
            Err(cause) => {
                let err = classify_at(Stage::Inspection, cause);
                if err.class == ErrorClass::NotFound {
                    Ok(false)
                } else {
                    Err(err.into())
                }
            }
        }
    }

    pub async fn get_table(&self, table: &TableReference) -> Result<Table> {
        self.service
            .get_table(table)
            .await
            .map_err(|e| classify_at(Stage::Inspection, e).into())
    }

    /// Schema of the table, `None` if it has none yet
    pub async fn get_table_schema(&self, table: &TableReference) -> Result<Option<TableSchema>> {
        Ok(self.get_table(table).await?.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RemoteError, TableField};
    use async_trait::async_trait;

    struct FixedTable(std::result::Result<Table, RemoteError>);

    #[async_trait]
    impl TableService for FixedTable {
        async fn get_table(
            &self,
            _table: &TableReference,
        ) -> std::result::Result<Table, RemoteError> {
            self.0.clone()
        }
    }

    fn orders() -> TableReference {
        "proj1:sales.orders".parse().unwrap()
    }

    fn inspector(result: std::result::Result<Table, RemoteError>) -> TableInspector<FixedTable> {
        TableInspector::new(Arc::new(FixedTable(result)))
    }

    #[tokio::test]
    async fn test_table_exists() {
        let table = Table {
            reference: orders(),
            schema: None,
            num_rows: Some(3),
        };
        assert!(inspector(Ok(table)).table_exists(&orders()).await.unwrap());
    }

    #[tokio::test]
    async fn test_not_found_means_absent() {
        let missing = inspector(Err(RemoteError::http(404, "Not found: Table")));
        assert!(!missing.table_exists(&orders()).await.unwrap());
    }

    #[tokio::test]
    async fn test_other_failures_propagate() {
        let denied = inspector(Err(
            RemoteError::http(403, "Access Denied").with_reason("accessDenied")
        ));
        let err = denied.table_exists(&orders()).await.unwrap_err();
        assert_eq!(err.as_remote().map(|r| r.class), Some(ErrorClass::Fatal));
    }

    #[tokio::test]
    async fn test_get_table_schema() {
        let table = Table {
            reference: orders(),
            schema: Some(TableSchema {
                fields: vec![TableField {
                    name: "id".to_string(),
                    field_type: "INTEGER".to_string(),
                    mode: Some("REQUIRED".to_string()),
                    fields: vec![],
                }],
            }),
            num_rows: None,
        };
        let schema = inspector(Ok(table))
            .get_table_schema(&orders())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(schema.fields[0].name, "id");
    }
}
