//! Table command implementation

use crate::adapters::warehouse::WarehouseClient;
use crate::cli::{exit_code, exit_code_for};
use crate::config::load_config;
use crate::core::tables::TableInspector;
use crate::domain::{ErrorClass, TableField, TableReference};
use clap::Args;
use std::sync::Arc;

/// Arguments for the table command
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Table as `project:dataset.table` or `project.dataset.table`
    #[arg(short, long)]
    pub table: String,

    /// Print the schema as well
    #[arg(long)]
    pub schema: bool,
}

impl TableArgs {
    /// Execute the table command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let reference: TableReference = match self.table.parse() {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Invalid --table: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let client = Arc::new(WarehouseClient::new(&config.service)?);
        let inspector = TableInspector::new(client);

        let table = match inspector.get_table(&reference).await {
            Ok(t) => t,
            Err(e) if e.as_remote().map(|r| r.class) == Some(ErrorClass::NotFound) => {
                println!("Table {reference} does not exist");
                return Ok(exit_code::JOB_FAILED);
            }
            Err(e) => {
                eprintln!("Failed to fetch table: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("Table: {}", table.reference);
        if let Some(rows) = table.num_rows {
            println!("Rows:  {rows}");
        }

        if self.schema {
            match &table.schema {
                Some(schema) => {
                    println!("Schema:");
                    print_fields(&schema.fields, 1);
                }
                None => println!("Schema: (none)"),
            }
        }

        Ok(exit_code::SUCCESS)
    }
}

fn print_fields(fields: &[TableField], depth: usize) {
    for field in fields {
        let mode = field.mode.as_deref().unwrap_or("NULLABLE");
        println!(
            "{}{} {} {}",
            "  ".repeat(depth),
            field.name,
            field.field_type,
            mode
        );
        print_fields(&field.fields, depth + 1);
    }
}
