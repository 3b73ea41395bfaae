//! Task export commands.

use std::path::PathBuf;

use clap::Subcommand;
use sprintsight_core::report::{export_tasks, select_columns, task_columns};
use sprintsight_core::CapacityEngine;

use super::common;

#[derive(Subcommand)]
pub enum TasksAction {
    /// Export tasks matching a query to CSV, with remaining-effort forecasts
    Export {
        /// JQL query selecting the tasks
        query: String,
        /// Output file
        #[arg(long, default_value = "out/tasks.csv")]
        output: PathBuf,
        /// Comma-separated column names (full registry when omitted)
        #[arg(long)]
        columns: Option<String>,
    },
    /// List available report columns
    Columns,
}

pub fn run(action: TasksAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TasksAction::Export {
            query,
            output,
            columns,
        } => {
            let (config, classifier) = common::load_config()?;
            let client = common::jira_client(&config)?;
            let mut engine = CapacityEngine::new(config.capacity.clone(), classifier);
            let selected = match &columns {
                Some(names) => {
                    let names: Vec<&str> = names.split(',').map(str::trim).collect();
                    select_columns(task_columns(), &names)?
                }
                None => task_columns(),
            };
            let rows = export_tasks(
                &client,
                &mut engine,
                &query,
                &selected,
                &output,
                common::now(),
            )?;
            println!("Wrote {rows} rows to {}", output.display());
        }
        TasksAction::Columns => {
            for column in task_columns() {
                println!("{}", column.name);
            }
        }
    }
    Ok(())
}
