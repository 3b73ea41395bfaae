//! Capacity statistics commands.

use std::path::PathBuf;

use clap::Subcommand;
use sprintsight_core::report::export_capacity;
use sprintsight_core::CapacityEngine;

use super::common;

#[derive(Subcommand)]
pub enum CapacityAction {
    /// Show per-employee velocity statistics for a project
    Show {
        /// Project key
        project: String,
    },
    /// Export velocity statistics to CSV
    Export {
        /// Project key
        project: String,
        /// Output directory
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
}

pub fn run(action: CapacityAction) -> Result<(), Box<dyn std::error::Error>> {
    let (config, classifier) = common::load_config()?;
    let client = common::jira_client(&config)?;
    let mut engine = CapacityEngine::new(config.capacity.clone(), classifier);

    match action {
        CapacityAction::Show { project } => {
            let stats = engine.project_stats(&project, &client, common::now())?;
            println!("{}", serde_json::to_string_pretty(&stats.ordered())?);
        }
        CapacityAction::Export { project, out_dir } => {
            let path = out_dir.join(format!("{project}.csv"));
            let rows = export_capacity(&client, &mut engine, &project, &path, common::now())?;
            println!("Wrote {rows} rows to {}", path.display());
        }
    }
    Ok(())
}
