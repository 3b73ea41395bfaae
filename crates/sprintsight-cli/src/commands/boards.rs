//! Board monitoring commands.

use clap::Subcommand;
use sprintsight_core::monitor::monitor_boards;
use sprintsight_core::source::BoardSource;
use sprintsight_core::sprint::render_summary;

use super::common;

#[derive(Subcommand)]
pub enum BoardsAction {
    /// List scrum boards
    List,
    /// Monitor the active sprint of each board
    Monitor {
        /// Board ids to monitor (all boards when omitted)
        #[arg(long)]
        board: Vec<u64>,
        /// Emit snapshots as JSON instead of text summaries
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: BoardsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (config, classifier) = common::load_config()?;
    let client = common::jira_client(&config)?;

    match action {
        BoardsAction::List => {
            for board in client.boards()? {
                println!("{}\t{}\t{}", board.id, board.name, board.board_type);
            }
        }
        BoardsAction::Monitor { board, json } => {
            let reports = monitor_boards(&client, &client, &board, &classifier, common::now());
            for report in &reports {
                if json {
                    println!("{}", serde_json::to_string_pretty(&report.snapshot)?);
                } else {
                    println!("{}", render_summary(&report.snapshot));
                }
            }
        }
    }
    Ok(())
}
