//! Configuration management commands.

use clap::Subcommand;
use sprintsight_core::AnalysisConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = AnalysisConfig::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", AnalysisConfig::default_path()?.display());
        }
        ConfigAction::Init => {
            let path = AnalysisConfig::default().save()?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
