//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::ConfigLocation;
use crate::error::Result;
use crate::output::Formatter;
use smarthire_pipeline::SmartHireConfig;

/// Execute the config command.
///
/// Runs without opening storage.
pub fn execute_config(
    args: ConfigArgs,
    location: &ConfigLocation,
    config: &SmartHireConfig,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            if location.init(force)? {
                println!(
                    "{}",
                    formatter.success(&format!("Wrote {}", location.path().display()))
                );
            } else {
                println!(
                    "{}",
                    formatter.warning(&format!(
                        "{} already exists; use --force to overwrite",
                        location.path().display()
                    ))
                );
            }
        }
    }

    Ok(())
}
