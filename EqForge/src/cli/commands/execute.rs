//! Command execution implementations

use super::{Commands, convert, inspect, load_catalog, load_config, object, zone};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                input,
                output,
                config,
                zones,
                quiet,
            } => convert::execute(
                input,
                output,
                &load_config(config.as_deref())?,
                &load_catalog(zones.as_deref())?,
                *quiet,
            ),
            Commands::Zone {
                source,
                output,
                config,
                zones,
            } => zone::execute(
                source,
                output,
                &load_config(config.as_deref())?,
                &load_catalog(zones.as_deref())?,
            ),
            Commands::Object { source, output, config } => {
                object::execute(source, output, &load_config(config.as_deref())?)
            }
            Commands::Inspect { file } => inspect::execute(file),
        }
    }
}
