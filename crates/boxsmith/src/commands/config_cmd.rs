//! `boxsmith config`: manage the CLI configuration file.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{Config, Resolved, config_path, save_config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = save_config(&Config::default())?;
            if !global.quiet {
                eprintln!("Wrote {}", written.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let resolved = Resolved::new(global)?;
            let out = match resolved.output {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&resolved.config)
                    .map_err(|err| CliError::Validation {
                        field: "config".into(),
                        reason: err.to_string(),
                    })?,
                format => output::render_single(
                    format,
                    &resolved.config,
                    |_| Ok(String::new()),
                    |_| String::new(),
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
