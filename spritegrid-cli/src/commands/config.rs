//! `spritegrid config`: inspect and edit the saved layout defaults.
//!
//! Keys are written `section.field`, the same way they appear in
//! `config.ini`. Values saved here apply to every later `convert`, `split`
//! and `join` unless a flag overrides them.

use clap::Subcommand;
use spritegrid::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one saved value
    Get {
        /// Key such as layout.width or output.directory
        key: String,
    },

    /// Validate and save one value
    Set {
        /// Key such as layout.width or output.directory
        key: String,

        /// New value; an empty string clears output.directory
        value: String,
    },

    /// Print every key with its current value
    List,

    /// Print where config.ini lives
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'spritegrid config list' to see available keys.",
            key
        ))
    })
}

/// Get a configuration value.
fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load()?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }

    Ok(())
}

/// Set a configuration value.
fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut config = ConfigFile::load()?;
    config_key.set(&mut config, value)?;
    config.save()?;

    println!("{} = {}", config_key, config_key.get(&config));
    Ok(())
}

/// List all configuration settings.
fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    for line in format_listing(&config) {
        println!("{}", line);
    }
    Ok(())
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    let path = config_file_path()
        .ok_or_else(|| CliError::Config("no configuration directory on this platform".to_string()))?;
    println!("{}", path.display());
    Ok(())
}

/// One `section.key = value` line per setting, aligned on `=`.
fn format_listing(config: &ConfigFile) -> Vec<String> {
    let width = ConfigKey::ALL
        .iter()
        .map(|key| key.to_string().len())
        .max()
        .unwrap_or(0);

    ConfigKey::ALL
        .iter()
        .map(|key| {
            let value = key.get(config);
            let shown = if value.is_empty() { "(not set)".to_string() } else { value };
            format!("{:<width$} = {}", key.to_string(), shown, width = width)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_unknown() {
        let err = parse_key("layout.depth").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key 'layout.depth'"));
    }

    #[test]
    fn test_format_listing_covers_every_key() {
        let lines = format_listing(&ConfigFile::default());
        assert_eq!(lines.len(), ConfigKey::ALL.len());
        assert!(lines[0].starts_with("layout.x_offset"));
        assert!(lines[0].ends_with("= 0"));
        assert!(lines.iter().any(|l| l.starts_with("output.directory") && l.ends_with("(not set)")));
    }
}
