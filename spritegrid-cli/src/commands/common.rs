//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use spritegrid::config::ConfigFile;
use spritegrid::{DirectorySink, ExportSink, LayoutOptions};

use crate::prompt::PromptDirectorySink;

/// Grid and output flags shared by `convert`, `split` and `join`.
///
/// Unset flags fall back to the config file, then to the built-in defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct LayoutArgs {
    /// Horizontal position of the grid origin
    #[arg(long, value_name = "PX")]
    pub x_offset: Option<u32>,

    /// Vertical position of the grid origin
    #[arg(long, value_name = "PX")]
    pub y_offset: Option<u32>,

    /// Horizontal gap between cells
    #[arg(long, value_name = "PX")]
    pub x_padding: Option<u32>,

    /// Vertical gap between cells
    #[arg(long, value_name = "PX")]
    pub y_padding: Option<u32>,

    /// Cell width (minimum when joining)
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Cell height (minimum when joining)
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Number of grid columns
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub columns: Option<u32>,

    /// Number of grid rows (splitting only)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub rows: Option<u32>,

    /// Derive columns and rows from the sheet size and cell size when splitting
    #[arg(long = "auto", overrides_with = "no_auto")]
    pub auto_calc: bool,

    /// Use the given columns and rows even if the config enables --auto
    #[arg(long = "no-auto", overrides_with = "auto_calc")]
    pub no_auto: bool,

    /// Reserve the first cell as a blank placeholder when joining (GameMaker Studio)
    #[arg(long, overrides_with = "no_gms")]
    pub gms: bool,

    /// Do not reserve a placeholder cell
    #[arg(long, overrides_with = "gms")]
    pub no_gms: bool,

    /// Zip multiple outputs into Sprites.zip
    #[arg(long, overrides_with = "no_bundle")]
    pub bundle: bool,

    /// Save outputs as separate files
    #[arg(long, overrides_with = "bundle")]
    pub no_bundle: bool,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Ask for the output directory before saving
    #[arg(long, overrides_with = "no_ask")]
    pub ask: bool,

    /// Save without asking, even if the config enables ask_location
    #[arg(long, overrides_with = "ask")]
    pub no_ask: bool,
}

/// Resolve a `--flag`/`--no-flag` pair against the configured value.
fn switch(on: bool, off: bool, configured: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => configured,
    }
}

impl LayoutArgs {
    /// Resolve layout options from CLI args and config.
    pub fn resolve_layout(&self, config: &ConfigFile) -> LayoutOptions {
        // CLI takes precedence, then config
        let base = config.layout;
        LayoutOptions {
            x_offset: self.x_offset.unwrap_or(base.x_offset),
            y_offset: self.y_offset.unwrap_or(base.y_offset),
            x_padding: self.x_padding.unwrap_or(base.x_padding),
            y_padding: self.y_padding.unwrap_or(base.y_padding),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            columns: self.columns.unwrap_or(base.columns),
            rows: self.rows.unwrap_or(base.rows),
            auto_calc_spritesheet: switch(self.auto_calc, self.no_auto, base.auto_calc_spritesheet),
            gms_compatible: switch(self.gms, self.no_gms, base.gms_compatible),
            bundle_files: switch(self.bundle, self.no_bundle, base.bundle_files),
            allow_empty: base.allow_empty,
        }
    }

    /// Output directory from CLI args and config, defaulting to the current directory.
    pub fn resolve_output_dir(&self, config: &ConfigFile) -> PathBuf {
        self.output
            .clone()
            .or_else(|| config.output.directory.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Pick the export sink for this run.
    pub fn resolve_sink(&self, config: &ConfigFile) -> Box<dyn ExportSink> {
        let directory = self.resolve_output_dir(config);
        if switch(self.ask, self.no_ask, config.output.ask_location) {
            Box::new(PromptDirectorySink::new(directory))
        } else {
            Box::new(DirectorySink::new(directory))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_flags_or_config() {
        let options = LayoutArgs::default().resolve_layout(&ConfigFile::default());
        assert_eq!(options, LayoutOptions::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = ConfigFile::default();
        config.layout = config.layout.with_grid(8, 8).with_cell_size(16, 16);

        let args = LayoutArgs {
            columns: Some(2),
            gms: true,
            ..Default::default()
        };
        let options = args.resolve_layout(&config);
        assert_eq!(options.columns, 2);
        assert_eq!(options.rows, 8);
        assert_eq!(options.width, 16);
        assert!(options.gms_compatible);
    }

    #[test]
    fn test_config_switches_apply_without_flags() {
        let mut config = ConfigFile::default();
        config.layout.bundle_files = true;
        config.layout.allow_empty = true;
        let options = LayoutArgs::default().resolve_layout(&config);
        assert!(options.bundle_files);
        assert!(options.allow_empty);
    }

    #[test]
    fn test_negated_flags_turn_config_switches_off() {
        let mut config = ConfigFile::default();
        config.layout = config
            .layout
            .with_auto_calc(true)
            .with_gms_compatible(true)
            .with_bundle_files(true)
            .with_allow_empty(true);

        let args = LayoutArgs {
            no_auto: true,
            no_gms: true,
            no_bundle: true,
            ..Default::default()
        };
        let options = args.resolve_layout(&config);
        assert!(!options.auto_calc_spritesheet);
        assert!(!options.gms_compatible);
        assert!(!options.bundle_files);
        assert!(options.allow_empty);
    }

    #[test]
    fn test_output_dir_precedence() {
        let mut config = ConfigFile::default();
        assert_eq!(
            LayoutArgs::default().resolve_output_dir(&config),
            PathBuf::from(".")
        );

        config.output.directory = Some(PathBuf::from("/from/config"));
        assert_eq!(
            LayoutArgs::default().resolve_output_dir(&config),
            PathBuf::from("/from/config")
        );

        let args = LayoutArgs {
            output: Some(PathBuf::from("/from/cli")),
            ..Default::default()
        };
        assert_eq!(args.resolve_output_dir(&config), PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_sink_selection() {
        let mut config = ConfigFile::default();
        assert_eq!(LayoutArgs::default().resolve_sink(&config).name(), "directory");

        config.output.ask_location = true;
        assert_eq!(LayoutArgs::default().resolve_sink(&config).name(), "prompt");

        let args = LayoutArgs {
            no_ask: true,
            ..Default::default()
        };
        assert_eq!(args.resolve_sink(&config).name(), "directory");
    }
}
