//! CLI error types.

use spritegrid::config::ConfigError;
use spritegrid::SpriteError;
use thiserror::Error;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Slicing, packing or exporting failed.
    #[error("{0}")]
    Sprite(#[from] SpriteError),

    /// Loading or saving the config file failed.
    #[error("{0}")]
    ConfigFile(#[from] ConfigError),

    /// Invalid configuration request.
    #[error("Configuration error: {0}")]
    Config(String),

    /// None of the given files could be read as an image.
    #[error("No readable images among {0} input file(s)")]
    NoImages(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_error_passes_message_through() {
        let err: CliError = SpriteError::invalid_layout("columns must be greater than zero").into();
        assert_eq!(
            err.to_string(),
            "Invalid layout: columns must be greater than zero"
        );
    }

    #[test]
    fn test_no_images_display() {
        assert_eq!(
            CliError::NoImages(3).to_string(),
            "No readable images among 3 input file(s)"
        );
    }
}
