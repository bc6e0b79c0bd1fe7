//! Error types for spritesheet transformations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::layout::TileIndex;

/// Result type for spritegrid operations.
pub type SpriteResult<T> = Result<T, SpriteError>;

/// Errors that can occur while slicing, packing or exporting sprites.
///
/// A transformation never recovers from these internally. The first
/// failing tile aborts the whole batch and no partial output is returned.
#[derive(Debug, Error)]
pub enum SpriteError {
    /// The grid cannot be laid out (zero cell size, zero columns/rows,
    /// empty input without a size floor, zero-sized sheet).
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// A tile rectangle reaches outside the source sheet.
    #[error(
        "Tile {tile} at ({x}, {y}) sized {width}×{height} exceeds sheet bounds {sheet_width}×{sheet_height}"
    )]
    OutOfBounds {
        tile: TileIndex,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        sheet_width: u32,
        sheet_height: u32,
    },

    /// The encoder could not produce bytes for an image.
    #[error("Failed to encode {name}: {reason}")]
    EncodeFailure { name: String, reason: String },

    /// Input bytes could not be decoded into a raster.
    #[error("Failed to decode {name}: {reason}")]
    DecodeFailure { name: String, reason: String },

    /// Filesystem error while reading inputs or writing outputs.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Bundling outputs into an archive failed.
    #[error("Archive error: {0}")]
    Archive(String),
}

impl SpriteError {
    /// Shorthand for an [`SpriteError::InvalidLayout`] with a formatted reason.
    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        SpriteError::InvalidLayout(reason.into())
    }

    /// Returns true for errors caused by the layout options rather than the data.
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            SpriteError::InvalidLayout(_) | SpriteError::OutOfBounds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_layout_display() {
        let err = SpriteError::invalid_layout("columns must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid layout: columns must be greater than zero"
        );
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = SpriteError::OutOfBounds {
            tile: TileIndex::new(1, 3),
            x: 96,
            y: 32,
            width: 32,
            height: 32,
            sheet_width: 120,
            sheet_height: 64,
        };
        assert_eq!(
            err.to_string(),
            "Tile (1, 3) at (96, 32) sized 32×32 exceeds sheet bounds 120×64"
        );
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_encode_failure_display() {
        let err = SpriteError::EncodeFailure {
            name: "00-hero.png".to_string(),
            reason: "zero-sized image".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to encode 00-hero.png: zero-sized image");
        assert!(!err.is_layout_error());
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;

        let err = SpriteError::Io {
            path: PathBuf::from("/tmp/out"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error at /tmp/out"));
    }
}
