//! Direction selection: one image is sliced, several are packed.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::assemble::Assembler;
use crate::disassemble::Disassembler;
use crate::error::SpriteResult;
use crate::layout::LayoutOptions;
use crate::raster::{EncodedImage, ImageEncoder, PngImageEncoder, RasterImage};

/// Which way a batch of images is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Spritesheet → sprites.
    Split,
    /// Sprites → spritesheet.
    Join,
}

impl Direction {
    /// Pick the direction for a number of input images.
    ///
    /// Returns `None` when there is nothing to transform.
    pub fn for_input_count(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Direction::Split),
            _ => Some(Direction::Join),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Split => write!(f, "split"),
            Direction::Join => write!(f, "join"),
        }
    }
}

/// Runs slicing or packing with a shared encoder.
#[derive(Clone)]
pub struct Transformer {
    disassembler: Disassembler,
    assembler: Assembler,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::with_encoder(Arc::new(PngImageEncoder::new()))
    }
}

impl Transformer {
    /// Create a transformer whose outputs are encoded by `encoder`.
    pub fn with_encoder(encoder: Arc<dyn ImageEncoder>) -> Self {
        Self {
            disassembler: Disassembler::with_encoder(Arc::clone(&encoder)),
            assembler: Assembler::with_encoder(encoder),
        }
    }

    /// Transform `images`, choosing the direction from how many there are.
    ///
    /// An empty input produces no output.
    pub fn transform(&self, images: &[RasterImage], options: &LayoutOptions) -> SpriteResult<Vec<EncodedImage>> {
        match Direction::for_input_count(images.len()) {
            Some(direction) => self.transform_as(direction, images, options),
            None => {
                info!("No images to transform");
                Ok(Vec::new())
            }
        }
    }

    /// Transform `images` in a fixed direction.
    ///
    /// Splitting several sheets slices each in turn and concatenates the
    /// tiles in input order.
    pub fn transform_as(
        &self,
        direction: Direction,
        images: &[RasterImage],
        options: &LayoutOptions,
    ) -> SpriteResult<Vec<EncodedImage>> {
        match direction {
            Direction::Split => {
                let mut outputs = Vec::new();
                for sheet in images {
                    outputs.extend(self.disassembler.run(sheet, options)?);
                }
                Ok(outputs)
            }
            Direction::Join => Ok(vec![self.assembler.run(images, options)?]),
        }
    }
}

/// Transform `images` with PNG output, choosing the direction from the count.
pub fn transform_images(images: &[RasterImage], options: &LayoutOptions) -> SpriteResult<Vec<EncodedImage>> {
    Transformer::default().transform(images, options)
}
