//! Sprites → spritesheet.
//!
//! Every sprite gets a cell as large as the largest sprite (and at least the
//! configured cell size), is centered in it, and is drawn in row-major order.
//! With `gms_compatible` a blank placeholder takes slot 0 so that the first
//! real sprite lands in slot 1.
//!
//! Drawing is serialized onto a single surface; only the final encode is
//! handed to the encoder.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SpriteResult;
use crate::layout::{CanvasGrid, LayoutOptions};
use crate::raster::{
    Blend, EncodedImage, ImageEncoder, PngImageEncoder, RasterImage, RasterSurface, RgbaSurface,
};

/// File name of every packed sheet.
pub const SPRITE_SHEET_NAME: &str = "Sprite Sheet.png";

/// Pack sprites into one sheet without encoding it.
///
/// The sheet inherits the directory of the first input sprite.
///
/// # Errors
///
/// Returns [`SpriteError::InvalidLayout`](crate::SpriteError::InvalidLayout)
/// if the options are invalid, or if `sprites` is empty and
/// `options.allow_empty` is not set.
///
/// # Example
///
/// ```
/// use image::RgbaImage;
/// use spritegrid::{assemble, LayoutOptions, RasterImage};
///
/// let sprites: Vec<RasterImage> = (0..9)
///     .map(|i| RasterImage::new(format!("{i}.png"), RgbaImage::new(32, 32)))
///     .collect();
///
/// let sheet = assemble(&sprites, &LayoutOptions::default()).unwrap();
/// assert_eq!(sheet.name, "Sprite Sheet.png");
/// // 4 columns, ceil(9 / 4) = 3 rows
/// assert_eq!(sheet.dimensions(), (128, 96));
/// ```
pub fn assemble(sprites: &[RasterImage], options: &LayoutOptions) -> SpriteResult<RasterImage> {
    let grid = CanvasGrid::resolve(sprites.iter().map(RasterImage::dimensions), options)?;
    let (width, height) = grid.canvas_size()?;

    let mut surface = RgbaSurface::default();
    surface.resize_canvas(width, height);

    let placeholder = grid
        .has_placeholder
        .then(|| RasterImage::blank("placeholder", grid.cell_width, grid.cell_height));

    for (slot, sprite) in placeholder.iter().chain(sprites).enumerate() {
        let (x, y) = grid.draw_position(slot, sprite.width(), sprite.height());
        debug!(slot, sprite = %sprite.name, x, y, "Drawing sprite");
        surface.write_rect(sprite.pixels(), x, y, Blend::SourceOver);
    }

    let path = sprites.first().and_then(|sprite| sprite.path.clone());
    Ok(RasterImage::new(SPRITE_SHEET_NAME, surface.into_image()).with_path(path))
}

/// Packs sprites and encodes the resulting sheet.
#[derive(Clone)]
pub struct Assembler {
    encoder: Arc<dyn ImageEncoder>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// Create an assembler that encodes the sheet as PNG.
    pub fn new() -> Self {
        Self::with_encoder(Arc::new(PngImageEncoder::new()))
    }

    /// Create an assembler with a custom encoder.
    pub fn with_encoder(encoder: Arc<dyn ImageEncoder>) -> Self {
        Self { encoder }
    }

    /// Pack `sprites` into one sheet and encode it.
    pub fn run(&self, sprites: &[RasterImage], options: &LayoutOptions) -> SpriteResult<EncodedImage> {
        let sheet = assemble(sprites, options)?;
        let encoded = EncodedImage::encode(&sheet, self.encoder.as_ref())?;

        info!(
            sprites = sprites.len(),
            width = encoded.width,
            height = encoded.height,
            encoder = self.encoder.name(),
            "Packed spritesheet"
        );
        Ok(encoded)
    }
}
