//! Spritesheet → sprites.
//!
//! A sheet is copied onto a [`RasterSurface`], the grid is resolved with
//! [`SheetGrid::resolve`], and every cell is read back out in row-major order.
//! Tiles are named `"{row}{column}-{sheet name}"` and inherit the sheet's
//! directory.
//!
//! Cells never overlap and the surface is only read, so extraction and
//! encoding run in parallel with rayon. The first failing tile aborts the
//! whole call.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{SpriteError, SpriteResult};
use crate::layout::{LayoutOptions, SheetGrid, TileIndex};
use crate::raster::{
    Blend, EncodedImage, ImageEncoder, PngImageEncoder, RasterImage, RasterSurface, RgbaSurface,
};

/// Name of the tile at `tile` cut from a sheet called `sheet_name`.
pub fn tile_name(tile: TileIndex, sheet_name: &str) -> String {
    format!("{}-{}", tile.name_prefix(), sheet_name)
}

/// Slice a sheet into tiles without encoding them.
///
/// # Errors
///
/// - [`SpriteError::InvalidLayout`] if the grid cannot be resolved
/// - [`SpriteError::OutOfBounds`] if any tile reaches outside the sheet
///
/// # Example
///
/// ```
/// use image::RgbaImage;
/// use spritegrid::{disassemble, LayoutOptions, RasterImage};
///
/// let sheet = RasterImage::new("walk.png", RgbaImage::new(128, 128));
/// let options = LayoutOptions::default().with_auto_calc(true);
///
/// let tiles = disassemble(&sheet, &options).unwrap();
/// assert_eq!(tiles.len(), 16);
/// assert_eq!(tiles[0].name, "00-walk.png");
/// assert_eq!(tiles[15].name, "33-walk.png");
/// ```
pub fn disassemble(sheet: &RasterImage, options: &LayoutOptions) -> SpriteResult<Vec<RasterImage>> {
    let (width, height) = sheet.dimensions();
    let grid = SheetGrid::resolve(width, height, options)?;

    let mut surface = RgbaSurface::default();
    surface.resize_canvas(width, height);
    surface.write_rect(sheet.pixels(), 0, 0, Blend::Replace);

    extract_tiles(&surface, &grid, sheet)
}

fn extract_tiles<S>(surface: &S, grid: &SheetGrid, sheet: &RasterImage) -> SpriteResult<Vec<RasterImage>>
where
    S: RasterSurface + Sync,
{
    let tiles: Vec<TileIndex> = grid.tiles().collect();

    tiles
        .into_par_iter()
        .map(|tile| -> SpriteResult<RasterImage> {
            let rect = grid.rect(tile)?;
            let pixels = surface.read_rect(rect).ok_or_else(|| SpriteError::OutOfBounds {
                tile,
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                sheet_width: grid.sheet_width,
                sheet_height: grid.sheet_height,
            })?;
            debug!(%tile, x = rect.x, y = rect.y, "Extracted tile");

            Ok(RasterImage::new(tile_name(tile, &sheet.name), pixels).with_path(sheet.path.clone()))
        })
        .collect()
}

/// Slices sheets and encodes every tile.
///
/// # Example
///
/// ```
/// use image::RgbaImage;
/// use spritegrid::{Disassembler, LayoutOptions, RasterImage};
///
/// let sheet = RasterImage::new("idle.png", RgbaImage::new(64, 32));
/// let options = LayoutOptions::default().with_grid(2, 1);
///
/// let files = Disassembler::new().run(&sheet, &options).unwrap();
/// assert_eq!(files.len(), 2);
/// assert_eq!((files[1].width, files[1].height), (32, 32));
/// ```
#[derive(Clone)]
pub struct Disassembler {
    encoder: Arc<dyn ImageEncoder>,
}

impl Default for Disassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Disassembler {
    /// Create a disassembler that encodes tiles as PNG.
    pub fn new() -> Self {
        Self::with_encoder(Arc::new(PngImageEncoder::new()))
    }

    /// Create a disassembler with a custom encoder.
    pub fn with_encoder(encoder: Arc<dyn ImageEncoder>) -> Self {
        Self { encoder }
    }

    /// Slice `sheet` and encode every tile.
    ///
    /// Returns tiles in row-major order. Either every tile is encoded or the
    /// call fails.
    pub fn run(&self, sheet: &RasterImage, options: &LayoutOptions) -> SpriteResult<Vec<EncodedImage>> {
        let tiles = disassemble(sheet, options)?;

        let encoded: Vec<EncodedImage> = tiles
            .par_iter()
            .map(|tile| EncodedImage::encode(tile, self.encoder.as_ref()))
            .collect::<SpriteResult<_>>()?;

        info!(
            sheet = %sheet.name,
            tiles = encoded.len(),
            encoder = self.encoder.name(),
            "Sliced spritesheet"
        );
        Ok(encoded)
    }
}
