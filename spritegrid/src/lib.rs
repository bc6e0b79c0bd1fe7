//! Spritegrid - spritesheet slicing and packing
//!
//! This library cuts a spritesheet into a grid of sprites, and packs a list
//! of sprites into a spritesheet, given a grid layout (offsets, padding,
//! cell size, column/row count).
//!
//! # Overview
//!
//! - [`disassemble`] / [`Disassembler`] - one sheet → row-major tiles named
//!   `"{row}{column}-{sheet name}"`
//! - [`assemble`] / [`Assembler`] - many sprites → one `"Sprite Sheet.png"`
//! - [`Transformer`] - picks the direction from the number of inputs
//! - [`export`] - bundling and export sinks
//! - [`config`] - persisted defaults
//!
//! # Example
//!
//! ```
//! use image::RgbaImage;
//! use spritegrid::{assemble, disassemble, LayoutOptions, RasterImage};
//!
//! let sprites: Vec<RasterImage> = (0..4)
//!     .map(|i| RasterImage::new(format!("frame{i}.png"), RgbaImage::new(32, 32)))
//!     .collect();
//!
//! let options = LayoutOptions::default().with_grid(2, 2);
//! let sheet = assemble(&sprites, &options).unwrap();
//! assert_eq!(sheet.dimensions(), (64, 64));
//!
//! let tiles = disassemble(&sheet, &options).unwrap();
//! assert_eq!(tiles.len(), 4);
//! assert_eq!(tiles[3].name, "11-Sprite Sheet.png");
//! ```

pub mod assemble;
pub mod config;
pub mod disassemble;
pub mod error;
pub mod export;
pub mod layout;
pub mod raster;
pub mod transform;

pub use assemble::{assemble, Assembler, SPRITE_SHEET_NAME};
pub use disassemble::{disassemble, tile_name, Disassembler};
pub use error::{SpriteError, SpriteResult};
pub use export::{
    bundle_files, save_files, DirectorySink, ExportReport, ExportSink, MemorySink,
};
pub use layout::{CanvasGrid, LayoutOptions, SheetGrid, TileIndex, TileRect};
pub use raster::{
    Blend, EncodedImage, ImageEncoder, PngCompression, PngImageEncoder, RasterImage,
    RasterSurface, RgbaSurface,
};
pub use transform::{transform_images, Direction, Transformer};
