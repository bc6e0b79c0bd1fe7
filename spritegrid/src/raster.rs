//! Raster buffers, drawing surfaces and image encoders.
//!
//! The slicing and packing code never touches pixels directly. It goes
//! through two seams:
//!
//! ```text
//! ┌────────────────────┐      ┌────────────────────┐
//! │  disassemble /     │─────▶│   RasterSurface    │ (trait)
//! │  assemble          │      │ load/read/write/   │
//! │                    │      │ resize             │
//! │                    │      └─────────┬──────────┘
//! │                    │                ▼
//! │                    │          RgbaSurface
//! │                    │
//! │                    │      ┌────────────────────┐
//! │                    │─────▶│   ImageEncoder     │ (trait)
//! └────────────────────┘      └─────────┬──────────┘
//!                                       ▼
//!                                PngImageEncoder
//! ```

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::imageops;
use image::{ExtendedColorType, ImageEncoder as _, RgbaImage};

use crate::error::{SpriteError, SpriteResult};
use crate::layout::TileRect;

/// An owned RGBA raster plus where it came from.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// File name, including extension (e.g. `"hero.png"`).
    pub name: String,
    /// Directory the image was loaded from, if any.
    pub path: Option<PathBuf>,
    /// Modification time of the source file, if known.
    pub source_timestamp: Option<DateTime<Utc>>,
    pixels: RgbaImage,
}

impl RasterImage {
    /// Wrap a pixel buffer.
    pub fn new(name: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            name: name.into(),
            path: None,
            source_timestamp: None,
            pixels,
        }
    }

    /// A fully transparent image.
    pub fn blank(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(name, RgbaImage::new(width, height))
    }

    /// Set the source directory.
    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    /// Set the source timestamp.
    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.source_timestamp = timestamp;
        self
    }

    /// Decode an image from encoded bytes (PNG, JPEG, GIF, BMP or WebP).
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::DecodeFailure`] if the bytes are not a
    /// supported image.
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> SpriteResult<Self> {
        let name = name.into();
        let mut surface = RgbaSurface::default();
        surface.load_into(&name, bytes)?;
        Ok(Self::new(name, surface.into_image()))
    }

    /// Read and decode an image file, recording its name, directory and
    /// modification time.
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::Io`] if the file cannot be read and
    /// [`SpriteError::DecodeFailure`] if it is not an image.
    pub fn open(path: &Path) -> SpriteResult<Self> {
        let bytes = fs::read(path).map_err(|source| SpriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let timestamp = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);

        Ok(Self::decode(name, &bytes)?
            .with_path(directory)
            .with_timestamp(timestamp))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// An encoded output file ready to hand to an export sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Output file name.
    pub name: String,
    /// Directory inherited from the source image, if any.
    pub path: Option<PathBuf>,
    /// Pixel width of the encoded image (0 for non-image payloads).
    pub width: u32,
    /// Pixel height of the encoded image (0 for non-image payloads).
    pub height: u32,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// Encode a raster with the given encoder, keeping its name and path.
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::EncodeFailure`] if the encoder rejects the image.
    pub fn encode(image: &RasterImage, encoder: &dyn ImageEncoder) -> SpriteResult<Self> {
        let bytes = encoder.encode(&image.name, image.pixels())?;
        Ok(Self {
            name: image.name.clone(),
            path: image.path.clone(),
            width: image.width(),
            height: image.height(),
            mime_type: encoder.mime_type(),
            bytes,
        })
    }
}

/// How pixels written to a surface combine with what is already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Destination pixels are overwritten, alpha included.
    Replace,
    /// Source-over alpha compositing; fully transparent source pixels leave
    /// the destination untouched.
    SourceOver,
}

/// A mutable 2D pixel buffer that tiles are read from and drawn into.
///
/// Implementations may be reused across calls by the host; every
/// [`resize_canvas`](RasterSurface::resize_canvas) starts from a blank,
/// fully transparent buffer.
pub trait RasterSurface {
    /// Replace the surface contents with a decoded image.
    ///
    /// Returns the decoded dimensions.
    fn load_into(&mut self, name: &str, bytes: &[u8]) -> SpriteResult<(u32, u32)>;

    /// Current `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Copy a rectangle out of the surface.
    ///
    /// Returns `None` if the rectangle is not fully inside the surface.
    fn read_rect(&self, rect: TileRect) -> Option<RgbaImage>;

    /// Write `pixels` with its top-left corner at `(x, y)`.
    ///
    /// The position may be negative or reach past the edges; whatever falls
    /// outside the surface is dropped.
    fn write_rect(&mut self, pixels: &RgbaImage, x: i64, y: i64, blend: Blend);

    /// Discard the contents and reallocate at the given size.
    fn resize_canvas(&mut self, width: u32, height: u32);

    /// Take the pixel buffer out of the surface.
    fn into_image(self) -> RgbaImage
    where
        Self: Sized;
}

/// [`RasterSurface`] backed by an in-memory [`RgbaImage`].
#[derive(Debug, Clone, Default)]
pub struct RgbaSurface {
    image: RgbaImage,
}

impl RgbaSurface {
    /// Create a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl RasterSurface for RgbaSurface {
    fn load_into(&mut self, name: &str, bytes: &[u8]) -> SpriteResult<(u32, u32)> {
        let decoded = image::load_from_memory(bytes).map_err(|e| SpriteError::DecodeFailure {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.image = decoded.to_rgba8();
        Ok(self.image.dimensions())
    }

    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn read_rect(&self, rect: TileRect) -> Option<RgbaImage> {
        let (width, height) = self.image.dimensions();
        let right = u64::from(rect.x) + u64::from(rect.width);
        let bottom = u64::from(rect.y) + u64::from(rect.height);
        if right > u64::from(width) || bottom > u64::from(height) {
            return None;
        }
        Some(imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height).to_image())
    }

    fn write_rect(&mut self, pixels: &RgbaImage, x: i64, y: i64, blend: Blend) {
        match blend {
            Blend::Replace => imageops::replace(&mut self.image, pixels, x, y),
            Blend::SourceOver => imageops::overlay(&mut self.image, pixels, x, y),
        }
    }

    fn resize_canvas(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Trait for turning RGBA rasters into file bytes.
///
/// Implementations must be thread-safe (`Send + Sync`) so that tiles can be
/// encoded concurrently.
pub trait ImageEncoder: Send + Sync {
    /// Encode an image. `name` is only used for error reporting.
    fn encode(&self, name: &str, image: &RgbaImage) -> SpriteResult<Vec<u8>>;

    /// File extension without the leading dot.
    fn extension(&self) -> &str;

    /// MIME type of the encoded output.
    fn mime_type(&self) -> &'static str;

    /// Human-readable encoder name.
    fn name(&self) -> &str;
}

/// zlib effort used by [`PngImageEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

impl From<PngCompression> for CompressionType {
    fn from(compression: PngCompression) -> Self {
        match compression {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

/// PNG encoder.
///
/// # Example
///
/// ```
/// use spritegrid::{ImageEncoder, PngImageEncoder};
///
/// let encoder = PngImageEncoder::new();
/// assert_eq!(encoder.extension(), "png");
/// assert_eq!(encoder.mime_type(), "image/png");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PngImageEncoder {
    compression: PngCompression,
}

impl PngImageEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression effort.
    pub fn with_compression(mut self, compression: PngCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn compression(&self) -> PngCompression {
        self.compression
    }
}

impl ImageEncoder for PngImageEncoder {
    fn encode(&self, name: &str, image: &RgbaImage) -> SpriteResult<Vec<u8>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SpriteError::EncodeFailure {
                name: name.to_string(),
                reason: format!("cannot encode a {}×{} image", width, height),
            });
        }

        let mut buffer = Cursor::new(Vec::new());
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, self.compression.into(), FilterType::Adaptive);
        encoder
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| SpriteError::EncodeFailure {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(buffer.into_inner())
    }

    fn extension(&self) -> &str {
        "png"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn name(&self) -> &str {
        "PNG"
    }
}
