//! Grid layout math shared by slicing and packing.
//!
//! Both directions address tiles in row-major order: linear index `k` maps to
//! row `k / columns` and column `k % columns`. Slicing a packed sheet with
//! the same column count therefore yields the sprites in their input order
//! (shifted by one when the GameMaker placeholder is in use).
//!
//! ```text
//!  x_offset
//!  ├──┤
//!  ┌──┬──────┬─┬──────┬─┬──────┬─┐ ┬ y_offset
//!  │  ┌──────┐ ┌──────┐ ┌──────┐ │ ┴
//!  │  │ 0,0  │ │ 0,1  │ │ 0,2  │ │
//!  │  └──────┘ └──────┘ └──────┘ │ ┬ y_padding
//!  │  ┌──────┐ ┌──────┐ ┌──────┐ │ ┴
//!  │  │ 1,0  │ │ 1,1  │ │ 1,2  │ │
//!  │  └──────┘ └──────┘ └──────┘ │
//!  └─────────────────────────────┘
//!               ├┤ x_padding
//! ```

use std::fmt;

use tracing::debug;

use crate::error::{SpriteError, SpriteResult};

/// Default cell width in pixels.
pub const DEFAULT_CELL_WIDTH: u32 = 32;

/// Default cell height in pixels.
pub const DEFAULT_CELL_HEIGHT: u32 = 32;

/// Default number of grid columns.
pub const DEFAULT_COLUMNS: u32 = 4;

/// Default number of grid rows (slicing only; packing always derives rows).
pub const DEFAULT_ROWS: u32 = 4;

/// Grid layout options for both slicing and packing.
///
/// The [`Default`] instance matches the settings persisted by earlier
/// releases: a 4×4 grid of 32×32 cells with no offset or padding.
///
/// # Example
///
/// ```
/// use spritegrid::LayoutOptions;
///
/// let options = LayoutOptions::default()
///     .with_cell_size(16, 24)
///     .with_padding(2, 2)
///     .with_grid(8, 2);
///
/// assert_eq!(options.width, 16);
/// assert_eq!(options.columns, 8);
/// assert!(!options.gms_compatible);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Horizontal position of the grid origin within the canvas.
    pub x_offset: u32,
    /// Vertical position of the grid origin within the canvas.
    pub y_offset: u32,
    /// Horizontal gap between cells.
    pub x_padding: u32,
    /// Vertical gap between cells.
    pub y_padding: u32,
    /// Cell width. A minimum when packing; derived from the sheet when slicing.
    pub width: u32,
    /// Cell height. A minimum when packing; derived from the sheet when slicing.
    pub height: u32,
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows. Ignored when packing.
    pub rows: u32,
    /// Derive columns/rows from the sheet size and the declared cell size.
    pub auto_calc_spritesheet: bool,
    /// Reserve tile 0 as a blank placeholder (GameMaker Studio sprite strips).
    pub gms_compatible: bool,
    /// Hint for exporters to zip multiple outputs into one archive.
    pub bundle_files: bool,
    /// Let packing produce an empty canvas, sized by `width`/`height`, when
    /// no sprites are given.
    pub allow_empty: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            x_offset: 0,
            y_offset: 0,
            x_padding: 0,
            y_padding: 0,
            width: DEFAULT_CELL_WIDTH,
            height: DEFAULT_CELL_HEIGHT,
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            auto_calc_spritesheet: false,
            gms_compatible: false,
            bundle_files: false,
            allow_empty: false,
        }
    }
}

impl LayoutOptions {
    /// Set the grid origin.
    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.x_offset = x;
        self.y_offset = y;
        self
    }

    /// Set the gap between cells.
    pub fn with_padding(mut self, x: u32, y: u32) -> Self {
        self.x_padding = x;
        self.y_padding = y;
        self
    }

    /// Set the cell size.
    pub fn with_cell_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the column and row counts.
    pub fn with_grid(mut self, columns: u32, rows: u32) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    /// Enable or disable grid auto-calculation when slicing.
    pub fn with_auto_calc(mut self, enabled: bool) -> Self {
        self.auto_calc_spritesheet = enabled;
        self
    }

    /// Enable or disable the leading placeholder tile when packing.
    pub fn with_gms_compatible(mut self, enabled: bool) -> Self {
        self.gms_compatible = enabled;
        self
    }

    /// Enable or disable archive bundling of multiple outputs.
    pub fn with_bundle_files(mut self, enabled: bool) -> Self {
        self.bundle_files = enabled;
        self
    }

    /// Allow packing an empty sprite list into a blank canvas.
    pub fn with_allow_empty(mut self, enabled: bool) -> Self {
        self.allow_empty = enabled;
        self
    }

    /// Check the invariants every layout needs before tiling starts.
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::InvalidLayout`] if the cell size or the column
    /// count is zero.
    pub fn validate(&self) -> SpriteResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SpriteError::invalid_layout(format!(
                "cell size must be non-zero, got {}×{}",
                self.width, self.height
            )));
        }
        if self.columns == 0 {
            return Err(SpriteError::invalid_layout(
                "columns must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Position of a tile in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    /// Row, counted from the top.
    pub row: u32,
    /// Column, counted from the left.
    pub column: u32,
}

impl TileIndex {
    /// Create a tile index.
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Map a row-major linear index to a tile position.
    ///
    /// # Example
    ///
    /// ```
    /// use spritegrid::TileIndex;
    ///
    /// assert_eq!(TileIndex::from_linear(5, 3), TileIndex::new(1, 2));
    /// ```
    pub fn from_linear(index: usize, columns: u32) -> Self {
        let columns = columns as usize;
        Self {
            row: (index / columns) as u32,
            column: (index % columns) as u32,
        }
    }

    /// Row-major linear index of this tile.
    pub fn linear(&self, columns: u32) -> usize {
        self.row as usize * columns as usize + self.column as usize
    }

    /// Prefix used for sliced tile names: row digits followed by column digits.
    pub fn name_prefix(&self) -> String {
        format!("{}{}", self.row, self.column)
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Pixel rectangle of a tile inside a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Byte length of an RGBA8 buffer of `width`×`height`, if it fits in memory.
fn rgba_buffer_len(width: u32, height: u32) -> Option<usize> {
    u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|pixels| pixels.checked_mul(4))
        .and_then(|len| usize::try_from(len).ok())
        .filter(|&len| len <= isize::MAX as usize)
}

/// Number of rows needed to pack `count` tiles into `columns` columns.
///
/// A partial last row counts as a full row, and fewer tiles than columns
/// (including none) still occupy one row.
pub fn derive_rows(count: usize, columns: u32) -> u32 {
    let columns = columns.max(1) as usize;
    if count < columns {
        1
    } else {
        count.div_ceil(columns) as u32
    }
}

/// Offset that centers a sprite of `sprite` pixels inside a cell of `cell`
/// pixels, i.e. `floor(cell / 2 - sprite / 2)`.
///
/// Negative when the sprite is larger than the cell.
pub fn center_offset(cell: u32, sprite: u32) -> i64 {
    (i64::from(cell) - i64::from(sprite)).div_euclid(2)
}

/// Resolved geometry for slicing one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGrid {
    pub sheet_width: u32,
    pub sheet_height: u32,
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
    pub x_padding: u32,
    pub y_padding: u32,
}

impl SheetGrid {
    /// Resolve the slicing grid for a sheet of the given size.
    ///
    /// With `auto_calc_spritesheet`, columns and rows are the number of whole
    /// `width + x_padding` (`height + y_padding`) strides that fit the sheet.
    /// In both modes the effective cell size is then the sheet size divided
    /// by the column/row count, rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::InvalidLayout`] if the sheet is empty, the
    /// options are invalid, or the grid resolves to zero columns, rows or
    /// cell pixels.
    pub fn resolve(sheet_width: u32, sheet_height: u32, options: &LayoutOptions) -> SpriteResult<Self> {
        if sheet_width == 0 || sheet_height == 0 {
            return Err(SpriteError::invalid_layout(format!(
                "sheet has zero dimensions ({}×{})",
                sheet_width, sheet_height
            )));
        }
        options.validate()?;

        let (columns, rows) = if options.auto_calc_spritesheet {
            let stride_x = u64::from(options.width) + u64::from(options.x_padding);
            let stride_y = u64::from(options.height) + u64::from(options.y_padding);
            (
                (u64::from(sheet_width) / stride_x) as u32,
                (u64::from(sheet_height) / stride_y) as u32,
            )
        } else {
            (options.columns, options.rows)
        };

        if columns == 0 || rows == 0 {
            return Err(SpriteError::invalid_layout(format!(
                "grid resolves to {} columns × {} rows for a {}×{} sheet",
                columns, rows, sheet_width, sheet_height
            )));
        }

        let cell_width = sheet_width / columns;
        let cell_height = sheet_height / rows;
        if cell_width == 0 || cell_height == 0 {
            return Err(SpriteError::invalid_layout(format!(
                "{}×{} grid leaves no pixels per cell on a {}×{} sheet",
                columns, rows, sheet_width, sheet_height
            )));
        }

        let grid = Self {
            sheet_width,
            sheet_height,
            columns,
            rows,
            cell_width,
            cell_height,
            x_offset: options.x_offset,
            y_offset: options.y_offset,
            x_padding: options.x_padding,
            y_padding: options.y_padding,
        };
        debug!(
            columns,
            rows,
            cell_width,
            cell_height,
            "Resolved sheet grid for {}×{} sheet",
            sheet_width,
            sheet_height
        );
        Ok(grid)
    }

    /// Total number of tiles in the grid.
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// All tile positions in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileIndex> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |column| TileIndex::new(row, column)))
    }

    /// Pixel rectangle of a tile, checked against the sheet bounds.
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::OutOfBounds`] if any part of the rectangle lies
    /// outside the sheet. Tiles are never clipped.
    pub fn rect(&self, tile: TileIndex) -> SpriteResult<TileRect> {
        let x = u64::from(self.x_offset)
            + u64::from(tile.column) * (u64::from(self.cell_width) + u64::from(self.x_padding));
        let y = u64::from(self.y_offset)
            + u64::from(tile.row) * (u64::from(self.cell_height) + u64::from(self.y_padding));

        let fits_x = x + u64::from(self.cell_width) <= u64::from(self.sheet_width);
        let fits_y = y + u64::from(self.cell_height) <= u64::from(self.sheet_height);
        if !(fits_x && fits_y) {
            return Err(SpriteError::OutOfBounds {
                tile,
                x: x.min(u64::from(u32::MAX)) as u32,
                y: y.min(u64::from(u32::MAX)) as u32,
                width: self.cell_width,
                height: self.cell_height,
                sheet_width: self.sheet_width,
                sheet_height: self.sheet_height,
            });
        }

        Ok(TileRect {
            x: x as u32,
            y: y as u32,
            width: self.cell_width,
            height: self.cell_height,
        })
    }
}

/// Resolved geometry for packing sprites into one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasGrid {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
    pub x_padding: u32,
    pub y_padding: u32,
    /// Number of occupied slots, including the placeholder.
    pub slot_count: usize,
    /// Whether slot 0 is the blank placeholder.
    pub has_placeholder: bool,
}

impl CanvasGrid {
    /// Resolve the packing grid for sprites of the given sizes.
    ///
    /// The cell grows to fit the largest sprite in each dimension and never
    /// shrinks below `options.width`/`options.height`. Rows are always derived
    /// from the slot count; `options.rows` is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::InvalidLayout`] for invalid options, for an
    /// empty sprite list unless `allow_empty` is set, or when the canvas size
    /// overflows.
    pub fn resolve<I>(sprite_sizes: I, options: &LayoutOptions) -> SpriteResult<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        options.validate()?;

        let mut sprite_count = 0usize;
        let (cell_width, cell_height) = sprite_sizes.into_iter().fold(
            (options.width, options.height),
            |(w, h), (sprite_w, sprite_h)| {
                sprite_count += 1;
                (w.max(sprite_w), h.max(sprite_h))
            },
        );

        if sprite_count == 0 && !options.allow_empty {
            return Err(SpriteError::invalid_layout(
                "no sprites to pack and no explicit canvas size",
            ));
        }

        let slot_count = sprite_count + usize::from(options.gms_compatible);
        let grid = Self {
            columns: options.columns,
            rows: derive_rows(slot_count, options.columns),
            cell_width,
            cell_height,
            x_offset: options.x_offset,
            y_offset: options.y_offset,
            x_padding: options.x_padding,
            y_padding: options.y_padding,
            slot_count,
            has_placeholder: options.gms_compatible,
        };

        // Reject sizes the raster backend cannot allocate.
        grid.canvas_size()?;

        debug!(
            columns = grid.columns,
            rows = grid.rows,
            cell_width,
            cell_height,
            slots = slot_count,
            "Resolved canvas grid"
        );
        Ok(grid)
    }

    /// Canvas size: `offset + (cell + padding) * count` in each dimension.
    ///
    /// # Errors
    ///
    /// Returns [`SpriteError::InvalidLayout`] if either dimension overflows `u32`
    /// or the RGBA buffer length overflows `usize`.
    pub fn canvas_size(&self) -> SpriteResult<(u32, u32)> {
        let extent = |offset: u32, cell: u32, padding: u32, count: u32| {
            cell.checked_add(padding)
                .and_then(|stride| stride.checked_mul(count))
                .and_then(|span| span.checked_add(offset))
        };

        let width = extent(self.x_offset, self.cell_width, self.x_padding, self.columns);
        let height = extent(self.y_offset, self.cell_height, self.y_padding, self.rows);
        match (width, height) {
            (Some(w), Some(h)) if rgba_buffer_len(w, h).is_some() => Ok((w, h)),
            _ => Err(SpriteError::invalid_layout(format!(
                "canvas for {} columns × {} rows of {}×{} cells is too large",
                self.columns, self.rows, self.cell_width, self.cell_height
            ))),
        }
    }

    /// Top-left corner of the cell at linear slot `index`.
    pub fn cell_origin(&self, index: usize) -> (i64, i64) {
        let tile = TileIndex::from_linear(index, self.columns);
        let x = i64::from(self.x_offset)
            + i64::from(tile.column) * (i64::from(self.cell_width) + i64::from(self.x_padding));
        let y = i64::from(self.y_offset)
            + i64::from(tile.row) * (i64::from(self.cell_height) + i64::from(self.y_padding));
        (x, y)
    }

    /// Where to draw a sprite of the given size so it is centered in slot `index`.
    pub fn draw_position(&self, index: usize, sprite_width: u32, sprite_height: u32) -> (i64, i64) {
        let (x, y) = self.cell_origin(index);
        (
            x + center_offset(self.cell_width, sprite_width),
            y + center_offset(self.cell_height, sprite_height),
        )
    }

    /// Slot index of the `n`th input sprite, after the placeholder if any.
    pub fn slot_of_sprite(&self, n: usize) -> usize {
        n + usize::from(self.has_placeholder)
    }
}
