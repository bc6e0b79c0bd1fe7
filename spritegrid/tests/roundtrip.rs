//! Integration tests for packing and slicing together.
//!
//! These tests verify the complete flow:
//! - sprites → sheet → sprites recovers the input in order
//! - GameMaker placeholder shifts sprites by one slot
//! - encoded outputs survive export to disk and zip bundling
//!
//! Run with: `cargo test --test roundtrip`

use std::fs;
use std::io::{Cursor, Read};

use image::{imageops, Rgba, RgbaImage};

use spritegrid::{
    assemble, disassemble, save_files, Assembler, DirectorySink, Disassembler, LayoutOptions,
    RasterImage, Transformer,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// An opaque sprite with a per-sprite colour and a gradient so that
/// misplaced or flipped pixels are detected.
fn make_sprite(index: usize, width: u32, height: u32) -> RasterImage {
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([index as u8 * 17, x as u8, y as u8, 255])
    });
    RasterImage::new(format!("sprite{index}.png"), pixels)
}

fn make_sprites(count: usize, width: u32, height: u32) -> Vec<RasterImage> {
    (0..count).map(|i| make_sprite(i, width, height)).collect()
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_roundtrip_same_size_sprites() {
    let sprites = make_sprites(8, 32, 32);
    let options = LayoutOptions::default().with_grid(4, 2);

    let sheet = assemble(&sprites, &options).unwrap();
    assert_eq!(sheet.dimensions(), (128, 64));

    let tiles = disassemble(&sheet, &options).unwrap();
    assert_eq!(tiles.len(), sprites.len());
    for (tile, sprite) in tiles.iter().zip(&sprites) {
        assert_eq!(tile.pixels(), sprite.pixels());
    }
}

#[test]
fn test_roundtrip_with_auto_calc() {
    let sprites = make_sprites(12, 16, 24);
    let join = LayoutOptions::default().with_cell_size(16, 24).with_grid(4, 0);
    let sheet = assemble(&sprites, &join).unwrap();

    let split = LayoutOptions::default()
        .with_cell_size(16, 24)
        .with_auto_calc(true);
    let tiles = disassemble(&sheet, &split).unwrap();

    assert_eq!(tiles.len(), 12);
    assert_eq!(tiles[11].name, "23-Sprite Sheet.png");
    for (tile, sprite) in tiles.iter().zip(&sprites) {
        assert_eq!(tile.pixels(), sprite.pixels());
    }
}

#[test]
fn test_roundtrip_recovers_centered_smaller_sprites() {
    let mut sprites = make_sprites(3, 32, 32);
    sprites.push(make_sprite(3, 20, 12));
    let options = LayoutOptions::default();

    let sheet = assemble(&sprites, &options).unwrap();
    let tiles = disassemble(&sheet, &options.with_grid(4, 1)).unwrap();

    let small = &tiles[3];
    assert_eq!(small.dimensions(), (32, 32));
    // floor(16 - 10) = 6, floor(16 - 6) = 10
    let inner = imageops::crop_imm(small.pixels(), 6, 10, 20, 12).to_image();
    assert_eq!(&inner, sprites[3].pixels());
    assert_eq!(small.pixels().get_pixel(5, 10).0[3], 0);
}

#[test]
fn test_gms_placeholder_roundtrip_is_shifted() {
    let sprites = make_sprites(3, 32, 32);
    let options = LayoutOptions::default().with_gms_compatible(true);

    let sheet = assemble(&sprites, &options).unwrap();
    let tiles = disassemble(&sheet, &options.with_grid(4, 1)).unwrap();

    assert_eq!(tiles.len(), 4);
    assert!(tiles[0].pixels().pixels().all(|p| p.0[3] == 0));
    for (tile, sprite) in tiles[1..].iter().zip(&sprites) {
        assert_eq!(tile.pixels(), sprite.pixels());
    }
}

#[test]
fn test_encoded_roundtrip_through_png() {
    let sprites = make_sprites(6, 24, 24);
    let options = LayoutOptions::default().with_cell_size(24, 24).with_grid(3, 2);

    let sheet_file = Assembler::new().run(&sprites, &options).unwrap();
    let sheet = RasterImage::decode(&sheet_file.name, &sheet_file.bytes).unwrap();

    let tile_files = Disassembler::new().run(&sheet, &options).unwrap();
    assert_eq!(tile_files.len(), 6);
    for (file, sprite) in tile_files.iter().zip(&sprites) {
        let tile = RasterImage::decode(&file.name, &file.bytes).unwrap();
        assert_eq!(tile.pixels(), sprite.pixels());
    }
}

#[test]
fn test_split_and_export_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = assemble(&make_sprites(4, 32, 32), &LayoutOptions::default()).unwrap();

    let split = LayoutOptions::default().with_grid(4, 1);
    let outputs = Transformer::default().transform(&[sheet], &split).unwrap();

    let mut sink = DirectorySink::new(dir.path());
    let report = save_files(&mut sink, outputs, false).unwrap();

    assert_eq!(report.len(), 4);
    for name in ["00", "01", "02", "03"] {
        let path = dir.path().join(format!("{name}-Sprite Sheet.png"));
        let tile = RasterImage::open(&path).unwrap();
        assert_eq!(tile.dimensions(), (32, 32));
    }
}

#[test]
fn test_split_and_export_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = assemble(&make_sprites(4, 32, 32), &LayoutOptions::default()).unwrap();

    let options = LayoutOptions::default().with_grid(2, 2).with_bundle_files(true);
    let outputs = Transformer::default().transform(&[sheet], &options).unwrap();

    let mut sink = DirectorySink::new(dir.path());
    let report = save_files(&mut sink, outputs, options.bundle_files).unwrap();
    assert_eq!(report.locations, [dir.path().join("Sprites.zip")]);

    let bytes = fs::read(dir.path().join("Sprites.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut tile_bytes = Vec::new();
    archive
        .by_name("Sprites/11-Sprite Sheet.png")
        .unwrap()
        .read_to_end(&mut tile_bytes)
        .unwrap();

    let tile = RasterImage::decode("11-Sprite Sheet.png", &tile_bytes).unwrap();
    assert_eq!(tile.dimensions(), (64, 16));
}
