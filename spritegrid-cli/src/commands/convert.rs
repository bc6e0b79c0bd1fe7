//! `convert`, `split` and `join` commands.

use std::path::{Path, PathBuf};

use clap::Args;
use spritegrid::config::ConfigFile;
use spritegrid::{save_files, Direction, RasterImage, SpriteError, Transformer};
use tracing::{info, warn};

use super::common::LayoutArgs;
use crate::error::CliError;

/// Arguments for `convert`: one file is split, several are joined.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Image files to convert
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Arguments for `split`.
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Spritesheets to split
    #[arg(required = true, value_name = "SHEETS")]
    pub sheets: Vec<PathBuf>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Arguments for `join`.
#[derive(Debug, Args)]
pub struct JoinArgs {
    /// Sprites to join, in sheet order
    #[arg(required = true, value_name = "SPRITES")]
    pub sprites: Vec<PathBuf>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Run `convert`.
pub fn run_convert(args: ConvertArgs) -> Result<(), CliError> {
    run(&args.files, &args.layout, None)
}

/// Run `split`.
pub fn run_split(args: SplitArgs) -> Result<(), CliError> {
    run(&args.sheets, &args.layout, Some(Direction::Split))
}

/// Run `join`.
pub fn run_join(args: JoinArgs) -> Result<(), CliError> {
    run(&args.sprites, &args.layout, Some(Direction::Join))
}

fn run(files: &[PathBuf], layout: &LayoutArgs, forced: Option<Direction>) -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {}", e);
        ConfigFile::default()
    });
    let options = layout.resolve_layout(&config);

    let images = read_images(files)?;
    let direction = match forced.or_else(|| Direction::for_input_count(images.len())) {
        Some(direction) => direction,
        None => return Err(CliError::NoImages(files.len())),
    };
    info!(%direction, inputs = images.len(), "Converting");

    let outputs = Transformer::default().transform_as(direction, &images, &options)?;

    let mut sink = layout.resolve_sink(&config);
    let report = save_files(sink.as_mut(), outputs, options.bundle_files)?;
    for location in &report.locations {
        println!("{}", location.display());
    }
    Ok(())
}

/// Read every path that decodes as an image, skipping the rest.
///
/// Unreadable files are errors; readable files that are not images are
/// skipped with a warning.
pub fn read_images(paths: &[PathBuf]) -> Result<Vec<RasterImage>, CliError> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match read_image(path) {
            Ok(image) => images.push(image),
            Err(SpriteError::DecodeFailure { name, reason }) => {
                warn!(file = %name, "Skipping non-image file: {}", reason);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if images.is_empty() {
        return Err(CliError::NoImages(paths.len()));
    }
    Ok(images)
}

fn read_image(path: &Path) -> Result<RasterImage, SpriteError> {
    let image = RasterImage::open(path)?;
    info!(
        file = %image.name,
        width = image.width(),
        height = image.height(),
        "Loaded image"
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spritegrid::{EncodedImage, PngImageEncoder};
    use std::fs;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let image = RasterImage::blank(name, width, height);
        let encoded = EncodedImage::encode(&image, &PngImageEncoder::new()).unwrap();
        let path = dir.join(name);
        fs::write(&path, encoded.bytes).unwrap();
        path
    }

    #[test]
    fn test_read_images_skips_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_png(dir.path(), "a.png", 4, 4);
        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "hello").unwrap();

        let images = read_images(&[png, txt]).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "a.png");
    }

    #[test]
    fn test_read_images_all_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "hello").unwrap();

        let result = read_images(&[txt]);
        assert!(matches!(result, Err(CliError::NoImages(1))));
    }

    #[test]
    fn test_read_images_missing_file_is_error() {
        let result = read_images(&[PathBuf::from("/no/such/file.png")]);
        assert!(matches!(result, Err(CliError::Sprite(SpriteError::Io { .. }))));
    }
}
