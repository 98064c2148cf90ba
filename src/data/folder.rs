// ============================================================
// Layer 4: Image Folder Loader
// ============================================================
// Loads every .png file in a single directory (not recursive),
// in file name order.
//
// The png crate decodes whatever colour type the file has;
// we ask it to EXPAND palettes / low bit depths to 8 bits and
// STRIP_16 to drop 16-bit samples to 8, then convert the
// interleaved result into a planar RGB RawImage.

use anyhow::{bail, Context, Result};
use std::{fs::{self, File}, io::BufReader, path::{Path, PathBuf}};

use crate::domain::image::RawImage;
use crate::domain::traits::ImageSource;

/// Loads a directory of PNG images.
pub struct ImageFolderLoader {
    dir: PathBuf,
}

impl ImageFolderLoader {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// All `.png` files in the directory, sorted by name
    fn png_paths(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read image directory '{}'", self.dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("png"))
                .unwrap_or(false);
            if path.is_file() && is_png {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl ImageSource for ImageFolderLoader {
    fn load_all(&self) -> Result<Vec<RawImage>> {
        let paths = self.png_paths()?;
        if paths.is_empty() {
            bail!("No .png files found in '{}'", self.dir.display());
        }

        paths
            .iter()
            .map(|p| decode_png(p).with_context(|| format!("Cannot decode '{}'", p.display())))
            .collect()
    }

    fn describe(&self) -> String {
        format!("image folder ({})", self.dir.display())
    }
}

/// Decode one PNG file into a planar RGB image.
pub fn decode_png(path: &Path) -> Result<RawImage> {
    let file = File::open(path)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder.read_info()?;
    let mut buf    = vec![0u8; reader.output_buffer_size()];
    let info       = reader.next_frame(&mut buf)?;

    let (color, _depth) = reader.output_color_type();
    let samples = color.samples();

    RawImage::from_interleaved(
        info.width as usize,
        info.height as usize,
        &buf[..info.buffer_size()],
        samples,
    )
}
