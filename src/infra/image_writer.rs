// ============================================================
// Layer 6: Sample Image Writer
// ============================================================
// Saves a batch of generated images as one PNG grid, laid out
// like torchvision's make_grid + save_image(normalize=True):
//
//   ┌──────────────────────────────┐
//   │ pad                          │
//   │ [img0] pad [img1] ... [img7] │   8 images per row
//   │ pad                          │   2 px black padding
//   │ [img8] ...                   │
//   └──────────────────────────────┘
//
//   grid width  = cols * (W + pad) + pad
//   grid height = rows * (H + pad) + pad
//
// The whole batch is min-max normalised into [0, 1] first,
// then quantised with floor(v * 255 + 0.5).
//
// This layer takes plain f32 buffers, not Burn tensors; the
// ML layer converts tensors to Vec<f32> before calling in.

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

/// Images per grid row
pub const GRID_COLUMNS: usize = 8;

/// Pixels of padding between and around tiles
pub const GRID_PADDING: usize = 2;

/// Smallest divisor used when normalising a (near) constant batch
const MIN_RANGE: f32 = 1e-5;

/// Writes sample grids into an output directory.
pub struct ImageWriter {
    dir: PathBuf,
}

impl ImageWriter {
    /// Create the writer and its output directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Path of the sample grid written after `epoch`
    pub fn epoch_path(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("fake_samples_epoch_{epoch:03}.png"))
    }

    /// Save the grid for one epoch. Returns the written path.
    pub fn save_epoch(&self, epoch: usize, values: &[f32], dims: [usize; 4]) -> Result<PathBuf> {
        let path = self.epoch_path(epoch);
        save_image(values, dims, &path)?;
        Ok(path)
    }
}

/// Normalise, tile and write a batch of images [N, 3, H, W] as PNG.
pub fn save_image(values: &[f32], dims: [usize; 4], path: &Path) -> Result<()> {
    let [n, c, h, w] = dims;
    if c != 3 {
        bail!("Expected 3 colour channels, got {c}");
    }
    if values.len() != n * c * h * w {
        bail!("Image buffer has {} values, expected {:?}", values.len(), dims);
    }
    if n == 0 {
        bail!("Cannot save an empty image batch");
    }

    let mut values = values.to_vec();
    normalize_min_max(&mut values);

    let grid = make_grid(&values, dims, GRID_COLUMNS, GRID_PADDING);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }
    write_rgb_png(grid.width as u32, grid.height as u32, &grid.rgb, path)
}

/// Shift and scale the whole buffer into [0, 1].
pub fn normalize_min_max(values: &mut [f32]) {
    let low  = values.iter().cloned().fold(f32::INFINITY, f32::min);
    let high = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let range = (high - low).max(MIN_RANGE);

    for v in values.iter_mut() {
        *v = (v.clamp(low, high) - low) / range;
    }
}

/// An interleaved 8-bit RGB image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub width:  usize,
    pub height: usize,
    pub rgb:    Vec<u8>,
}

/// Tile planar images [N, 3, H, W] (values in [0, 1]) into one
/// interleaved RGB grid. A single image is returned without padding.
pub fn make_grid(values: &[f32], dims: [usize; 4], columns: usize, padding: usize) -> Grid {
    let [n, c, h, w] = dims;
    let padding = if n == 1 { 0 } else { padding };

    let cols   = columns.min(n).max(1);
    let rows   = n.div_ceil(cols);
    let cell_w = w + padding;
    let cell_h = h + padding;
    let width  = cols * cell_w + padding;
    let height = rows * cell_h + padding;

    let mut rgb = vec![0u8; width * height * 3];
    for k in 0..n {
        let (row, col) = (k / cols, k % cols);
        let top  = row * cell_h + padding;
        let left = col * cell_w + padding;

        for ch in 0..c {
            let plane = &values[(k * c + ch) * h * w..(k * c + ch + 1) * h * w];
            for y in 0..h {
                for x in 0..w {
                    let out = ((top + y) * width + left + x) * 3 + ch;
                    rgb[out] = quantize(plane[y * w + x]);
                }
            }
        }
    }

    Grid { width, height, rgb }
}

fn quantize(v: f32) -> u8 {
    (v * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}

fn write_rgb_png(width: u32, height: u32, data: &[u8], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create image '{}'", path.display()))?;
    let w = BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    tracing::debug!("Wrote {}x{} image to '{}'", width, height, path.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_maps_to_unit_range() {
        let mut v = vec![-2.0, 0.0, 2.0];
        normalize_min_max(&mut v);
        assert_eq!(v, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_constant_batch_is_zero() {
        let mut v = vec![0.3; 4];
        normalize_min_max(&mut v);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_grid_dimensions_match_make_grid() {
        // 64 images of 64x64 → 8x8 grid with 2px padding
        let dims = [64, 3, 64, 64];
        let grid = make_grid(&vec![0.5; 64 * 3 * 64 * 64], dims, 8, 2);
        assert_eq!((grid.width, grid.height), (530, 530));

        // 10 images → 8 columns, 2 rows
        let grid = make_grid(&vec![0.0; 10 * 3 * 4 * 4], [10, 3, 4, 4], 8, 2);
        assert_eq!((grid.width, grid.height), (8 * 6 + 2, 2 * 6 + 2));
    }

    #[test]
    fn test_tile_placement_and_padding() {
        // Two 1x1 images: red and blue
        let values = vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let grid   = make_grid(&values, [2, 3, 1, 1], 8, 1);
        // width = 2 * 2 + 1 = 5, height = 3
        assert_eq!((grid.width, grid.height), (5, 3));

        let px = |x: usize, y: usize| &grid.rgb[(y * grid.width + x) * 3..][..3];
        assert_eq!(px(0, 0), &[0, 0, 0]);
        assert_eq!(px(1, 1), &[255, 0, 0]);
        assert_eq!(px(3, 1), &[0, 0, 255]);
    }

    #[test]
    fn test_single_image_has_no_padding() {
        let grid = make_grid(&vec![1.0; 3 * 2 * 2], [1, 3, 2, 2], 8, 2);
        assert_eq!((grid.width, grid.height), (2, 2));
        assert!(grid.rgb.iter().all(|&b| b == 255));
    }

    #[test]
    fn test_save_epoch_writes_png() {
        let dir    = tempfile::tempdir().unwrap();
        let writer = ImageWriter::new(dir.path().join("out")).unwrap();

        let values = (0..2 * 3 * 4 * 4).map(|i| i as f32).collect::<Vec<_>>();
        let path   = writer.save_epoch(3, &values, [2, 3, 4, 4]).unwrap();
        assert!(path.ends_with("fake_samples_epoch_003.png"));

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader  = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 2 * 6 + 2);
        assert_eq!(reader.info().height, 6 + 2);
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_image(&[0.0; 5], [1, 3, 2, 2], &dir.path().join("x.png")).is_err());
    }

    #[test]
    fn test_unwritable_parent_is_reported() {
        let dir     = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let err = save_image(&[0.0; 12], [1, 3, 2, 2], &blocker.join("x.png")).unwrap_err();
        assert!(format!("{err:#}").contains("Cannot create directory"));
    }
}
