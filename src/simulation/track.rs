//! Boundary mask of the race track.
//!
//! The mask is built once from an image and then only read. Sampling truncates
//! coordinates toward zero and clamps them to the mask edge, so any point,
//! including NaN or points far off the image, maps to a real cell.

use image::RgbaImage;
use ndarray::Array2;

use super::errors::TrackError;

/// Immutable grid of boundary (`true`) and free (`false`) cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMask {
    /// Cells indexed `[row, column]`.
    cells: Array2<bool>,
}

impl TrackMask {
    /// Builds a mask by evaluating `is_boundary(x, y)` for every cell.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut is_boundary: impl FnMut(usize, usize) -> bool,
    ) -> Result<Self, TrackError> {
        if width == 0 || height == 0 {
            return Err(TrackError::Empty { width, height });
        }
        let cells = Array2::from_shape_fn((height, width), |(y, x)| is_boundary(x, y));
        Ok(Self { cells })
    }

    /// A track without any boundary cells.
    pub fn open(width: usize, height: usize) -> Result<Self, TrackError> {
        Self::from_fn(width, height, |_, _| false)
    }

    /// Builds a mask from a tightly packed RGBA8 buffer.
    pub fn from_rgba(
        width: usize,
        height: usize,
        pixels: &[u8],
        boundary_color: [u8; 4],
    ) -> Result<Self, TrackError> {
        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(TrackError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Self::from_fn(width, height, |x, y| {
            let start = (y * width + x) * 4;
            pixels[start..start + 4] == boundary_color
        })
    }

    /// Builds a mask from a decoded image.
    pub fn from_image(image: &RgbaImage, boundary_color: [u8; 4]) -> Result<Self, TrackError> {
        Self::from_rgba(
            image.width() as usize,
            image.height() as usize,
            image.as_raw(),
            boundary_color,
        )
    }

    /// Opens and decodes a track image from disk.
    pub fn load(path: &str, boundary_color: [u8; 4]) -> Result<Self, TrackError> {
        let image = image::open(path)?.to_rgba8();
        Self::from_image(&image, boundary_color)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Whether the cell under `(x, y)` is impassable.
    ///
    /// Coordinates are truncated toward zero and then clamped to the mask edge.
    #[inline]
    pub fn is_boundary(&self, x: f32, y: f32) -> bool {
        let column = clamp_index(x, self.width());
        let row = clamp_index(y, self.height());
        self.cells[[row, column]]
    }

    /// Number of boundary cells.
    pub fn boundary_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }
}

/// Truncates toward zero and clamps into `[0, len)`. NaN maps to 0.
#[inline]
fn clamp_index(coordinate: f32, len: usize) -> usize {
    // `as` saturates and sends NaN to 0
    let index = coordinate as i64;
    index.clamp(0, len as i64 - 1) as usize
}
