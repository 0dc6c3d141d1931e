//! Flat boolean grids congruent to an image.
//!
//! Both the near-white mask and the erase mask use this type. Cells are
//! stored row-major and addressed by `y * width + x`.

use crate::{Result, StickerError};

/// A boolean grid with the same dimensions as the image it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Mask {
    /// Wrap existing row-major cells.
    ///
    /// Fails with [`StickerError::Shape`] when the dimensions are zero or
    /// the cell count does not match them.
    pub fn new(width: u32, height: u32, cells: Vec<bool>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StickerError::Shape(format!(
                "mask dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(StickerError::Shape(format!(
                "mask of {}x{} needs {} cells, got {}",
                width,
                height,
                expected,
                cells.len()
            )));
        }
        Ok(Self { width, height, cells })
    }

    /// Build from cells already known to match the dimensions.
    pub(crate) fn from_parts(width: u32, height: u32, cells: Vec<bool>) -> Self {
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        Self { width, height, cells }
    }

    /// A mask with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: bool) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }

    /// Mask width in cells.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in cells.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat index of `(x, y)`.
    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Value at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[self.index_of(x, y)]
    }

    /// Set the value at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let idx = self.index_of(x, y);
        self.cells[idx] = value;
    }

    /// Row-major view of the cells.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    /// Number of true cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Whether any cell is true.
    pub fn any(&self) -> bool {
        self.cells.iter().any(|&c| c)
    }

    /// True when every true cell of `self` is also true in `other`.
    pub fn is_subset_of(&self, other: &Mask) -> bool {
        self.width == other.width
            && self.height == other.height
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(&a, &b)| !a || b)
    }

    /// Cells true in `self` but false in `other`.
    pub(crate) fn count_and_not(&self, other: &Mask) -> usize {
        self.cells
            .iter()
            .zip(&other.cells)
            .filter(|&(&a, &b)| a && !b)
            .count()
    }
}
