//! Binary morphology on masks with a 3x3 square structuring element.
//!
//! Cells outside the grid never influence the result: dilation ignores them
//! and erosion treats them as set, so a full mask stays full after erosion.
//! Compiled only with the `morphology` feature.

use crate::mask::Mask;

/// A cell becomes true when any in-bounds neighbor (itself included) is true.
pub fn dilate(mask: &Mask) -> Mask {
    sweep(mask, |acc, cell| acc || cell, false)
}

/// A cell stays true only when every in-bounds neighbor is true.
pub fn erode(mask: &Mask) -> Mask {
    sweep(mask, |acc, cell| acc && cell, true)
}

/// Dilate then erode: fills pinholes and narrow gaps.
pub fn close(mask: &Mask) -> Mask {
    erode(&dilate(mask))
}

/// Erode then dilate: drops isolated specks.
pub fn open(mask: &Mask) -> Mask {
    dilate(&erode(mask))
}

/// Closing followed by opening, the cleanup used by the morphological mode.
pub fn clean(mask: &Mask) -> Mask {
    open(&close(mask))
}

fn sweep(mask: &Mask, combine: impl Fn(bool, bool) -> bool, identity: bool) -> Mask {
    let (w, h) = (mask.width(), mask.height());
    let cells = mask.as_slice();
    let mut out = Vec::with_capacity(cells.len());

    for y in 0..h {
        let rows = y.saturating_sub(1)..=(y + 1).min(h - 1);
        for x in 0..w {
            let cols = x.saturating_sub(1)..=(x + 1).min(w - 1);
            let mut acc = identity;
            for ny in rows.clone() {
                for nx in cols.clone() {
                    acc = combine(acc, cells[mask.index_of(nx, ny)]);
                }
            }
            out.push(acc);
        }
    }

    Mask::from_parts(w, h, out)
}
