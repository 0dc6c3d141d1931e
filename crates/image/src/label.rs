//! Connected component labeling of near-white masks.
//!
//! Two raster passes over the mask with a union-find forest: the first pass
//! hands out provisional labels and records equivalences between them, the
//! second resolves every provisional label to its root and renumbers roots
//! to consecutive region ids in first-appearance order. Near-linear in the
//! number of cells.
//!
//! The labeler sits behind the `labeling` feature. Without it, [`label`]
//! reports [`StickerError::LabelingUnavailable`] and callers degrade to the
//! margin-growth strategy in [`crate::background`].

use crate::mask::Mask;
use crate::{Result, StickerError};
use serde::{Deserialize, Serialize};

/// Neighborhood used to decide whether two cells touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Edge neighbors only
    Four,
    /// Edge and corner neighbors
    #[default]
    Eight,
}

impl Connectivity {
    /// Neighbors already visited by a raster scan, as `(dx, dy)` offsets.
    #[cfg_attr(not(feature = "labeling"), allow(dead_code))]
    fn backward_neighbors(self) -> &'static [(i64, i64)] {
        match self {
            Connectivity::Four => &[(-1, 0), (0, -1)],
            Connectivity::Eight => &[(-1, 0), (-1, -1), (0, -1), (1, -1)],
        }
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Connectivity::Four => write!(f, "four"),
            Connectivity::Eight => write!(f, "eight"),
        }
    }
}

/// Region ids for every cell of a mask; 0 marks cells outside any region.
#[derive(Debug, Clone)]
pub struct LabelGrid {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    region_count: u32,
}

impl LabelGrid {
    /// Grid width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Region id at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Row-major region ids.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Number of distinct regions; ids run from 1 to this value.
    pub fn region_count(&self) -> u32 {
        self.region_count
    }

    /// Regions owning at least one cell on the outermost rows or columns.
    pub fn border_regions(&self) -> BorderRegions {
        let mut members = vec![false; self.region_count as usize + 1];
        let (w, h) = (self.width, self.height);

        for x in 0..w {
            members[self.get(x, 0) as usize] = true;
            members[self.get(x, h - 1) as usize] = true;
        }
        for y in 0..h {
            members[self.get(0, y) as usize] = true;
            members[self.get(w - 1, y) as usize] = true;
        }
        // background is never a region
        members[0] = false;

        BorderRegions { members }
    }
}

/// Set of region ids touching the image border, indexed by region id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderRegions {
    members: Vec<bool>,
}

impl BorderRegions {
    /// Whether `label` is a border-touching region.
    #[inline]
    pub fn contains(&self, label: u32) -> bool {
        self.members.get(label as usize).copied().unwrap_or(false)
    }

    /// Number of border-touching regions.
    pub fn len(&self) -> usize {
        self.members.iter().filter(|&&m| m).count()
    }

    /// True when no region touches the border.
    pub fn is_empty(&self) -> bool {
        !self.members.iter().any(|&m| m)
    }

    /// Border region ids in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = u32> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m)
            .map(|(id, _)| id as u32)
    }
}

/// Whether this build can label connected components.
pub fn is_available() -> bool {
    cfg!(feature = "labeling")
}

/// Partition the true cells of `mask` into connected regions.
#[cfg(feature = "labeling")]
pub fn label(mask: &Mask, connectivity: Connectivity) -> Result<LabelGrid> {
    let (w, h) = (mask.width(), mask.height());
    let cells = mask.as_slice();
    let mut labels = vec![0u32; cells.len()];
    let mut forest = DisjointSet::new();

    for y in 0..h {
        for x in 0..w {
            let idx = mask.index_of(x, y);
            if !cells[idx] {
                continue;
            }

            let mut current = 0;
            for &(dx, dy) in connectivity.backward_neighbors() {
                let (nx, ny) = (i64::from(x) + dx, i64::from(y) + dy);
                if nx < 0 || ny < 0 || nx >= i64::from(w) {
                    continue;
                }
                let neighbor = labels[ny as usize * w as usize + nx as usize];
                if neighbor == 0 {
                    continue;
                }
                current = if current == 0 {
                    neighbor
                } else {
                    forest.union(current, neighbor)
                };
            }

            if current == 0 {
                current = forest.make_set()?;
            }
            labels[idx] = current;
        }
    }

    let mut renumbered = vec![0u32; forest.len()];
    let mut region_count = 0u32;
    for label in labels.iter_mut().filter(|l| **l != 0) {
        let root = forest.find(*label) as usize;
        if renumbered[root] == 0 {
            region_count += 1;
            renumbered[root] = region_count;
        }
        *label = renumbered[root];
    }

    Ok(LabelGrid {
        width: w,
        height: h,
        labels,
        region_count,
    })
}

/// Partition the true cells of `mask` into connected regions.
#[cfg(not(feature = "labeling"))]
pub fn label(_mask: &Mask, _connectivity: Connectivity) -> Result<LabelGrid> {
    Err(StickerError::LabelingUnavailable(
        "built without the `labeling` feature".to_string(),
    ))
}

/// Union-find over provisional labels. Slot 0 is the background.
#[cfg(feature = "labeling")]
struct DisjointSet {
    parent: Vec<u32>,
}

#[cfg(feature = "labeling")]
impl DisjointSet {
    fn new() -> Self {
        Self { parent: vec![0] }
    }

    fn len(&self) -> usize {
        self.parent.len()
    }

    fn make_set(&mut self) -> Result<u32> {
        let id = u32::try_from(self.parent.len()).map_err(|_| {
            StickerError::LabelingUnavailable("provisional label space exhausted".to_string())
        })?;
        self.parent.push(id);
        Ok(id)
    }

    fn find(&mut self, mut x: u32) -> u32 {
        // path halving
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merge the sets of `a` and `b`; the smaller root wins.
    fn union(&mut self, a: u32, b: u32) -> u32 {
        let (ra, rb) = (self.find(a), self.find(b));
        let (keep, merge) = if ra <= rb { (ra, rb) } else { (rb, ra) };
        self.parent[merge as usize] = keep;
        keep
    }
}

#[cfg(all(test, feature = "labeling"))]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&str]) -> Mask {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let cells = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();
        Mask::new(width, height, cells).unwrap()
    }

    #[test]
    fn test_diagonal_cells_join_under_eight() {
        let mask = mask_from_rows(&["#..", ".#.", "..#"]);
        let grid = label(&mask, Connectivity::Eight).unwrap();
        assert_eq!(grid.region_count(), 1);

        let grid = label(&mask, Connectivity::Four).unwrap();
        assert_eq!(grid.region_count(), 3);
    }

    #[test]
    fn test_u_shape_merges_provisional_labels() {
        let mask = mask_from_rows(&["#...#", "#...#", "#####"]);
        let grid = label(&mask, Connectivity::Four).unwrap();
        assert_eq!(grid.region_count(), 1);
        assert_eq!(grid.get(0, 0), grid.get(4, 0));
    }

    #[test]
    fn test_label_zero_exactly_off_mask() {
        let mask = mask_from_rows(&["##..#", ".....", "#.##."]);
        let grid = label(&mask, Connectivity::Eight).unwrap();
        for (cell, id) in mask.as_slice().iter().zip(grid.labels()) {
            assert_eq!(*cell, *id != 0);
        }
        assert_eq!(grid.region_count(), 4);
    }

    #[test]
    fn test_ids_are_consecutive_in_raster_order() {
        let mask = mask_from_rows(&["#.#.#"]);
        let grid = label(&mask, Connectivity::Eight).unwrap();
        assert_eq!(grid.labels(), &[1, 0, 2, 0, 3]);
    }

    #[test]
    fn test_border_regions() {
        let mask = mask_from_rows(&[
            "#.....", //
            "#..##.", //
            "...##.", //
            "......", //
        ]);
        let grid = label(&mask, Connectivity::Eight).unwrap();
        let border = grid.border_regions();
        assert_eq!(grid.region_count(), 2);
        assert_eq!(border.len(), 1);
        assert!(border.contains(grid.get(0, 0)));
        assert!(!border.contains(grid.get(3, 1)));
        assert!(!border.contains(0));
    }

    #[test]
    fn test_empty_mask_has_no_regions() {
        let mask = Mask::filled(4, 4, false);
        let grid = label(&mask, Connectivity::Eight).unwrap();
        assert_eq!(grid.region_count(), 0);
        assert!(grid.border_regions().is_empty());
    }
}
