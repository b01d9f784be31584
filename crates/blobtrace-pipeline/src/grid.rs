//! Bounds-checked region lookup over a labeled raster.

use image::{ImageBuffer, Luma, Primitive};

use crate::types::{Cell, Dimensions};

/// Read-only view of a raster as "region" / "not region" cells.
///
/// Probing a cell outside the grid is valid and answers `false`.
pub trait RegionGrid {
    /// Size of the grid.
    fn dimensions(&self) -> Dimensions;

    /// Whether `cell` is inside the grid and belongs to the region.
    fn in_region(&self, cell: Cell) -> bool;
}

impl<G: RegionGrid + ?Sized> RegionGrid for &G {
    fn dimensions(&self) -> Dimensions {
        (**self).dimensions()
    }

    fn in_region(&self, cell: Cell) -> bool {
        (**self).in_region(cell)
    }
}

/// A label raster where cells equal to `region` form the region.
#[derive(Debug, Clone, Copy)]
pub struct LabelGrid<'a, P: Primitive> {
    labels: &'a ImageBuffer<Luma<P>, Vec<P>>,
    region: P,
}

impl<'a, P: Primitive> LabelGrid<'a, P> {
    /// View `labels` with `region` as the in-region value.
    #[must_use]
    pub const fn new(labels: &'a ImageBuffer<Luma<P>, Vec<P>>, region: P) -> Self {
        Self { labels, region }
    }
}

impl<P: Primitive> RegionGrid for LabelGrid<'_, P> {
    fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.labels.width(),
            height: self.labels.height(),
        }
    }

    fn in_region(&self, cell: Cell) -> bool {
        let (Ok(x), Ok(y)) = (u32::try_from(cell.x), u32::try_from(cell.y)) else {
            return false;
        };
        self.labels
            .get_pixel_checked(x, y)
            .is_some_and(|p| p.0[0] == self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::grid_from_rows;

    #[test]
    fn label_match_is_in_region() {
        let image = grid_from_rows(&["#.", ".#"]);
        let grid = LabelGrid::new(&image, 255);
        assert!(grid.in_region(Cell::new(0, 0)));
        assert!(!grid.in_region(Cell::new(1, 0)));
        assert!(!grid.in_region(Cell::new(0, 1)));
        assert!(grid.in_region(Cell::new(1, 1)));
    }

    #[test]
    fn out_of_bounds_probes_are_not_in_region() {
        let image = grid_from_rows(&["##", "##"]);
        let grid = LabelGrid::new(&image, 255);
        for cell in [
            Cell::new(-1, 0),
            Cell::new(0, -1),
            Cell::new(2, 0),
            Cell::new(0, 2),
            Cell::new(i64::MAX, i64::MIN),
        ] {
            assert!(!grid.in_region(cell), "{cell:?} should be outside");
        }
    }

    #[test]
    fn region_value_selects_label() {
        let labels: ImageBuffer<Luma<u32>, Vec<u32>> =
            ImageBuffer::from_fn(3, 1, |x, _| Luma([x]));
        let grid = LabelGrid::new(&labels, 2);
        assert!(!grid.in_region(Cell::new(0, 0)));
        assert!(!grid.in_region(Cell::new(1, 0)));
        assert!(grid.in_region(Cell::new(2, 0)));
        assert_eq!(
            grid.dimensions(),
            Dimensions {
                width: 3,
                height: 1
            }
        );
    }

    #[test]
    fn reference_forwards_to_grid() {
        let image = grid_from_rows(&["#"]);
        let grid = LabelGrid::new(&image, 255);
        let by_ref: &dyn RegionGrid = &grid;
        assert!((&by_ref).in_region(Cell::new(0, 0)));
    }
}
