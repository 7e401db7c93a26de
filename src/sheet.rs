use crate::types::{Orientation, Rect};

/// Space already committed on a sheet, in the orientation actually used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedRect {
    pub x: u32,
    pub y: u32,
    pub rect: Rect,
}

// Far edges are widened to u64 so sheets near u32::MAX cannot wrap.
impl OccupiedRect {
    fn x_end(&self) -> u64 {
        u64::from(self.x) + u64::from(self.rect.length)
    }

    fn y_end(&self) -> u64 {
        u64::from(self.y) + u64::from(self.rect.width)
    }

    /// Half-open overlap test: rectangles sharing only an edge do not overlap.
    pub fn overlaps(&self, other: &OccupiedRect) -> bool {
        u64::from(self.x) < other.x_end()
            && self.x_end() > u64::from(other.x)
            && u64::from(self.y) < other.y_end()
            && self.y_end() > u64::from(other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
}

/// One stock sheet being filled with the bottom-left policy.
#[derive(Debug, Clone)]
pub struct Sheet {
    extent: Rect,
    occupied: Vec<OccupiedRect>,
}

impl Sheet {
    pub fn new(extent: Rect) -> Self {
        Self {
            extent,
            occupied: Vec::new(),
        }
    }

    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Committed rectangles in placement order.
    pub fn occupied(&self) -> &[OccupiedRect] {
        &self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    pub fn used_area(&self) -> u64 {
        self.occupied.iter().map(|o| o.rect.area()).sum()
    }

    pub fn compute_waste(&self) -> u64 {
        self.extent.area() - self.used_area()
    }

    /// Natural orientation first, then swapped if allowed. Commits at most
    /// one rectangle; leaves the sheet untouched on `None`.
    pub fn try_place(&mut self, piece: Rect, allow_rotate: bool) -> Option<Position> {
        debug_assert!(!piece.is_empty(), "piece {piece} has a zero extent");

        let orientations: &[Orientation] = if allow_rotate {
            &[Orientation::Natural, Orientation::Swapped]
        } else {
            &[Orientation::Natural]
        };

        for &orientation in orientations {
            let rect = orientation.apply(piece);
            if let Some((x, y)) = self.find_position(rect) {
                self.occupied.push(OccupiedRect { x, y, rect });
                return Some(Position { x, y, orientation });
            }
        }
        None
    }

    /// Lowest, then leftmost, candidate where `rect` fits without overlap.
    pub fn find_position(&self, rect: Rect) -> Option<(u32, u32)> {
        if !rect.fits_in(&self.extent) {
            return None;
        }
        self.candidates(rect).into_iter().find(|&(x, y)| {
            let probe = OccupiedRect { x, y, rect };
            self.within_bounds(&probe) && !self.occupied.iter().any(|o| o.overlaps(&probe))
        })
    }

    fn within_bounds(&self, probe: &OccupiedRect) -> bool {
        probe.x_end() <= u64::from(self.extent.length)
            && probe.y_end() <= u64::from(self.extent.width)
    }

    /// The origin plus the right-hand and top neighbours of every committed
    /// rectangle, sorted by ascending y then x.
    fn candidates(&self, rect: Rect) -> Vec<(u32, u32)> {
        let mut points = Vec::with_capacity(1 + self.occupied.len() * 2);
        points.push((0, 0));

        let length = u64::from(self.extent.length);
        let width = u64::from(self.extent.width);

        for o in &self.occupied {
            if o.x_end() + u64::from(rect.length) <= length
                && let Ok(x) = u32::try_from(o.x_end())
            {
                points.push((x, o.y));
            }
            if o.y_end() + u64::from(rect.width) <= width
                && let Ok(y) = u32::try_from(o.y_end())
            {
                points.push((o.x, y));
            }
        }

        points.sort_by_key(|&(x, y)| (y, x));
        points.dedup();
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied(x: u32, y: u32, length: u32, width: u32) -> OccupiedRect {
        OccupiedRect {
            x,
            y,
            rect: Rect::new(length, width),
        }
    }

    #[test]
    fn test_first_piece_at_origin() {
        let mut sheet = Sheet::new(Rect::new(96, 48));
        let pos = sheet.try_place(Rect::new(48, 24), true).unwrap();
        assert_eq!((pos.x, pos.y), (0, 0));
        assert_eq!(pos.orientation, Orientation::Natural);
        assert_eq!(sheet.occupied().len(), 1);
    }

    #[test]
    fn test_fills_row_before_stacking() {
        let mut sheet = Sheet::new(Rect::new(96, 48));
        let piece = Rect::new(48, 24);
        let spots: Vec<(u32, u32)> = (0..4)
            .map(|_| {
                let p = sheet.try_place(piece, false).unwrap();
                (p.x, p.y)
            })
            .collect();
        assert_eq!(spots, vec![(0, 0), (48, 0), (0, 24), (48, 24)]);
        assert!(sheet.try_place(piece, false).is_none());
        assert_eq!(sheet.compute_waste(), 0);
    }

    #[test]
    fn test_prefers_lowest_gap() {
        let mut sheet = Sheet::new(Rect::new(100, 100));
        sheet.try_place(Rect::new(50, 20), false).unwrap();
        // Too long to sit right of the first piece, so it goes on top.
        let p = sheet.try_place(Rect::new(60, 30), false).unwrap();
        assert_eq!((p.x, p.y), (0, 20));
        // A short piece still finds the gap on the bottom row.
        let p = sheet.try_place(Rect::new(40, 10), false).unwrap();
        assert_eq!((p.x, p.y), (50, 0));
    }

    #[test]
    fn test_rotation_fallback() {
        let mut sheet = Sheet::new(Rect::new(96, 48));
        let p = sheet.try_place(Rect::new(40, 60), true).unwrap();
        assert_eq!(p.orientation, Orientation::Swapped);
        assert_eq!(sheet.occupied()[0].rect, Rect::new(60, 40));
    }

    #[test]
    fn test_rotation_disallowed() {
        let mut sheet = Sheet::new(Rect::new(96, 48));
        assert!(sheet.try_place(Rect::new(40, 60), false).is_none());
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_natural_orientation_wins_when_both_fit() {
        let mut sheet = Sheet::new(Rect::new(100, 100));
        let p = sheet.try_place(Rect::new(30, 70), true).unwrap();
        assert_eq!(p.orientation, Orientation::Natural);
    }

    #[test]
    fn test_failure_leaves_sheet_unchanged() {
        let mut sheet = Sheet::new(Rect::new(100, 100));
        sheet.try_place(Rect::new(100, 60), false).unwrap();
        let before = sheet.occupied().to_vec();
        assert!(sheet.try_place(Rect::new(50, 50), true).is_none());
        assert_eq!(sheet.occupied(), before.as_slice());
    }

    #[test]
    fn test_edge_touching_is_not_overlap() {
        let a = occupied(0, 0, 10, 10);
        assert!(!a.overlaps(&occupied(10, 0, 10, 10)));
        assert!(!a.overlaps(&occupied(0, 10, 10, 10)));
        assert!(!a.overlaps(&occupied(10, 10, 5, 5)));
        assert!(a.overlaps(&occupied(9, 9, 5, 5)));
        assert!(a.overlaps(&occupied(2, 2, 2, 2)));
    }

    #[test]
    fn test_huge_sheet_does_not_wrap() {
        let mut sheet = Sheet::new(Rect::new(4_000_000_000, 10));
        let piece = Rect::new(3_000_000_000, 10);
        let first = sheet.try_place(piece, true).unwrap();
        assert_eq!((first.x, first.y), (0, 0));
        // 3e9 + 3e9 runs past the 4e9 edge and must be refused.
        assert!(sheet.try_place(piece, true).is_none());
        assert_eq!(sheet.occupied().len(), 1);
    }

    #[test]
    fn test_fills_sheet_at_numeric_limit() {
        let mut sheet = Sheet::new(Rect::new(u32::MAX, 4));
        let half = u32::MAX / 2;
        let a = sheet.try_place(Rect::new(half, 4), false).unwrap();
        let b = sheet.try_place(Rect::new(u32::MAX - half, 4), false).unwrap();
        assert_eq!((a.x, b.x), (0, half));
        assert!(sheet.try_place(Rect::new(1, 1), true).is_none());
        assert_eq!(sheet.compute_waste(), 0);
        assert_eq!(sheet.extent(), Rect::new(u32::MAX, 4));
    }

    #[test]
    fn test_overlap_near_numeric_limit() {
        let a = occupied(u32::MAX - 10, 0, 10, 5);
        assert!(a.overlaps(&occupied(u32::MAX - 5, 2, 5, 5)));
        assert!(!a.overlaps(&occupied(0, 0, u32::MAX - 10, 5)));
    }

    #[test]
    fn test_too_large_for_empty_sheet() {
        let mut sheet = Sheet::new(Rect::new(96, 48));
        assert!(sheet.try_place(Rect::new(200, 200), true).is_none());
        assert_eq!(sheet.compute_waste(), 96 * 48);
    }

    #[test]
    fn test_waste_tracks_used_area() {
        let mut sheet = Sheet::new(Rect::new(96, 48));
        sheet.try_place(Rect::new(48, 24), true).unwrap();
        sheet.try_place(Rect::new(10, 10), true).unwrap();
        assert_eq!(sheet.used_area(), 48 * 24 + 100);
        assert_eq!(sheet.compute_waste(), 96 * 48 - 48 * 24 - 100);
    }

    #[test]
    fn test_committed_rects_stay_disjoint() {
        let mut sheet = Sheet::new(Rect::new(96, 48));
        let sizes = [(30, 20), (25, 25), (40, 10), (12, 30), (50, 15), (8, 8), (20, 40)];
        for (l, w) in sizes {
            sheet.try_place(Rect::new(l, w), true);
        }
        let occ = sheet.occupied();
        for (i, a) in occ.iter().enumerate() {
            assert!(a.x_end() <= 96 && a.y_end() <= 48);
            for b in &occ[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }
}
