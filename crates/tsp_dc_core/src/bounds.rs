use crate::{
    Error, Result,
    constants::{UNIT_MAX, UNIT_MIN},
    point::Point,
};

/// One of the four cells produced by bisecting [`Bounds`] on both axes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Quadrant {
    LowXLowY,
    LowXHighY,
    HighXLowY,
    HighXHighY,
}

impl Quadrant {
    /// Quadrants in `divide` output order.
    pub const ALL: [Self; 4] = [
        Self::LowXLowY,
        Self::LowXHighY,
        Self::HighXLowY,
        Self::HighXHighY,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::LowXLowY => 0,
            Self::LowXHighY => 1,
            Self::HighXLowY => 2,
            Self::HighXHighY => 3,
        }
    }

    fn from_halves(high_x: bool, high_y: bool) -> Self {
        match (high_x, high_y) {
            (false, false) => Self::LowXLowY,
            (false, true) => Self::LowXHighY,
            (true, false) => Self::HighXLowY,
            (true, true) => Self::HighXHighY,
        }
    }
}

/// Axis-aligned rectangle a point set lives in. It need not be the tight
/// bounding box of the points; it only drives quadrant boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self> {
        let all_finite = [min_x, max_x, min_y, max_y].iter().all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::invalid_input(format!(
                "bounds must be finite: x=[{min_x}, {max_x}) y=[{min_y}, {max_y})"
            )));
        }
        if min_x > max_x || min_y > max_y {
            return Err(Error::invalid_input(format!(
                "bounds are inverted: x=[{min_x}, {max_x}) y=[{min_y}, {max_y})"
            )));
        }
        Ok(Self::new_unchecked(min_x, max_x, min_y, max_y))
    }

    /// The `[0,1) x [0,1)` square used by the random and dataset point sources.
    pub fn unit() -> Self {
        Self::new_unchecked(UNIT_MIN, UNIT_MAX, UNIT_MIN, UNIT_MAX)
    }

    pub(crate) fn new_unchecked(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn mid_x(&self) -> f64 {
        self.min_x + (self.max_x - self.min_x) / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.min_y + (self.max_y - self.min_y) / 2.0
    }

    /// Half-open containment: `[min_x, max_x) x [min_y, max_y)`.
    pub fn contains(&self, p: Point) -> bool {
        let (x, y) = (f64::from(p.x), f64::from(p.y));
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    pub fn quadrant(&self, q: Quadrant) -> Self {
        let (mid_x, mid_y) = (self.mid_x(), self.mid_y());
        match q {
            Quadrant::LowXLowY => Self::new_unchecked(self.min_x, mid_x, self.min_y, mid_y),
            Quadrant::LowXHighY => Self::new_unchecked(self.min_x, mid_x, mid_y, self.max_y),
            Quadrant::HighXLowY => Self::new_unchecked(mid_x, self.max_x, self.min_y, mid_y),
            Quadrant::HighXHighY => Self::new_unchecked(mid_x, self.max_x, mid_y, self.max_y),
        }
    }

    /// Quadrant a point falls into. Points on a midline belong to the high
    /// side; points outside the rectangle go to the nearest quadrant.
    pub fn quadrant_of(&self, p: Point) -> Quadrant {
        Quadrant::from_halves(
            f64::from(p.x) >= self.mid_x(),
            f64::from(p.y) >= self.mid_y(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, Quadrant};
    use crate::point::Point;

    #[test]
    fn new_rejects_inverted_and_non_finite_bounds() {
        assert!(Bounds::new(1.0, 0.0, 0.0, 1.0).is_err());
        assert!(Bounds::new(0.0, 1.0, 2.0, 1.0).is_err());
        assert!(Bounds::new(f64::NAN, 1.0, 0.0, 1.0).is_err());
        assert!(Bounds::new(0.0, f64::INFINITY, 0.0, 1.0).is_err());
        assert!(Bounds::new(0.0, 0.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn quadrants_tile_the_parent() {
        let b = Bounds::new(0.0, 4.0, -2.0, 2.0).expect("valid bounds");
        assert_eq!(b.quadrant(Quadrant::LowXLowY), Bounds::new_unchecked(0.0, 2.0, -2.0, 0.0));
        assert_eq!(b.quadrant(Quadrant::LowXHighY), Bounds::new_unchecked(0.0, 2.0, 0.0, 2.0));
        assert_eq!(b.quadrant(Quadrant::HighXLowY), Bounds::new_unchecked(2.0, 4.0, -2.0, 0.0));
        assert_eq!(b.quadrant(Quadrant::HighXHighY), Bounds::new_unchecked(2.0, 4.0, 0.0, 2.0));
    }

    #[test]
    fn quadrant_of_matches_half_open_containment() {
        let b = Bounds::unit();
        let samples = [
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.5),
            Point::new(0.49, 0.5),
            Point::new(0.5, 0.49),
            Point::new(0.999, 0.001),
        ];
        for p in samples {
            let q = b.quadrant_of(p);
            assert!(b.quadrant(q).contains(p), "{p:?} not inside {q:?}");
            let owners = Quadrant::ALL
                .iter()
                .filter(|q| b.quadrant(**q).contains(p))
                .count();
            assert_eq!(owners, 1);
        }
    }

    #[test]
    fn points_outside_bounds_map_to_nearest_quadrant() {
        let b = Bounds::unit();
        assert_eq!(b.quadrant_of(Point::new(1.0, 1.0)), Quadrant::HighXHighY);
        assert_eq!(b.quadrant_of(Point::new(-3.0, 7.0)), Quadrant::LowXHighY);
    }

    #[test]
    fn quadrant_indices_follow_all_order() {
        for (idx, q) in Quadrant::ALL.iter().enumerate() {
            assert_eq!(q.index(), idx);
        }
    }
}
