use std::fmt;

/// A 2-D point stored in single precision.
/// Distances are computed in `f64` so squared sums never lose range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_squared(self, rhs: &Self) -> f64 {
        let dx = f64::from(rhs.x) - f64::from(self.x);
        let dy = f64::from(rhs.y) - f64::from(self.y);
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, rhs: &Self) -> f64 {
        self.distance_squared(rhs).sqrt()
    }

    pub(crate) fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bx = ryu::Buffer::new();
        let mut by = ryu::Buffer::new();
        write!(f, "{} {}", bx.format(self.x), by.format(self.y))
    }
}
