use crate::{
    Error, Result,
    bounds::{Bounds, Quadrant},
    constants::{MIN_TOUR_POINTS, QUADRANT_COUNT},
    point::Point,
};

/// Ordered, mutable collection of points plus the rectangle they live in.
///
/// Points are appended up to a declared capacity. `len()` is always the
/// number of points actually held; `capacity()` is the declared limit until
/// [`PointSet::trim`] collapses it onto the length. Once solved, the order of
/// the points is the tour.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    bounds: Bounds,
    points: Vec<Point>,
    capacity: usize,
}

impl PointSet {
    pub fn create(
        capacity: usize,
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    ) -> Result<Self> {
        Ok(Self::with_bounds(
            capacity,
            Bounds::new(min_x, max_x, min_y, max_y)?,
        ))
    }

    pub fn with_bounds(capacity: usize, bounds: Bounds) -> Self {
        Self {
            bounds,
            points: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a trimmed set holding exactly `points`.
    pub fn from_points(points: Vec<Point>, bounds: Bounds) -> Result<Self> {
        if let Some(bad) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::invalid_input(format!(
                "point {bad} has non-finite coordinates"
            )));
        }
        Ok(Self {
            bounds,
            capacity: points.len(),
            points,
        })
    }

    pub fn add_point(&mut self, x: f32, y: f32) -> Result<()> {
        if self.points.len() >= self.capacity {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let p = Point::new(x, y);
        if !p.is_finite() {
            return Err(Error::invalid_input(format!(
                "point ({x}, {y}) has non-finite coordinates"
            )));
        }
        self.points.push(p);
        Ok(())
    }

    pub fn trim(&mut self) {
        self.capacity = self.points.len();
        self.points.shrink_to_fit();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Same points, placed in `bounds`.
    pub(crate) fn relocated(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// True when every point shares one location; no split can separate them.
    pub(crate) fn is_coincident(&self) -> bool {
        self.points
            .split_first()
            .is_none_or(|(first, rest)| rest.iter().all(|p| p == first))
    }

    pub fn distance_squared(&self, i: usize, j: usize) -> f64 {
        self.points[i].distance_squared(&self.points[j])
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_squared(i, j).sqrt()
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.points.swap(i, j);
    }

    /// Index in `(index, len)` closest to `index`; the lowest index wins ties.
    /// Returns `index` itself when nothing follows it.
    pub fn nearest_after(&self, index: usize) -> usize {
        let origin = self.points[index];
        let mut best = index;
        let mut best_d = f64::INFINITY;
        for (offset, p) in self.points[index + 1..].iter().enumerate() {
            let d = origin.distance_squared(p);
            if d < best_d {
                best_d = d;
                best = index + 1 + offset;
            }
        }
        best
    }

    /// Splits into the four quadrants of `bounds`, in [`Quadrant::ALL`] order.
    /// Each point lands in exactly one output, which is trimmed and owns its
    /// own storage.
    pub fn divide(&self) -> [PointSet; QUADRANT_COUNT] {
        let mut parts: [Vec<Point>; QUADRANT_COUNT] = Default::default();
        for &p in &self.points {
            parts[self.bounds.quadrant_of(p).index()].push(p);
        }

        Quadrant::ALL.map(|q| {
            let points = std::mem::take(&mut parts[q.index()]);
            Self {
                bounds: self.bounds.quadrant(q),
                capacity: points.len(),
                points,
            }
        })
    }

    /// Appends every point of `other`, walking it backwards when that makes
    /// the junction with our current last point strictly shorter.
    pub fn append(&mut self, other: &PointSet) -> Result<()> {
        let (Some(first), Some(last)) = (other.points.first(), other.points.last()) else {
            return Ok(());
        };
        if self.len() + other.len() > self.capacity {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let reverse = self
            .points
            .last()
            .is_some_and(|tail| tail.distance_squared(first) > tail.distance_squared(last));

        if reverse {
            self.points.extend(other.points.iter().rev().copied());
        } else {
            self.points.extend_from_slice(&other.points);
        }
        Ok(())
    }

    /// Consecutive edge lengths, plus the closing edge when `close_tour`.
    pub fn edge_lengths(&self, close_tour: bool) -> impl Iterator<Item = f64> + '_ {
        let n = self.len();
        let open = self.points.windows(2).map(|w| w[0].distance(&w[1]));
        let closing = (close_tour && n >= MIN_TOUR_POINTS).then(|| self.distance(n - 1, 0));
        open.chain(closing)
    }

    pub fn total_length(&self, close_tour: bool) -> f64 {
        self.edge_lengths(close_tour).sum()
    }

    pub fn metrics(&self, close_tour: bool) -> TourMetrics {
        let mut edges = 0usize;
        let mut total = 0.0;
        let mut longest = 0.0_f64;
        for d in self.edge_lengths(close_tour) {
            edges += 1;
            total += d;
            longest = longest.max(d);
        }
        let average = if edges == 0 {
            0.0
        } else {
            total / edges as f64
        };

        TourMetrics {
            edges,
            total,
            longest,
            average,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TourMetrics {
    pub edges: usize,
    pub total: f64,
    pub longest: f64,
    pub average: f64,
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::PointSet;
    use crate::{
        Error,
        bounds::{Bounds, Quadrant},
        point::Point,
    };

    pub(crate) fn set_of(coords: &[(f32, f32)]) -> PointSet {
        let points = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
        PointSet::from_points(points, Bounds::unit()).expect("finite points")
    }

    pub(crate) fn random_set(n: usize, seed: u64) -> PointSet {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut set = PointSet::with_bounds(n, Bounds::unit());
        for _ in 0..n {
            set.add_point(rng.random::<f32>(), rng.random::<f32>())
                .expect("within capacity");
        }
        set
    }

    pub(crate) fn sorted_coords(points: &[Point]) -> Vec<(u32, u32)> {
        let mut v: Vec<(u32, u32)> = points
            .iter()
            .map(|p| (p.x.to_bits(), p.y.to_bits()))
            .collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn len_tracks_added_points_not_capacity() {
        let mut set = PointSet::create(5, 0.0, 1.0, 0.0, 1.0).expect("valid bounds");
        set.add_point(0.1, 0.2).expect("add");
        set.add_point(0.3, 0.4).expect("add");

        assert_eq!(set.len(), 2);
        assert_eq!(set.capacity(), 5);

        set.trim();
        assert_eq!(set.len(), 2);
        assert_eq!(set.capacity(), 2);
    }

    #[test]
    fn add_point_past_capacity_fails() {
        let mut set = PointSet::with_bounds(1, Bounds::unit());
        set.add_point(0.1, 0.1).expect("first add");
        let err = set.add_point(0.2, 0.2).expect_err("second add should fail");
        assert!(matches!(err, Error::CapacityExceeded { capacity: 1 }));
    }

    #[test]
    fn add_point_rejects_non_finite_coordinates() {
        let mut set = PointSet::with_bounds(2, Bounds::unit());
        let err = set.add_point(f32::NAN, 0.0).expect_err("NaN should fail");
        assert!(err.to_string().contains("non-finite"));
        assert!(set.is_empty());
    }

    #[test]
    fn create_rejects_inverted_bounds() {
        assert!(PointSet::create(4, 1.0, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn swap_exchanges_points() {
        let mut set = set_of(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        set.swap(0, 2);
        assert_eq!(set.points()[0], Point::new(2.0, 2.0));
        assert_eq!(set.points()[2], Point::new(0.0, 0.0));
    }

    #[test]
    fn nearest_after_only_scans_forward() {
        let set = set_of(&[(0.5, 0.5), (0.9, 0.9), (0.51, 0.5), (0.0, 0.0)]);
        assert_eq!(set.nearest_after(0), 2);
        // index 0 is closer to index 2 but lies behind it
        assert_eq!(set.nearest_after(2), 3);
    }

    #[test]
    fn nearest_after_breaks_ties_by_lowest_index() {
        let set = set_of(&[(0.5, 0.5), (0.75, 0.5), (0.25, 0.5), (0.5, 0.75)]);
        assert_eq!(set.nearest_after(0), 1);
    }

    #[test]
    fn nearest_after_last_index_returns_itself() {
        let set = set_of(&[(0.1, 0.1), (0.2, 0.2)]);
        assert_eq!(set.nearest_after(1), 1);
    }

    #[test]
    fn divide_partitions_points_into_half_open_quadrants() {
        let set = random_set(500, 7);
        let parts = set.divide();

        let mut all = Vec::new();
        for (q, part) in Quadrant::ALL.iter().zip(parts.iter()) {
            assert_eq!(part.bounds(), set.bounds().quadrant(*q));
            assert_eq!(part.capacity(), part.len());
            for p in part.iter() {
                assert!(part.bounds().contains(*p), "{p:?} escaped {q:?}");
            }
            all.extend_from_slice(part.points());
        }

        assert_eq!(sorted_coords(&all), sorted_coords(set.points()));
    }

    #[test]
    fn divide_keeps_boundary_points_exactly_once() {
        let set = set_of(&[(0.5, 0.5), (0.5, 0.0), (0.0, 0.5), (0.0, 0.0)]);
        let parts = set.divide();
        let total: usize = parts.iter().map(PointSet::len).sum();
        assert_eq!(total, 4);
        assert_eq!(parts[Quadrant::HighXHighY.index()].points(), &[Point::new(0.5, 0.5)]);
        assert_eq!(parts[Quadrant::HighXLowY.index()].points(), &[Point::new(0.5, 0.0)]);
        assert_eq!(parts[Quadrant::LowXHighY.index()].points(), &[Point::new(0.0, 0.5)]);
        assert_eq!(parts[Quadrant::LowXLowY.index()].points(), &[Point::new(0.0, 0.0)]);
    }

    #[test]
    fn divide_of_empty_set_yields_four_empty_sets() {
        let set = PointSet::with_bounds(0, Bounds::unit());
        assert!(set.divide().iter().all(PointSet::is_empty));
    }

    #[test]
    fn append_reverses_when_far_end_is_closer() {
        let mut head = PointSet::with_bounds(4, Bounds::unit());
        head.append(&set_of(&[(0.0, 0.0), (0.1, 0.0)])).expect("append");

        // (0.9, 0) is far from the tail (0.1, 0); (0.2, 0) is close.
        head.append(&set_of(&[(0.9, 0.0), (0.2, 0.0)])).expect("append");

        assert_eq!(
            head.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(0.1, 0.0),
                Point::new(0.2, 0.0),
                Point::new(0.9, 0.0),
            ]
        );
    }

    #[test]
    fn append_keeps_forward_direction_on_ties() {
        let mut head = set_of(&[(0.5, 0.5)]);
        head.capacity = 3;
        head.append(&set_of(&[(0.25, 0.5), (0.75, 0.5)])).expect("append");
        assert_eq!(head.points()[1], Point::new(0.25, 0.5));
        assert_eq!(head.points()[2], Point::new(0.75, 0.5));
    }

    #[test]
    fn append_to_empty_set_keeps_forward_order() {
        let mut head = PointSet::with_bounds(3, Bounds::unit());
        head.append(&set_of(&[(0.9, 0.9), (0.1, 0.1), (0.2, 0.2)]))
            .expect("append");
        assert_eq!(head.points()[0], Point::new(0.9, 0.9));
    }

    #[test]
    fn append_past_capacity_fails_without_mutation() {
        let mut head = PointSet::with_bounds(1, Bounds::unit());
        let err = head
            .append(&set_of(&[(0.1, 0.1), (0.2, 0.2)]))
            .expect_err("append should fail");
        assert!(matches!(err, Error::CapacityExceeded { capacity: 1 }));
        assert!(head.is_empty());
    }

    #[test]
    fn total_length_of_unit_square() {
        let set = set_of(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!((set.total_length(false) - 3.0).abs() < 1e-12);
        assert!((set.total_length(true) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn total_length_is_invariant_under_rotation_and_reversal() {
        let set = random_set(40, 11);
        let closed = set.total_length(true);
        let open = set.total_length(false);

        let mut rotated = set.points().to_vec();
        rotated.rotate_left(13);
        let rotated = PointSet::from_points(rotated, Bounds::unit()).expect("finite");
        assert!((rotated.total_length(true) - closed).abs() < 1e-9);

        let mut reversed = set.points().to_vec();
        reversed.reverse();
        let reversed = PointSet::from_points(reversed, Bounds::unit()).expect("finite");
        assert!((reversed.total_length(true) - closed).abs() < 1e-9);
        assert!((reversed.total_length(false) - open).abs() < 1e-9);
    }

    #[test]
    fn total_length_of_tiny_sets_is_zero() {
        assert_eq!(set_of(&[]).total_length(true), 0.0);
        assert_eq!(set_of(&[(0.3, 0.3)]).total_length(true), 0.0);
    }

    #[test]
    fn metrics_report_longest_and_average_edge() {
        let set = set_of(&[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)]);
        let metrics = set.metrics(true);
        assert_eq!(metrics.edges, 3);
        assert!((metrics.total - 12.0).abs() < 1e-9);
        assert!((metrics.longest - 5.0).abs() < 1e-9);
        assert!((metrics.average - 4.0).abs() < 1e-9);
    }

    #[test]
    fn coincidence_needs_every_point_on_one_spot() {
        assert!(set_of(&[]).is_coincident());
        assert!(set_of(&[(0.3, 0.3), (0.3, 0.3), (0.3, 0.3)]).is_coincident());
        assert!(!set_of(&[(0.3, 0.3), (0.3, 0.3), (0.3, 0.25)]).is_coincident());
    }

    #[test]
    fn relocated_keeps_points_and_swaps_bounds() {
        let set = set_of(&[(0.1, 0.2), (0.3, 0.4)]);
        let bounds = Bounds::new(0.0, 0.5, 0.0, 0.5).expect("bounds");
        let moved = set.clone().relocated(bounds);
        assert_eq!(moved.points(), set.points());
        assert_eq!(moved.bounds(), bounds);
    }
}
