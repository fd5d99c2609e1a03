use std::time::Instant;

use crate::{
    Error, PointSet, Result,
    algo::{greedy::solve_greedy, pool::SolverPool},
    constants::STITCH_ORDER,
};

const ERR_INVALID_THRESHOLD: &str = "division threshold must be > 0";

/// Spatial divide-and-conquer heuristic.
///
/// Sets larger than the threshold are cut into four quadrants, each solved
/// recursively on the pool, and the sub-tours are stitched back in the fixed
/// [`STITCH_ORDER`]. Sets at or under the threshold go to the greedy
/// heuristic.
#[derive(Clone, Copy)]
pub struct DivideAndConquerTour<'p> {
    threshold: usize,
    pool: &'p SolverPool,
}

impl<'p> DivideAndConquerTour<'p> {
    pub fn new(threshold: usize, pool: &'p SolverPool) -> Result<Self> {
        if threshold == 0 {
            return Err(Error::invalid_input(ERR_INVALID_THRESHOLD));
        }
        Ok(Self { threshold, pool })
    }

    pub fn run(&self, points: PointSet) -> Result<PointSet> {
        let now = Instant::now();
        let n = points.len();
        log::info!(
            "divide: start n={n} threshold={} threads={}",
            self.threshold,
            self.pool.threads()
        );

        let threshold = self.threshold;
        let tour = self.pool.run(move || solve_rec(points, threshold, 0))?;

        log::info!(
            "divide: complete n={} length={:.4} secs={:.3}",
            tour.len(),
            tour.total_length(true),
            now.elapsed().as_secs_f32()
        );
        Ok(tour)
    }
}

/// Solves `points` with [`DivideAndConquerTour`] on `pool`.
pub fn solve_divide_and_conquer(
    points: PointSet,
    threshold: usize,
    pool: &SolverPool,
) -> Result<PointSet> {
    DivideAndConquerTour::new(threshold, pool)?.run(points)
}

fn solve_rec(points: PointSet, threshold: usize, depth: usize) -> Result<PointSet> {
    let bounds = points.bounds();
    let (points, depth) = descend(points, threshold, depth);
    let n = points.len();

    if n <= threshold {
        return Ok(solve_greedy(points).relocated(bounds));
    }

    let quarters = points.divide();
    if quarters.iter().any(|q| q.len() == n) {
        log::trace!("divide.level: stalled depth={depth} n={n}");
        return Ok(solve_greedy(points).relocated(bounds));
    }

    log::trace!(
        "divide.level: split depth={depth} n={n} quarters=[{}, {}, {}, {}]",
        quarters[0].len(),
        quarters[1].len(),
        quarters[2].len(),
        quarters[3].len()
    );

    let [q0, q1, q2, q3] = quarters;
    let ((r0, r1), (r2, r3)) = rayon::join(
        || {
            rayon::join(
                || solve_quarter(q0, threshold, depth),
                || solve_quarter(q1, threshold, depth),
            )
        },
        || {
            rayon::join(
                || solve_quarter(q2, threshold, depth),
                || solve_quarter(q3, threshold, depth),
            )
        },
    );
    let solved = [r0?, r1?, r2?, r3?];

    let mut stitched = PointSet::with_bounds(n, bounds);
    for idx in STITCH_ORDER {
        stitched.append(&solved[idx])?;
    }
    Ok(stitched)
}

/// Narrows `points` into its only occupied quadrant for as long as a split
/// would put everything on one side. A single sub-tour stitches to itself,
/// so this walks down without forking. Stops once the bounds no longer
/// shrink or every point sits on the same spot.
fn descend(mut points: PointSet, threshold: usize, mut depth: usize) -> (PointSet, usize) {
    while points.len() > threshold && !points.is_coincident() {
        let bounds = points.bounds();
        let n = points.len();
        let Some(only) = points.divide().into_iter().find(|q| q.len() == n) else {
            break;
        };
        if only.bounds() == bounds {
            break;
        }
        points = only;
        depth += 1;
        log::trace!("divide.level: narrowed depth={depth} n={n}");
    }
    (points, depth)
}

fn solve_quarter(quarter: PointSet, threshold: usize, depth: usize) -> Result<PointSet> {
    if quarter.is_empty() {
        return Ok(quarter);
    }
    solve_rec(quarter, threshold, depth + 1)
}

#[cfg(test)]
mod tests {
    use super::{DivideAndConquerTour, solve_divide_and_conquer};
    use crate::{
        Error, PointSet,
        algo::{greedy::solve_greedy, pool::SolverPool},
        bounds::Bounds,
        point::Point,
        point_set::tests::{random_set, set_of, sorted_coords},
    };

    fn pool() -> SolverPool {
        SolverPool::new(4).expect("pool")
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let pool = pool();
        let err = DivideAndConquerTour::new(0, &pool)
            .err()
            .expect("zero threshold should fail");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn threshold_at_or_above_size_matches_greedy_exactly() {
        let pool = pool();
        let input = random_set(120, 21);
        let greedy = solve_greedy(input.clone());

        let same_size = solve_divide_and_conquer(input.clone(), 120, &pool).expect("solve");
        let larger = solve_divide_and_conquer(input, 1_000, &pool).expect("solve");

        assert_eq!(same_size.points(), greedy.points());
        assert_eq!(larger.points(), greedy.points());
    }

    #[test]
    fn preserves_point_multiset() {
        let pool = pool();
        let input = random_set(2_000, 4);
        let tour = solve_divide_and_conquer(input.clone(), 20, &pool).expect("solve");

        assert_eq!(tour.len(), input.len());
        assert_eq!(tour.bounds(), input.bounds());
        assert_eq!(sorted_coords(tour.points()), sorted_coords(input.points()));
    }

    #[test]
    fn repeated_runs_produce_identical_order() {
        let pool = pool();
        let input = random_set(3_000, 99);
        let first = solve_divide_and_conquer(input.clone(), 16, &pool).expect("first");
        let second = solve_divide_and_conquer(input, 16, &pool).expect("second");
        assert_eq!(first.points(), second.points());
    }

    #[test]
    fn result_does_not_depend_on_pool_size() {
        let input = random_set(1_500, 8);
        let single = SolverPool::new(1).expect("pool");
        let wide = SolverPool::new(8).expect("pool");

        let a = solve_divide_and_conquer(input.clone(), 10, &single).expect("single");
        let b = solve_divide_and_conquer(input, 10, &wide).expect("wide");
        assert_eq!(a.points(), b.points());
    }

    #[test]
    fn stitches_quadrants_in_fixed_order() {
        let pool = pool();
        // One point per quadrant, threshold 1 forces a single split.
        let input = set_of(&[(0.75, 0.25), (0.25, 0.75), (0.75, 0.75), (0.25, 0.25)]);
        let tour = solve_divide_and_conquer(input, 1, &pool).expect("solve");
        assert_eq!(
            tour.points(),
            &[
                Point::new(0.25, 0.25),
                Point::new(0.25, 0.75),
                Point::new(0.75, 0.75),
                Point::new(0.75, 0.25),
            ]
        );
    }

    #[test]
    fn coincident_points_terminate() {
        let pool = pool();
        let points = vec![Point::new(0.3, 0.3); 50];
        let input = PointSet::from_points(points, Bounds::unit()).expect("finite");
        let tour = solve_divide_and_conquer(input, 4, &pool).expect("solve");
        assert_eq!(tour.len(), 50);
        assert_eq!(tour.total_length(true), 0.0);
    }

    #[test]
    fn points_outside_bounds_are_kept() {
        let pool = pool();
        let input = set_of(&[(1.0, 1.0), (-0.5, 0.2), (0.1, 0.1), (0.9, 0.2), (0.4, 2.0)]);
        let tour = solve_divide_and_conquer(input.clone(), 1, &pool).expect("solve");
        assert_eq!(sorted_coords(tour.points()), sorted_coords(input.points()));
    }

    fn clustered_set(n: usize, seed: u64, scale: f32) -> PointSet {
        let points = random_set(n, seed)
            .iter()
            .map(|p| Point::new(p.x * scale, p.y * scale))
            .collect();
        PointSet::from_points(points, Bounds::unit()).expect("finite")
    }

    #[test]
    fn clustered_input_is_still_subdivided() {
        let pool = pool();
        // Everything sits in the low/low quadrant of the unit square.
        let input = clustered_set(3_000, 17, 0.4);
        let greedy = solve_greedy(input.clone());
        let tour = solve_divide_and_conquer(input.clone(), 20, &pool).expect("solve");

        assert_ne!(tour.points(), greedy.points());
        assert_eq!(tour.bounds(), Bounds::unit());
        assert_eq!(sorted_coords(tour.points()), sorted_coords(input.points()));
    }

    #[test]
    fn one_sided_split_matches_solving_the_occupied_quadrant() {
        let pool = pool();
        let input = clustered_set(1_000, 23, 0.4);
        let quadrant = Bounds::new(0.0, 0.5, 0.0, 0.5).expect("bounds");
        let narrowed = PointSet::from_points(input.points().to_vec(), quadrant).expect("finite");

        let wide = solve_divide_and_conquer(input, 16, &pool).expect("wide");
        let tight = solve_divide_and_conquer(narrowed, 16, &pool).expect("tight");
        assert_eq!(wide.points(), tight.points());
    }

    #[test]
    fn points_beyond_one_corner_terminate() {
        let pool = pool();
        let input = set_of(&[(-1.0, -1.0), (-1.0, -2.0), (-1.0, -3.0), (-2.0, -1.0)]);
        let tour = solve_divide_and_conquer(input.clone(), 1, &pool).expect("solve");
        assert_eq!(tour.bounds(), Bounds::unit());
        assert_eq!(sorted_coords(tour.points()), sorted_coords(input.points()));
    }

    #[test]
    fn empty_input_yields_empty_tour() {
        let pool = pool();
        let tour = solve_divide_and_conquer(set_of(&[]), 3, &pool).expect("solve");
        assert!(tour.is_empty());
    }

    #[test]
    fn tour_is_not_much_worse_than_greedy_on_uniform_points() {
        let pool = pool();
        let input = random_set(4_000, 12);
        let greedy = solve_greedy(input.clone()).total_length(true);
        let divided = solve_divide_and_conquer(input, 25, &pool)
            .expect("solve")
            .total_length(true);
        assert!(divided < greedy * 1.5, "divided={divided} greedy={greedy}");
    }
}
