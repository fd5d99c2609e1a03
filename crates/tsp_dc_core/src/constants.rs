/// Below this many points a tour has no ordering decision to make.
pub(crate) const MIN_TOUR_POINTS: usize = 2;

pub(crate) const QUADRANT_COUNT: usize = 4;

/// Quadrant indices in the order sub-tours are stitched back together.
/// Walks low-x/low-y, low-x/high-y, high-x/high-y, high-x/low-y so that
/// consecutive quadrants always share an edge.
pub(crate) const STITCH_ORDER: [usize; QUADRANT_COUNT] = [0, 1, 3, 2];

pub(crate) const DEFAULT_POINT_COUNT: usize = 10_000;
pub(crate) const DEFAULT_DIVISION_THRESHOLD: usize = 20;

pub(crate) const UNIT_MIN: f64 = 0.0;
pub(crate) const UNIT_MAX: f64 = 1.0;

pub(crate) const GREEDY_RESULT_FILE: &str = "result_greedy.txt";
pub(crate) const DIVIDE_RESULT_FILE: &str = "result_divide.txt";

pub(crate) const WORKER_THREAD_PREFIX: &str = "tsp-dc-worker";
