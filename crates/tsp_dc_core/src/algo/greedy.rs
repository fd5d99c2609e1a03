use crate::{PointSet, constants::MIN_TOUR_POINTS};

/// Nearest-neighbor-forward heuristic.
///
/// Walks the set left to right and swaps the closest remaining point into
/// the slot right after the current one. Earlier positions are never
/// revisited, so the whole pass is `O(n^2)` and fully deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyTour;

impl GreedyTour {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, points: &mut PointSet) {
        let n = points.len();
        if n <= MIN_TOUR_POINTS {
            return;
        }
        for i in 0..n - MIN_TOUR_POINTS {
            let nearest = points.nearest_after(i);
            points.swap(i + 1, nearest);
        }
    }
}

/// Orders `points` with [`GreedyTour`] and hands the tour back.
pub fn solve_greedy(mut points: PointSet) -> PointSet {
    GreedyTour::new().run(&mut points);
    points
}
