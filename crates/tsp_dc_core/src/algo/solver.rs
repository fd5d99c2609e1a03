use crate::{
    PointSet, Result,
    algo::{divide::DivideAndConquerTour, greedy::GreedyTour},
};

/// A tour-construction heuristic: takes ownership of a point set and hands
/// it back reordered into a tour.
pub trait TourSolver {
    fn name(&self) -> &'static str;

    fn solve(&self, points: PointSet) -> Result<PointSet>;
}

impl TourSolver for GreedyTour {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, mut points: PointSet) -> Result<PointSet> {
        self.run(&mut points);
        Ok(points)
    }
}

impl TourSolver for DivideAndConquerTour<'_> {
    fn name(&self) -> &'static str {
        "divide"
    }

    fn solve(&self, points: PointSet) -> Result<PointSet> {
        self.run(points)
    }
}
