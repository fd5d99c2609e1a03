//! Euclidean TSP tour construction on planar points.
//! Provides a greedy nearest-neighbour heuristic and a parallel spatial
//! divide-and-conquer heuristic that stitches quadrant sub-tours.

mod algo;
mod bounds;
mod constants;
mod error;
mod io;
pub mod logging;
mod point;
mod point_set;
pub mod runner;
mod timer;

pub use algo::divide::{DivideAndConquerTour, solve_divide_and_conquer};
pub use algo::greedy::{GreedyTour, solve_greedy};
pub use algo::pool::SolverPool;
pub use algo::solver::TourSolver;
pub use bounds::{Bounds, Quadrant};
pub use error::{Error, Result};
pub use io::input::{PointSource, parse_datasets, random_points, read_datasets};
pub use io::options::{Algorithm, LogFormat, LogLevel, SolverOptions};
pub use io::output::{result_path, write_tour};
pub use point::Point;
pub use point_set::{PointSet, TourMetrics};
pub use timer::format_elapsed;
