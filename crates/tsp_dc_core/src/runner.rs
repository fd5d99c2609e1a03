use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use crate::{
    DivideAndConquerTour, Error, GreedyTour, PointSet, PointSource, Result, SolverOptions, SolverPool,
    TourSolver,
    io::output::{result_path, write_tour},
    timer::format_elapsed,
};

/// Outcome of one algorithm in a run. `elapsed` is the mean over `runs`.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub solver: &'static str,
    pub points: usize,
    pub runs: usize,
    pub length: f64,
    pub elapsed: Duration,
}

/// Runs the algorithms selected in [`SolverOptions`] against one input.
pub struct Runner<'o> {
    options: &'o SolverOptions,
    pool: SolverPool,
}

impl<'o> Runner<'o> {
    pub fn new(options: &'o SolverOptions) -> Result<Self> {
        let pool = SolverPool::new(options.threads)?;
        Ok(Self { options, pool })
    }

    pub fn pool(&self) -> &SolverPool {
        &self.pool
    }

    fn solvers(&self) -> Result<Vec<Box<dyn TourSolver + '_>>> {
        let mut solvers: Vec<Box<dyn TourSolver + '_>> = Vec::with_capacity(2);
        if self.options.algo.runs_greedy() {
            solvers.push(Box::new(GreedyTour::new()));
        }
        if self.options.algo.runs_divide() {
            solvers.push(Box::new(DivideAndConquerTour::new(
                self.options.div_limit,
                &self.pool,
            )?));
        }
        Ok(solvers)
    }

    /// Every selected algorithm is attempted. Failures are logged and the
    /// first one is returned once all have run.
    pub fn run<W: Write>(&self, input: &PointSet, out: &mut W) -> Result<Vec<RunReport>> {
        let mut reports = Vec::new();
        let mut first_err = None;

        for solver in self.solvers()? {
            let outcome = if self.options.is_benchmark() {
                self.bench_one(solver.as_ref(), input)
            } else {
                self.run_one(solver.as_ref(), input)
            };

            match outcome {
                Ok(report) => {
                    print_report(out, &report, self.options.is_benchmark())?;
                    reports.push(report);
                }
                Err(err) => {
                    log::error!("runner: {} failed: {err}", solver.name());
                    writeln!(out, "{}: failed: {err}", solver.name())?;
                    first_err.get_or_insert(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(reports),
        }
    }

    fn run_one(&self, solver: &dyn TourSolver, input: &PointSet) -> Result<RunReport> {
        let points = input.clone();
        let now = Instant::now();
        let tour = solver.solve(points)?;
        let elapsed = now.elapsed();

        let metrics = tour.metrics(true);
        log::info!(
            "runner: {} edges={} total={:.4} longest={:.4} average={:.6}",
            solver.name(),
            metrics.edges,
            metrics.total,
            metrics.longest,
            metrics.average
        );

        if self.options.write {
            write_tour(&result_path(&self.options.output_dir, solver.name()), &tour)?;
        }

        Ok(RunReport {
            solver: solver.name(),
            points: tour.len(),
            runs: 1,
            length: metrics.total,
            elapsed,
        })
    }

    fn bench_one(&self, solver: &dyn TourSolver, input: &PointSet) -> Result<RunReport> {
        let runs = self.options.bench;
        let divisor = bench_divisor(runs)?;
        let mut total = Duration::ZERO;
        let mut length = 0.0;

        for run in 0..runs {
            let points = input.clone();
            let now = Instant::now();
            let tour = solver.solve(points)?;
            let elapsed = now.elapsed();
            total += elapsed;
            length = tour.total_length(true);
            log::debug!(
                "runner.bench: {} run={} elapsed={}",
                solver.name(),
                run + 1,
                format_elapsed(elapsed)
            );
        }

        Ok(RunReport {
            solver: solver.name(),
            points: input.len(),
            runs,
            length,
            elapsed: total / divisor,
        })
    }
}

/// Run count as a `Duration` divisor; rejects zero and counts past `u32::MAX`.
fn bench_divisor(runs: usize) -> Result<u32> {
    match u32::try_from(runs) {
        Ok(0) => Err(Error::invalid_input("--bench must be > 0 to benchmark")),
        Ok(divisor) => Ok(divisor),
        Err(_) => Err(Error::invalid_input(format!(
            "--bench must be at most {}",
            u32::MAX
        ))),
    }
}

fn print_report<W: Write>(out: &mut W, report: &RunReport, bench: bool) -> io::Result<()> {
    if bench {
        writeln!(
            out,
            "{}: runs={} average={}",
            report.solver,
            report.runs,
            format_elapsed(report.elapsed)
        )
    } else {
        writeln!(
            out,
            "{}: points={} length={:.6} time={}",
            report.solver,
            report.points,
            report.length,
            format_elapsed(report.elapsed)
        )
    }
}

/// Loads the configured input and runs the selected algorithms, reporting to
/// stdout.
pub fn run(options: &SolverOptions) -> Result<Vec<RunReport>> {
    let source = PointSource::from_options(options);
    log::info!("input: {source}");
    let input = source.load()?;

    let runner = Runner::new(options)?;
    log::info!("runner: threads={}", runner.pool().threads());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    runner.run(&input, &mut out)
}
