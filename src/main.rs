use std::{process::ExitCode, time::Instant};

use log::{error, info};

use tsp_dc_core::{Result, SolverOptions, logging, runner};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let now = Instant::now();
    let options = SolverOptions::from_args()?;
    logging::init_logger(&options)?;

    info!("options: {options}");

    let reports = runner::run(&options)?;

    info!(
        "output: solvers={} time={:.2}s",
        reports.len(),
        now.elapsed().as_secs_f32()
    );
    Ok(())
}
