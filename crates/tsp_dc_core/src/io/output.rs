use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    Error, PointSet, Result,
    constants::{DIVIDE_RESULT_FILE, GREEDY_RESULT_FILE},
};

/// Result file for a solver, keyed by [`crate::TourSolver::name`].
pub fn result_path(output_dir: &Path, solver_name: &str) -> PathBuf {
    match solver_name {
        "greedy" => output_dir.join(GREEDY_RESULT_FILE),
        "divide" => output_dir.join(DIVIDE_RESULT_FILE),
        other => output_dir.join(format!("result_{other}.txt")),
    }
}

/// Writes one `x y` line per point, in tour order.
pub fn write_tour(path: &Path, tour: &PointSet) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path).map_err(|e| {
        Error::other(format!("failed to create {}: {e}", path.display()))
    })?;
    let mut out = BufWriter::new(file);
    for point in tour.iter() {
        writeln!(out, "{point}")?;
    }
    out.flush()?;

    log::debug!("output: wrote n={} to {}", tour.len(), path.display());
    Ok(())
}
