use std::{
    env,
    path::{Path, PathBuf},
};

use log::LevelFilter;
use tsp_dc_derive::{CliOptions, CliValue, KvDisplay};

use crate::{
    Error, Result,
    constants::{DEFAULT_DIVISION_THRESHOLD, DEFAULT_POINT_COUNT},
};

/// Runtime options for the `tsp-dc` binary.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct SolverOptions {
    /// Number of random points generated when no dataset is given.
    #[cli(long = "points")]
    pub points: usize,
    /// Largest partition the divide-and-conquer solver hands to greedy.
    #[cli(long = "div-limit")]
    pub div_limit: usize,
    /// Which heuristics to run.
    #[cli(long = "algo", parse_with = "Algorithm::parse")]
    pub algo: Algorithm,
    /// Benchmark repetitions per algorithm; 0 runs once and reports the tour.
    #[cli(long = "bench")]
    pub bench: usize,
    /// Dataset file to load instead of random points.
    #[cli(long = "file")]
    #[kv(fmt = "str")]
    pub file: String,
    /// Name of the dataset inside `file`.
    #[cli(long = "dataset")]
    #[kv(fmt = "str")]
    pub dataset: String,
    /// Seed for random point generation.
    #[cli(long = "seed")]
    #[kv(fmt = "opt")]
    pub seed: Option<u64>,
    /// Worker pool size; 0 picks one less than the available cores.
    #[cli(long = "threads")]
    pub threads: usize,
    /// Write each resulting tour to `output_dir`.
    #[cli(long = "write", flag)]
    pub write: bool,
    #[cli(long = "output-dir")]
    #[kv(fmt = "path")]
    pub output_dir: PathBuf,
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    #[cli(long = "log-timestamp", flag)]
    pub log_timestamp: bool,
    /// Log file path. Empty means stderr.
    #[cli(long = "log-output")]
    #[kv(fmt = "str")]
    pub log_output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "algo")]
pub enum Algorithm {
    Greedy,
    #[cli(alias = "dc")]
    Divide,
    Both,
}

impl Algorithm {
    pub fn runs_greedy(self) -> bool {
        matches!(self, Self::Greedy | Self::Both)
    }

    pub fn runs_divide(self) -> bool {
        matches!(self, Self::Divide | Self::Both)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINT_COUNT,
            div_limit: DEFAULT_DIVISION_THRESHOLD,
            algo: Algorithm::Both,
            bench: 0,
            file: String::new(),
            dataset: String::new(),
            seed: None,
            threads: 0,
            write: false,
            output_dir: PathBuf::from("."),
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: false,
            log_output: String::new(),
        }
    }
}

impl SolverOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<()> {
        if self.div_limit == 0 {
            return Err(Error::invalid_input("--div-limit must be > 0"));
        }
        if u32::try_from(self.bench).is_err() {
            return Err(Error::invalid_input(format!(
                "--bench must be at most {}",
                u32::MAX
            )));
        }
        if self.file.trim().is_empty() != self.dataset.trim().is_empty() {
            return Err(Error::invalid_input(
                "--file and --dataset must be given together",
            ));
        }
        Ok(())
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  tsp-dc [options]\n\n",
            "Options:\n",
            "  --points <usize>                   random points to generate (default 10000)\n",
            "  --div-limit <usize>                divide-and-conquer threshold (default 20)\n",
            "  --algo <greedy|divide|both>        heuristics to run (default both)\n",
            "  --bench <usize>                    benchmark repetitions, 0 disables\n",
            "  --file <path> --dataset <name>     load a named dataset instead of random points\n",
            "  --seed <u64>                       seed for random points\n",
            "  --threads <usize>                  worker threads, 0 = auto\n",
            "  --write[=<bool>] | --no-write      write result tours to --output-dir\n",
            "  --output-dir <path>                directory for result files (default .)\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>] | --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --help\n",
            "\n",
            "Examples:\n",
            "  tsp-dc --points 50000 --div-limit 32 --log-level info\n",
            "  tsp-dc --algo divide --bench 10 --threads 4\n",
            "  tsp-dc --file data_tsp.txt --dataset data_100 --write --output-dir out\n",
        )
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        let log_output = self.log_output.trim();
        if log_output.is_empty() || log_output == "-" {
            None
        } else {
            Some(Path::new(log_output))
        }
    }

    pub fn dataset_path(&self) -> Option<&Path> {
        let file = self.file.trim();
        if file.is_empty() {
            None
        } else {
            Some(Path::new(file))
        }
    }

    pub fn is_benchmark(&self) -> bool {
        self.bench > 0
    }
}
