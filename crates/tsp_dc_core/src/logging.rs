use std::{fs::File, io::Write, thread};

use env_logger::{Builder, Target, WriteStyle, fmt::Formatter};
use log::{Level, Record};

use crate::{Error, LogFormat, Result, SolverOptions, constants::WORKER_THREAD_PREFIX};

/// Installs the global logger. Fails if one is already installed.
///
/// Compact lines read `LEVEL message`. Pretty lines add the module the record
/// came from and which thread emitted it, so sub-solves running on pool
/// workers (`w0`, `w1`, ...) can be told apart from the driver thread.
pub fn init_logger(options: &SolverOptions) -> Result<()> {
    let log_format = options.log_format;
    let log_timestamp = options.log_timestamp;

    let mut builder = Builder::new();
    builder
        .filter_level(options.log_level.to_filter())
        .write_style(WriteStyle::Never)
        .format(move |buf: &mut Formatter, record| {
            if log_timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            write_record(buf, log_format, record)
        });

    builder.target(match options.log_output_path() {
        Some(log_path) => {
            let log_file = File::create(log_path).map_err(|e| {
                Error::other(format!(
                    "failed to create log output file {}: {e}",
                    log_path.display()
                ))
            })?;
            Target::Pipe(Box::new(log_file))
        }
        None => Target::Stderr,
    });

    builder
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

fn write_record<W: Write>(
    out: &mut W,
    format: LogFormat,
    record: &Record<'_>,
) -> std::io::Result<()> {
    let level = level_tag(record.level());
    match format {
        LogFormat::Compact => writeln!(out, "{level} {}", record.args()),
        LogFormat::Pretty => {
            let current = thread::current();
            writeln!(
                out,
                "{level:<5} {:<10} [{}] {}",
                thread_label(current.name()),
                module_label(record.target()),
                record.args()
            )
        }
    }
}

/// `tsp-dc-worker-3` becomes `w3`; other threads keep their own name.
fn thread_label(name: Option<&str>) -> String {
    match name {
        Some(name) => match name
            .strip_prefix(WORKER_THREAD_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
        {
            Some(idx) => format!("w{idx}"),
            None => name.to_string(),
        },
        None => String::from("-"),
    }
}

/// Last path segment of a log target: `tsp_dc_core::algo::divide` is `divide`.
fn module_label(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
