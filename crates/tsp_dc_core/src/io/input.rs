use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{Error, Point, PointSet, Result, SolverOptions, bounds::Bounds};

const BLOCK_SEPARATOR: &str = ";;";
const BLOCK_KEYWORD: &str = "let ";
const LIST_OPEN: &str = "=[|";
const LIST_CLOSE: &str = "|]";
const POINT_SEPARATOR: char = ';';

/// Where the points of a run come from.
#[derive(Clone, Debug, PartialEq)]
pub enum PointSource {
    Random { count: usize, seed: Option<u64> },
    Dataset { path: PathBuf, name: String },
}

impl PointSource {
    pub fn from_options(options: &SolverOptions) -> Self {
        match options.dataset_path() {
            Some(path) => Self::Dataset {
                path: path.to_path_buf(),
                name: options.dataset.trim().to_string(),
            },
            None => Self::Random {
                count: options.points,
                seed: options.seed,
            },
        }
    }

    pub fn load(&self) -> Result<PointSet> {
        match self {
            Self::Random { count, seed } => random_points(*count, *seed),
            Self::Dataset { path, name } => {
                let mut datasets = read_datasets(path)?;
                let points = datasets.remove(name).ok_or_else(|| {
                    Error::invalid_input(format!(
                        "dataset '{name}' not found in {}",
                        path.display()
                    ))
                })?;
                log::info!(
                    "input: loaded dataset={name} n={} from {}",
                    points.len(),
                    path.display()
                );
                Ok(points)
            }
        }
    }
}

impl fmt::Display for PointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random {
                count,
                seed: Some(seed),
            } => write!(f, "random n={count} seed={seed}"),
            Self::Random { count, seed: None } => write!(f, "random n={count}"),
            Self::Dataset { path, name } => write!(f, "dataset {name} ({})", path.display()),
        }
    }
}

/// `count` points drawn uniformly from the unit square.
pub fn random_points(count: usize, seed: Option<u64>) -> Result<PointSet> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let points = (0..count)
        .map(|_| Point::new(rng.random::<f32>(), rng.random::<f32>()))
        .collect();

    PointSet::from_points(points, Bounds::unit())
}

/// Reads every named dataset in a file of
/// `let <name>=[|(x, y); (x, y); ...|];;` blocks.
pub fn read_datasets(path: &Path) -> Result<BTreeMap<String, PointSet>> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::invalid_input(format!("failed to read {}: {e}", path.display()))
    })?;
    Ok(parse_datasets(&content))
}

/// Parses dataset blocks. Blocks that fail to parse are logged and skipped.
pub fn parse_datasets(content: &str) -> BTreeMap<String, PointSet> {
    // Line breaks carry no meaning in this format.
    let content: String = content.lines().collect();

    let mut datasets = BTreeMap::new();
    for block in content.split(BLOCK_SEPARATOR) {
        if block.trim().is_empty() {
            continue;
        }
        match parse_block(block) {
            Ok((name, points)) => {
                log::debug!("input.parse: dataset={name} n={}", points.len());
                datasets.insert(name, points);
            }
            Err(err) => {
                let head: String = block.trim().chars().take(10).collect();
                log::warn!("input.parse: skipping block starting with '{head}': {err}");
            }
        }
    }
    datasets
}

fn parse_block(block: &str) -> Result<(String, PointSet)> {
    let start = block
        .find(BLOCK_KEYWORD)
        .ok_or_else(|| Error::invalid_data("missing 'let' keyword"))?;
    let body = &block[start + BLOCK_KEYWORD.len()..];

    let (name, list) = body
        .rsplit_once(LIST_OPEN)
        .ok_or_else(|| Error::invalid_data("missing '=[|'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_data("dataset name is empty"));
    }

    let end = list
        .rfind(LIST_CLOSE)
        .ok_or_else(|| Error::invalid_data("missing '|]'"))?;
    let tokens: Vec<&str> = list[..end]
        .split(POINT_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err(Error::invalid_data(format!("dataset '{name}' has no points")));
    }

    let mut points = PointSet::with_bounds(tokens.len(), Bounds::unit());
    for (idx, token) in tokens.iter().enumerate() {
        let (x, y) = parse_point(token).map_err(|err| {
            Error::invalid_data(format!("dataset '{name}' point {}: {err}", idx + 1))
        })?;
        points.add_point(x, y)?;
    }
    Ok((name.to_string(), points))
}

fn parse_point(token: &str) -> Result<(f32, f32)> {
    let inner = token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| Error::invalid_data(format!("expected '(x, y)' but got {token}")))?;

    let (x_s, y_s) = inner
        .split_once(',')
        .ok_or_else(|| Error::invalid_data(format!("expected '(x, y)' but got {token}")))?;

    // Parsed in double precision, then narrowed to storage precision.
    let x: f64 = x_s
        .trim()
        .parse()
        .map_err(|_| Error::invalid_data(format!("invalid x: {}", x_s.trim())))?;
    let y: f64 = y_s
        .trim()
        .parse()
        .map_err(|_| Error::invalid_data(format!("invalid y: {}", y_s.trim())))?;

    Ok((x as f32, y as f32))
}
