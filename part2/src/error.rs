use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = HaversineError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HaversineError {
  #[error("could not open input file {}: {source}", path.display())]
  FileAccess { path: PathBuf, source: std::io::Error },
  #[error("could not parse input file {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },
  /// Averaging requires at least one pair
  #[error("input contains no coordinate pairs, average is undefined")]
  EmptyInput,
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("invalid file name pattern: {0}")]
  Pattern(#[from] regex::Error),
}
