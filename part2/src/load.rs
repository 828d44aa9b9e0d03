use std::{fs::File, io::BufReader, path::Path, time::Instant};

use crate::{
  compute::HaversineInput,
  error::{HaversineError, Result},
};

/// Deserialized input along with the instants taken around deserialization
#[derive(Debug)]
pub struct LoadedInput {
  pub input: HaversineInput,
  pub parse_start: Instant,
  pub parse_end: Instant,
}

pub fn load_input<P: AsRef<Path>>(path: P) -> Result<LoadedInput> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|source| HaversineError::FileAccess { path: path.to_path_buf(), source })?;
  let reader = BufReader::new(file);

  let parse_start = Instant::now();
  let input: HaversineInput =
    serde_json::from_reader(reader).map_err(|source| HaversineError::Parse { path: path.to_path_buf(), source })?;
  let parse_end = Instant::now();

  log::debug!("Loaded {} pairs from {} in {:?}", input.pairs.len(), path.display(), parse_end - parse_start);
  Ok(LoadedInput { input, parse_start, parse_end })
}
