use std::{
  fs::File,
  io::{BufWriter, Write},
  path::{Path, PathBuf},
};

use crate::{
  chunked,
  compute::{Accumulator, CoordinatePair, Point, EARTH_RADIUS_KM},
  dir_name_parser,
  error::Result,
  non_zero_usize_parser, progress,
};

use clap::{Args, ValueEnum};
use rand::{Rng, SeedableRng};

pub type PairIter = Box<dyn Iterator<Item = CoordinatePair>>;

macros::generation_method_enum!(Uniform, Cluster);

/// Generate random Haversine pairs
#[derive(Debug, Args)]
pub struct GenerationArgs {
  /// Random sampling method
  pub method: GenerationMethod,
  /// Seed of the random number generator (u64)
  pub seed: u64,
  /// Number of pairs to generate (usize)
  #[clap(value_parser = non_zero_usize_parser())]
  pub number: usize,
  /// Omit JSON output file
  #[clap(long)]
  pub no_json: bool,
  /// Omit answer binary file
  #[clap(long)]
  pub no_answers: bool,
  /// Output dir to save JSON/answer file to
  #[clap(long, default_value = "data/", value_parser = dir_name_parser())]
  pub output_dir: PathBuf,
  /// Number of pairs processed in a batch
  #[clap(long, default_value_t = 64_000, value_parser = non_zero_usize_parser())]
  pub batch_size: usize,
}

/// Paths written by a generation run along with the reference mean
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
  pub json: Option<PathBuf>,
  pub answers: Option<PathBuf>,
  pub mean: f64,
}

impl GenerationArgs {
  pub fn execute(&self) -> Result<Generated> {
    let json_path = (!self.no_json).then(|| self.output_dir.join(self.file_name("json")));
    let answer_path = (!self.no_answers).then(|| self.output_dir.join(self.file_name("answer")));

    let mut json_writer = json_path.as_deref().map(create_writer).transpose()?;
    let mut answer_writer = answer_path.as_deref().map(create_writer).transpose()?;

    if let Some(w) = &mut json_writer {
      w.write_all(b"{\"pairs\":[\n")?;
    }

    let mut acc = Accumulator::default();
    for chunk in chunked(self.generate_pairs(), self.batch_size) {
      progress(self.number, acc.count(), 20);
      let answers: Vec<_> = chunk.iter().map(|p| p.haversine(EARTH_RADIUS_KM)).collect();

      if let Some(w) = &mut json_writer {
        for (i, pair) in chunk.iter().enumerate() {
          if acc.count() + i > 0 {
            w.write_all(b",\n")?;
          }
          write_pair(w, pair)?;
        }
      }

      if let Some(w) = &mut answer_writer {
        for answer in &answers {
          w.write_all(&answer.to_le_bytes())?;
        }
      }

      acc.extend(answers);
    }
    progress(self.number, acc.count(), 20);
    println!();

    if let Some(mut w) = json_writer {
      w.write_all(b"\n]}\n")?;
      w.flush()?;
    }
    if let Some(mut w) = answer_writer {
      w.flush()?;
    }

    let mean = acc.mean()?;
    log::info!("Generated {} pairs, json: {json_path:?}, answers: {answer_path:?}", acc.count());
    println!("{}\nExpected mean: \x1b[1m{mean}\x1b[0m", self.summary());

    Ok(Generated { json: json_path, answers: answer_path, mean })
  }

  pub fn generate_pairs(&self) -> PairIter {
    let Self { method, seed, number, .. } = *self;
    match method {
      GenerationMethod::Uniform => generate_uniform_pairs(seed, number),
      GenerationMethod::Cluster => generate_cluster_pairs(seed, number),
    }
  }

  pub fn file_name(&self, extension: &str) -> String {
    let Self { method, seed, number, .. } = *self;
    format!(
      "data_{}_{seed}_{number}{}{extension}",
      method.to_lowercase_string(),
      [".", ""][extension.is_empty() as usize],
    )
  }

  pub fn summary(&self) -> String {
    let Self { method, seed, number, .. } = *self;
    let green = "\x1b[32m";
    let reset = "\x1b[0m";
    let bold = "\x1b[1m";

    format!("Method: {bold}{green}{}{reset}\nRandom seed: {seed}\nPair count: {number}", method.to_lowercase_string())
  }
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
  Ok(BufWriter::new(File::create(path)?))
}

fn write_pair<W: Write>(w: &mut W, pair: &CoordinatePair) -> Result<()> {
  w.write_all(b"  ")?;
  serde_json::to_writer(&mut *w, pair).map_err(std::io::Error::from)?;
  Ok(())
}

fn generate_uniform_pairs(seed: u64, number: usize) -> PairIter {
  let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);

  Box::new((0..number).map(move |_| {
    let p0 = Point::new(rng.random_range(-180. ..180.), rng.random_range(-90. ..90.));
    let p1 = Point::new(rng.random_range(-180. ..180.), rng.random_range(-90. ..90.));
    CoordinatePair::new(p0, p1)
  }))
}

fn generate_cluster_pairs(seed: u64, number: usize) -> PairIter {
  let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);

  let x0r = rng.random_range(20. ..180.);
  let x1r = rng.random_range(20. ..180.);
  let y0r = rng.random_range(10. ..90.);
  let y1r = rng.random_range(10. ..90.);

  Box::new((0..number).map(move |_| {
    let p0 = Point::new(rng.random_range(-x0r..x0r), rng.random_range(-y0r..y0r));
    let p1 = Point::new(rng.random_range(-x1r..x1r), rng.random_range(-y1r..y1r));
    CoordinatePair::new(p0, p1)
  }))
}

mod macros {
  macro_rules! generation_method_enum {($($variant:ident),+ $(,)?) => {
  #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
  pub enum GenerationMethod {
    $($variant),+
  }

  impl GenerationMethod {
    fn to_lowercase_string(&self) -> String {
      format!("{self:?}").to_lowercase()
    }

    pub fn lowercase_options() -> Vec<String> {
      vec![$(GenerationMethod::$variant.to_lowercase_string()),+]
    }
  }
  };}
  pub(crate) use generation_method_enum;
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{compute::average, load::load_input};
  use float_cmp::approx_eq;
  use rstest::rstest;

  fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("haversine_generate_{}_{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
  }

  /// Reads back an answers file as written by `GenerationArgs::execute`
  fn read_answers<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let bytes = std::fs::read(path)?;
    let mut chunks = bytes.chunks_exact(std::mem::size_of::<f64>());
    let answers = chunks
      .by_ref()
      .map(|c| {
        let mut le = [0u8; 8];
        le.copy_from_slice(c);
        f64::from_le_bytes(le)
      })
      .collect();
    if !chunks.remainder().is_empty() {
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "answers file is not a whole number of f64s").into());
    }
    Ok(answers)
  }

  fn args(method: GenerationMethod, number: usize, batch_size: usize, output_dir: PathBuf) -> GenerationArgs {
    GenerationArgs { method, seed: 42, number, no_json: false, no_answers: false, output_dir, batch_size }
  }

  #[rstest]
  #[case::uniform_one_batch(GenerationMethod::Uniform, 100, 1000)]
  #[case::uniform_many_batches(GenerationMethod::Uniform, 1001, 64)]
  #[case::cluster_exact_batches(GenerationMethod::Cluster, 256, 64)]
  #[case::single_pair(GenerationMethod::Cluster, 1, 1)]
  fn generated_files_load(#[case] method: GenerationMethod, #[case] number: usize, #[case] batch_size: usize) {
    let dir = temp_dir(&format!("{method:?}_{number}_{batch_size}"));
    let generated = args(method, number, batch_size, dir.clone()).execute().unwrap();

    let loaded = load_input(generated.json.as_ref().unwrap()).unwrap();
    assert_eq!(loaded.input.pairs.len(), number);

    let answers = read_answers(generated.answers.as_ref().unwrap()).unwrap();
    assert_eq!(answers.len(), number);

    let summary = average(&loaded.input.pairs).unwrap();
    let answer_mean = answers.iter().sum::<f64>() / number as f64;
    assert!(approx_eq!(f64, summary.average, generated.mean, epsilon = 1e-6));
    assert!(approx_eq!(f64, answer_mean, generated.mean, epsilon = 1e-6));

    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn pairs_in_range() {
    let a = args(GenerationMethod::Uniform, 500, 64, std::env::temp_dir());
    for pair in a.generate_pairs() {
      assert!((-180. ..180.).contains(&pair.x0) && (-180. ..180.).contains(&pair.x1));
      assert!((-90. ..90.).contains(&pair.y0) && (-90. ..90.).contains(&pair.y1));
    }
  }

  #[rstest]
  #[case(GenerationMethod::Uniform)]
  #[case(GenerationMethod::Cluster)]
  fn seeded(#[case] method: GenerationMethod) {
    let a = args(method, 50, 64, std::env::temp_dir());
    let first: Vec<_> = a.generate_pairs().collect();
    let second: Vec<_> = a.generate_pairs().collect();
    assert_eq!(first, second);

    let other = GenerationArgs { seed: 43, ..args(method, 50, 64, std::env::temp_dir()) };
    assert_ne!(first, other.generate_pairs().collect::<Vec<_>>());
  }

  #[test]
  fn skips_omitted_outputs() {
    let dir = temp_dir("omitted");
    let a = GenerationArgs { no_json: true, no_answers: true, ..args(GenerationMethod::Uniform, 10, 4, dir.clone()) };
    let generated = a.execute().unwrap();
    assert_eq!(generated.json, None);
    assert_eq!(generated.answers, None);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn file_names() {
    let a = args(GenerationMethod::Cluster, 10, 4, PathBuf::from("data/"));
    assert_eq!(a.file_name("json"), "data_cluster_42_10.json");
    assert_eq!(a.file_name(""), "data_cluster_42_10");
    assert_eq!(GenerationMethod::lowercase_options(), vec!["uniform", "cluster"]);
  }

  #[test]
  fn truncated_answers() {
    let path = temp_dir("truncated").join("answers");
    std::fs::write(&path, [0u8; 12]).unwrap();
    assert!(read_answers(&path).is_err());
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
  }
}
