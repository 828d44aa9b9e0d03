pub mod compute;
pub mod error;
pub mod generate;
pub mod load;
pub mod report;

use std::{
  io::Write,
  path::{Path, PathBuf},
  time::Instant,
};

use compute::average;
use error::Result;
use generate::{GenerationArgs, GenerationMethod};
use load::{load_input, LoadedInput};
use report::{header, Report, Timings};

/*********************
*  Argument Parsing  *
*********************/
use clap::{builder::ValueParser, Parser, Subcommand};
use regex::Regex;

/// Average the haversine distance of the coordinate pairs in a JSON file
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
  /// Input JSON file to time
  input: PathBuf,
}

impl Args {
  pub fn execute(&self) -> Result<()> {
    println!("{}", header(&self.input));
    let report = run_average(&self.input)?;
    println!("{report}");
    Ok(())
  }
}

/// Program that generates haversine input
#[derive(Debug, Parser)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct GeneratorArgs {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  Generate(GenerationArgs),
  /// Clean JSON / answer files that match the output naming convention from a directory
  Clean {
    /// Output dir to remove JSON/answer files from
    #[clap(default_value = "data/", value_parser = dir_name_parser())]
    output_dir: PathBuf,
  },
}

impl GeneratorArgs {
  pub fn execute(&self) -> Result<()> {
    match &self.command {
      Command::Generate(generation) => generation.execute().map(|_| ()),
      Command::Clean { output_dir } => {
        for path in clean(output_dir)? {
          println!("Removed file: {}", path.to_string_lossy());
        }
        Ok(())
      }
    }
  }
}

/// Loads `input`, averages its pairs and returns the timed report
pub fn run_average(input: &Path) -> Result<Report> {
  let LoadedInput { input, parse_start, parse_end } = load_input(input)?;
  let summary = average(&input.pairs)?;
  let end = Instant::now();

  Ok(Report { summary, timings: Timings::new(parse_start, parse_end, end) })
}

/// Logs to stderr, filtered by `RUST_LOG` (default `warn`)
pub fn init_logger() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Removes generated files from `dir`, returning the removed paths
pub fn clean(dir: &Path) -> Result<Vec<PathBuf>> {
  let re = Regex::new(&format!(r"^data_({})_(\d+)_(\d+)$", GenerationMethod::lowercase_options().join("|")))?;
  let mut removed = vec![];
  for path in dir.read_dir()?.filter_map(|x| x.ok().map(|x| x.path()).filter(|p| p.is_file())) {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
      continue;
    };
    if re.is_match(stem) {
      std::fs::remove_file(&path)?;
      log::info!("Removed {}", path.display());
      removed.push(path);
    }
  }
  Ok(removed)
}

pub fn chunked<I>(a: impl IntoIterator<Item = I>, chunk_size: usize) -> impl Iterator<Item = Vec<I>> {
  let mut a = a.into_iter();
  std::iter::from_fn(move || Some(a.by_ref().take(chunk_size).collect()).filter(|chunk: &Vec<_>| !chunk.is_empty()))
}

/// Redraws a `width` wide progress bar on the current line
pub fn progress(total: usize, done: usize, width: usize) {
  let filled = if total == 0 { width } else { (done.min(total) * width) / total };
  print!("\r[{}{}] {done}/{total}", "#".repeat(filled), " ".repeat(width - filled));
  // Best effort
  std::io::stdout().flush().ok();
}

pub fn non_zero_usize_parser() -> ValueParser {
  ValueParser::new(|s: &str| match s.parse::<usize>().map_err(|_| "must be an unsigned integer")? {
    0 => Err("must be > 0".to_string()),
    val => Ok(val),
  })
}

pub fn dir_name_parser() -> ValueParser {
  ValueParser::new(|s: &str| {
    let path_buf = PathBuf::from(s);
    if path_buf.is_dir() {
      Ok(path_buf)
    } else {
      Err("must be directory name")
    }
  })
}
