use std::{
  fmt,
  path::Path,
  time::{Duration, Instant},
};

use crate::compute::Summary;

/// Split of wall-clock time between loading the input and the math
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Timings {
  pub input: Duration,
  pub math: Duration,
}

impl Timings {
  pub fn new(start: Instant, mid: Instant, end: Instant) -> Self {
    Self { input: mid.saturating_duration_since(start), math: end.saturating_duration_since(mid) }
  }

  pub fn total(&self) -> Duration {
    self.input + self.math
  }

  pub fn input_percent(&self) -> f64 {
    self.share(self.input)
  }

  pub fn math_percent(&self) -> f64 {
    self.share(self.math)
  }

  /// Pairs per second over the total time
  pub fn throughput(&self, count: usize) -> f64 {
    let total = self.total().as_secs_f64();
    if total == 0.0 { f64::INFINITY } else { count as f64 / total }
  }

  fn share(&self, part: Duration) -> f64 {
    let total = self.total().as_secs_f64();
    if total == 0.0 { 0.0 } else { part.as_secs_f64() / total * 100. }
  }
}

pub fn header(input: &Path) -> String {
  format!("---- Parsing {} ----", input.display())
}

#[derive(Debug, Clone)]
pub struct Report {
  pub summary: Summary,
  pub timings: Timings,
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Self { summary: Summary { average, count }, timings: t } = self;
    writeln!(f, "Result: {average:6.2}")?;
    writeln!(f, "Input = {:8.4} seconds | {:6.2}% of total time", t.input.as_secs_f64(), t.input_percent())?;
    writeln!(f, "Math  = {:8.4} seconds | {:6.2}% of total time", t.math.as_secs_f64(), t.math_percent())?;
    writeln!(f, "Total = {:8.4} seconds", t.total().as_secs_f64())?;
    write!(f, "Throughput = {:8.2} haversines/second", t.throughput(*count))
  }
}
