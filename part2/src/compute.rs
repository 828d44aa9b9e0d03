use serde::{Deserialize, Serialize};

use crate::error::{HaversineError, Result};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Top level layout of an input file: `{"pairs": [...]}`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaversineInput {
  pub pairs: Vec<CoordinatePair>,
}

/// Two points in degrees, `x` is longitude and `y` is latitude
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePair {
  pub x0: f64,
  pub y0: f64,
  pub x1: f64,
  pub y1: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Point {
  pub lon: f64,
  pub lat: f64,
}

impl Point {
  pub fn new(lon: f64, lat: f64) -> Self {
    Self { lon, lat }
  }
}

impl CoordinatePair {
  pub fn new(Point { lon: x0, lat: y0 }: Point, Point { lon: x1, lat: y1 }: Point) -> Self {
    Self { x0, y0, x1, y1 }
  }

  pub fn points(&self) -> (Point, Point) {
    (Point::new(self.x0, self.y0), Point::new(self.x1, self.y1))
  }

  pub fn haversine(&self, radius: f64) -> f64 {
    let (p0, p1) = self.points();
    haversine_degrees(p0, p1, radius)
  }
}

/// Great-circle distance between `p0` and `p1` on a sphere of the given `radius`
pub fn haversine_degrees(p0: Point, p1: Point, radius: f64) -> f64 {
  arc_length(haversine_term(p0, p1), radius)
}

/// The `a` term of the haversine formula, the squared half chord between the points
/// on a unit sphere. Rounding can leave it slightly outside `[0, 1]`.
pub fn haversine_term(p0: Point, p1: Point) -> f64 {
  let dlat = (p1.lat - p0.lat).to_radians();
  let dlon = (p1.lon - p0.lon).to_radians();
  let lat0 = p0.lat.to_radians();
  let lat1 = p1.lat.to_radians();

  (dlat / 2.0).sin().powi(2) + lat0.cos() * lat1.cos() * (dlon / 2.0).sin().powi(2)
}

/// Converts a haversine term into a distance. `a` is clamped to `[0, 1]` so that
/// `asin` stays inside its domain.
pub fn arc_length(a: f64, radius: f64) -> f64 {
  2.0 * radius * a.clamp(0.0, 1.0).sqrt().asin()
}

/// Running sum and count of a reduction
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Accumulator {
  sum: f64,
  count: usize,
}

impl Accumulator {
  pub fn add(&mut self, distance: f64) {
    self.sum += distance;
    self.count += 1;
  }

  pub fn sum(&self) -> f64 {
    self.sum
  }

  pub fn count(&self) -> usize {
    self.count
  }

  pub fn mean(&self) -> Result<f64> {
    match self.count {
      0 => Err(HaversineError::EmptyInput),
      count => Ok(self.sum / count as f64),
    }
  }
}

impl Extend<f64> for Accumulator {
  fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
    iter.into_iter().for_each(|d| self.add(d));
  }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Summary {
  pub average: f64,
  pub count: usize,
}

pub fn accumulate<'a>(pairs: impl IntoIterator<Item = &'a CoordinatePair>, radius: f64) -> Accumulator {
  let mut acc = Accumulator::default();
  acc.extend(pairs.into_iter().map(|p| p.haversine(radius)));
  acc
}

pub fn average(pairs: &[CoordinatePair]) -> Result<Summary> {
  let acc = accumulate(pairs, EARTH_RADIUS_KM);
  let average = acc.mean()?;
  log::debug!("Reduced {} pairs, sum = {}", acc.count(), acc.sum());
  Ok(Summary { average, count: acc.count() })
}
