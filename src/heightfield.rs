//! Fractal elevation fields built by midpoint displacement.

use rand::Rng;
use serde::Serialize;

use crate::error::GenerationError;

/// Dense square grid of elevations, stored row-major.
///
/// Values are not clamped: displacement noise and river erosion can push
/// elevations outside the `[0, 1)` seed range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeightField {
    dimension: usize,
    values: Vec<f64>,
}

impl HeightField {
    fn unassigned(dimension: usize) -> Self {
        Self {
            dimension,
            values: vec![f64::NAN; dimension * dimension],
        }
    }

    /// Builds a field from explicit rows. Any non-empty square grid is accepted.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, GenerationError> {
        let dimension = rows.len();
        if dimension == 0 || rows.iter().any(|row| row.len() != dimension) {
            return Err(GenerationError::InvalidDimension { dimension });
        }
        Ok(Self {
            dimension,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Builds a field by evaluating `f(row, col)` for every cell.
    pub fn from_fn(
        dimension: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self, GenerationError> {
        if dimension == 0 {
            return Err(GenerationError::InvalidDimension { dimension });
        }
        let mut values = Vec::with_capacity(dimension * dimension);
        for row in 0..dimension {
            for col in 0..dimension {
                values.push(f(row, col));
            }
        }
        Ok(Self { dimension, values })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn contains(&self, row: i64, col: i64) -> bool {
        let n = self.dimension as i64;
        (0..n).contains(&row) && (0..n).contains(&col)
    }

    pub fn get(&self, row: i64, col: i64) -> Option<f64> {
        self.index(row, col).map(|idx| self.values[idx])
    }

    pub fn set(&mut self, row: i64, col: i64, value: f64) -> Result<(), GenerationError> {
        let idx = self.index(row, col).ok_or(GenerationError::OutOfBoundsAccess {
            row,
            col,
            dimension: self.dimension,
        })?;
        self.values[idx] = value;
        Ok(())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn min_max(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    fn index(&self, row: i64, col: i64) -> Option<usize> {
        if self.contains(row, col) {
            Some(row as usize * self.dimension + col as usize)
        } else {
            None
        }
    }

    fn mean_of(&self, samples: [(i64, i64); 4]) -> f64 {
        let (sum, count) = samples
            .iter()
            .filter_map(|&(row, col)| self.get(row, col))
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        sum / count as f64
    }
}

/// Synthesizes an `dimension`×`dimension` field with the diamond-square scheme.
///
/// `dimension` must be `2^k + 1` with `k >= 1`; `feature_size` must be a power
/// of two no larger than `dimension - 1`. Grid points on multiples of
/// `feature_size` are seeded uniformly in `[0, 1)`, then each round averages
/// diagonal (square pass) and orthogonal (diamond pass) neighbours at half the
/// step and adds a perturbation in `±0.5 * step / dimension`.
pub fn synthesize<R: Rng + ?Sized>(
    dimension: usize,
    feature_size: usize,
    rng: &mut R,
) -> Result<HeightField, GenerationError> {
    validate_dimensions(dimension, feature_size)?;

    let mut field = HeightField::unassigned(dimension);
    let n = dimension as i64;
    let feature = feature_size as i64;

    for row in (0..n).step_by(feature_size) {
        for col in (0..n).step_by(feature_size) {
            field.set(row, col, rng.gen::<f64>())?;
        }
    }

    let mut step = feature;
    while step > 1 {
        let half = step / 2;
        let scale = step as f64 / dimension as f64;

        // Square pass: centres of each seeded square.
        for row in (half..n - 1).step_by(step as usize) {
            for col in (half..n - 1).step_by(step as usize) {
                let avg = field.mean_of([
                    (row - half, col - half),
                    (row - half, col + half),
                    (row + half, col + half),
                    (row + half, col - half),
                ]);
                field.set(row, col, avg + (rng.gen::<f64>() - 0.5) * scale)?;
            }
        }

        // Diamond pass: edge midpoints, reading what the square pass wrote.
        for row in (0..n).step_by(step as usize) {
            for col in (0..n).step_by(step as usize) {
                for (r, c) in [(row + half, col), (row, col + half)] {
                    if !field.contains(r, c) {
                        continue;
                    }
                    let avg = field.mean_of([
                        (r - half, c),
                        (r + half, c),
                        (r, c + half),
                        (r, c - half),
                    ]);
                    field.set(r, c, avg + (rng.gen::<f64>() - 0.5) * scale)?;
                }
            }
        }

        step = half;
    }

    debug_assert!(field.values.iter().all(|v| v.is_finite()));
    Ok(field)
}

pub fn validate_dimensions(dimension: usize, feature_size: usize) -> Result<(), GenerationError> {
    if dimension < 3 || !(dimension - 1).is_power_of_two() {
        return Err(GenerationError::InvalidDimension { dimension });
    }
    if !feature_size.is_power_of_two() || feature_size > dimension - 1 {
        return Err(GenerationError::InvalidFeatureSize {
            feature_size,
            dimension,
        });
    }
    Ok(())
}
