//! Projection of iteration-space regions into data spaces.
//!
//! An [`OperationSpace`] takes an axis-aligned box of the iteration space and
//! records, for every data space, the box of coordinates it can touch.

use crate::error::{ProblemShapeError, Result};
use super::{Coefficients, DataSpaceId, ProblemShape};

/// An inclusive axis-aligned box in one data space's coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSpaceBox {
    pub min: Vec<i64>,
    pub max: Vec<i64>,
}

impl DataSpaceBox {
    /// Returns the number of axes.
    pub fn order(&self) -> usize {
        self.min.len()
    }

    /// Returns the extent of each axis.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if an axis spans all of `i64`.
    pub fn extents(&self) -> Result<Vec<u64>> {
        self.min
            .iter()
            .zip(&self.max)
            .enumerate()
            .map(|(axis, (&lo, &hi))| {
                hi.abs_diff(lo).checked_add(1).ok_or_else(|| {
                    ProblemShapeError::overflow(format!("extent of axis {axis}: {lo}..={hi}"))
                })
            })
            .collect()
    }

    /// Returns the number of coordinate points in the box.
    pub fn volume(&self) -> Result<u64> {
        self.extents()?.into_iter().try_fold(1u64, |acc, extent| {
            acc.checked_mul(extent)
                .ok_or_else(|| ProblemShapeError::overflow("data-space box volume"))
        })
    }

    /// Returns `true` if `coords` lies inside the box.
    pub fn contains(&self, coords: &[i64]) -> bool {
        coords.len() == self.order()
            && coords
                .iter()
                .zip(self.min.iter().zip(&self.max))
                .all(|(c, (lo, hi))| lo <= c && c <= hi)
    }
}

/// The data-space footprint of an iteration-space box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpace {
    spaces: Vec<DataSpaceBox>,
}

impl OperationSpace {
    /// Projects the iteration-space box `low..=high` through every data
    /// space of `shape`.
    ///
    /// # Errors
    ///
    /// Returns `ArityMismatch` if a corner or `coefficients` has the wrong
    /// length, `MalformedShape` if `low[i] > high[i]` for some dimension, and
    /// `Overflow` if a bound does not fit in `i64`.
    pub fn new(
        shape: &ProblemShape,
        coefficients: &Coefficients,
        low: &[i64],
        high: &[i64],
    ) -> Result<Self> {
        shape.check_arity(coefficients, low)?;
        shape.check_arity(coefficients, high)?;

        if let Some(dim) = (0..low.len()).find(|&i| low[i] > high[i]) {
            return Err(ProblemShapeError::malformed_shape(format!(
                "iteration box is inverted along dimension {}: {} > {}",
                shape.dimension_name(dim)?,
                low[dim],
                high[dim]
            )));
        }

        let spaces = shape
            .projections()
            .iter()
            .map(|projection| -> Result<DataSpaceBox> {
                let mut min = Vec::with_capacity(projection.order());
                let mut max = Vec::with_capacity(projection.order());
                for axis in projection.iter() {
                    let (lo, hi) = axis.bounds(coefficients.as_slice(), low, high)?;
                    min.push(lo);
                    max.push(hi);
                }
                Ok(DataSpaceBox { min, max })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { spaces })
    }

    /// Returns the box touched in data space `id`.
    pub fn get(&self, id: DataSpaceId) -> Option<&DataSpaceBox> {
        self.spaces.get(id)
    }

    /// Iterates over the boxes in data-space id order.
    pub fn iter(&self) -> impl Iterator<Item = (DataSpaceId, &DataSpaceBox)> {
        self.spaces.iter().enumerate()
    }

    /// Returns the number of data-space points touched, summed over all
    /// data spaces.
    pub fn total_volume(&self) -> Result<u64> {
        let mut total = 0u64;
        for space in &self.spaces {
            total = total
                .checked_add(space.volume()?)
                .ok_or_else(|| ProblemShapeError::overflow("operation space volume"))?;
        }
        Ok(total)
    }
}
