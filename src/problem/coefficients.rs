//! Coefficient values for a problem instance.

use std::ops::Deref;
use serde::{Deserialize, Serialize};
use crate::error::{IdentifierKind, ProblemShapeError, Result};
use super::CoefficientId;

/// One integer value per coefficient id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coefficients {
    values: Vec<i64>,
}

impl Coefficients {
    /// Creates a coefficient set where `values[i]` is the value of id `i`.
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Returns the number of coefficients.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no coefficients.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value of coefficient `id`.
    pub fn get(&self, id: CoefficientId) -> Result<i64> {
        self.values
            .get(id)
            .copied()
            .ok_or_else(|| ProblemShapeError::unknown_identifier(IdentifierKind::Coefficient, id))
    }

    /// Overrides the value of coefficient `id`.
    pub fn set(&mut self, id: CoefficientId, value: i64) -> Result<()> {
        let slot = self
            .values
            .get_mut(id)
            .ok_or_else(|| ProblemShapeError::unknown_identifier(IdentifierKind::Coefficient, id))?;
        *slot = value;
        Ok(())
    }

    /// Iterates over `(id, value)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (CoefficientId, i64)> + '_ {
        self.values.iter().copied().enumerate()
    }

    /// Returns the values as a slice indexed by id.
    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }
}

impl Deref for Coefficients {
    type Target = [i64];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}
