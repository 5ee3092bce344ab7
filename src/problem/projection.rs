//! Affine projections from iteration space into data spaces.
//!
//! A [`Projection`] holds one [`AffineExpr`] per coordinate axis of a data
//! space. Each expression is a sum of [`AffineTerm`]s, and each term scales one
//! iteration dimension by either a named coefficient or an implicit `1`.

use std::ops::Deref;
use num_traits::PrimInt;
use serde::{Deserialize, Serialize};
use crate::error::{ProblemShapeError, Result};
use super::{CoefficientId, DimensionId};

/// One `coefficient * dimension` product inside an axis expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffineTerm {
    /// The scaling coefficient, or `None` for an implicit coefficient of 1.
    pub coefficient: Option<CoefficientId>,
    /// The iteration dimension being scaled.
    pub dimension: DimensionId,
}

impl AffineTerm {
    /// A term with an implicit coefficient of 1.
    pub fn unit(dimension: DimensionId) -> Self {
        Self {
            coefficient: None,
            dimension,
        }
    }

    /// A term scaled by a named coefficient.
    pub fn scaled(coefficient: CoefficientId, dimension: DimensionId) -> Self {
        Self {
            coefficient: Some(coefficient),
            dimension,
        }
    }

    /// Decodes a raw `(coefficient, dimension)` pair where a coefficient id
    /// equal to `num_coefficients` stands for the implicit coefficient of 1.
    ///
    /// Ids above `num_coefficients` are not rejected here; validation is left
    /// to the caller.
    pub fn from_raw(coefficient: usize, dimension: DimensionId, num_coefficients: usize) -> Self {
        if coefficient == num_coefficients {
            Self::unit(dimension)
        } else {
            Self::scaled(coefficient, dimension)
        }
    }

    /// Encodes this term as a raw `(coefficient, dimension)` pair, using
    /// `num_coefficients` as the implicit-one sentinel.
    pub fn raw(&self, num_coefficients: usize) -> (usize, DimensionId) {
        (self.coefficient.unwrap_or(num_coefficients), self.dimension)
    }

    /// Resolves the coefficient value of this term.
    pub fn coefficient_value<T: PrimInt>(&self, coefficients: &[T]) -> Result<T> {
        match self.coefficient {
            None => Ok(T::one()),
            Some(id) => coefficients
                .get(id)
                .copied()
                .ok_or_else(|| ProblemShapeError::arity_mismatch(id + 1, coefficients.len())),
        }
    }
}

/// The coordinate of one data-space axis, as a sum of terms.
///
/// Term order is kept exactly as declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffineExpr {
    terms: Vec<AffineTerm>,
}

impl AffineExpr {
    /// Creates an expression from its terms.
    pub fn new(terms: Vec<AffineTerm>) -> Self {
        Self { terms }
    }

    /// Returns the terms in declaration order.
    pub fn terms(&self) -> &[AffineTerm] {
        &self.terms
    }

    /// Evaluates the expression at an iteration-space point.
    ///
    /// # Errors
    ///
    /// Returns `ArityMismatch` if a term indexes past `coefficients` or
    /// `point`, and `Overflow` if the sum does not fit in `T`.
    pub fn evaluate<T: PrimInt>(&self, coefficients: &[T], point: &[T]) -> Result<T> {
        let mut sum = T::zero();
        for term in &self.terms {
            let coefficient = term.coefficient_value(coefficients)?;
            let value = point_value(point, term.dimension)?;
            let product = coefficient
                .checked_mul(&value)
                .ok_or_else(|| ProblemShapeError::overflow(format!("{:?}", term)))?;
            sum = sum
                .checked_add(&product)
                .ok_or_else(|| ProblemShapeError::overflow(format!("{:?}", self.terms)))?;
        }
        Ok(sum)
    }

    /// Computes the inclusive range this expression covers when every
    /// dimension `i` ranges over `low[i]..=high[i]`.
    ///
    /// Each term is bounded independently, so negative coefficients swap the
    /// ends of their dimension's range.
    pub fn bounds<T: PrimInt>(&self, coefficients: &[T], low: &[T], high: &[T]) -> Result<(T, T)> {
        let mut min = T::zero();
        let mut max = T::zero();
        for term in &self.terms {
            let coefficient = term.coefficient_value(coefficients)?;
            let overflow = || ProblemShapeError::overflow(format!("{:?}", term));
            let a = coefficient
                .checked_mul(&point_value(low, term.dimension)?)
                .ok_or_else(overflow)?;
            let b = coefficient
                .checked_mul(&point_value(high, term.dimension)?)
                .ok_or_else(overflow)?;
            min = min.checked_add(&a.min(b)).ok_or_else(overflow)?;
            max = max.checked_add(&a.max(b)).ok_or_else(overflow)?;
        }
        Ok((min, max))
    }
}

fn point_value<T: PrimInt>(point: &[T], dimension: DimensionId) -> Result<T> {
    point
        .get(dimension)
        .copied()
        .ok_or_else(|| ProblemShapeError::arity_mismatch(dimension + 1, point.len()))
}

/// The per-axis expressions of one data space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projection {
    axes: Vec<AffineExpr>,
}

impl Projection {
    /// Creates a projection from its axis expressions, in axis order.
    pub fn new(axes: Vec<AffineExpr>) -> Self {
        Self { axes }
    }

    /// Returns the number of coordinate axes.
    pub fn order(&self) -> usize {
        self.axes.len()
    }

    /// Maps an iteration-space point to this data space's coordinates.
    pub fn evaluate<T: PrimInt>(&self, coefficients: &[T], point: &[T]) -> Result<Vec<T>> {
        self.axes
            .iter()
            .map(|axis| axis.evaluate(coefficients, point))
            .collect()
    }
}

impl Deref for Projection {
    type Target = [AffineExpr];

    fn deref(&self) -> &Self::Target {
        &self.axes
    }
}
