//! The problem shape registry.
//!
//! A [`ProblemShape`] describes the index space of a tensor computation: the
//! iteration dimensions, the scalar coefficients (strides, dilations), the
//! data spaces (operands) and the affine projection from iteration-space
//! points into each data space's coordinates.
//!
//! A shape is an owned, immutable value. It can be built from a
//! [`ShapeSpec`] and passed by reference to whatever needs it, or published
//! once process-wide with [`initialize`] and read back with [`shape`].

use std::sync::OnceLock;
use tracing::{info, warn};
use crate::error::{IdentifierKind, ProblemShapeError, Result};

pub mod coefficients;
pub mod names;
pub mod operation_space;
pub mod projection;
pub mod spec;

pub use coefficients::Coefficients;
pub use names::NameTable;
pub use operation_space::{DataSpaceBox, OperationSpace};
pub use projection::{AffineExpr, AffineTerm, Projection};
pub use spec::{CoefficientSpec, DataSpaceSpec, DimensionSpec, ShapeSpec, SHARED_DATA_SPACE_NAME};

/// Index of an iteration-space dimension.
pub type DimensionId = usize;
/// Index of a coefficient.
pub type CoefficientId = usize;
/// Index of a data space.
pub type DataSpaceId = usize;

/// A validated, frozen problem shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemShape {
    pub(crate) dimensions: NameTable,
    pub(crate) coefficients: NameTable,
    pub(crate) default_coefficients: Coefficients,
    /// Holds `num_data_spaces` real entries plus the reserved shared slot.
    pub(crate) data_spaces: NameTable,
    pub(crate) num_data_spaces: usize,
    pub(crate) orders: Vec<usize>,
    pub(crate) read_write: Vec<bool>,
    pub(crate) projections: Vec<Projection>,
}

impl ProblemShape {
    /// Builds the convolution shape described by [`ShapeSpec::convolution`].
    pub fn convolution() -> Self {
        match ShapeSpec::convolution().build() {
            Ok(shape) => shape,
            Err(err) => panic!("built-in convolution shape is malformed: {}", err),
        }
    }

    /// Returns the number of iteration-space dimensions.
    pub fn num_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns the number of coefficients.
    pub fn num_coefficients(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns the number of data spaces, not counting the reserved slot.
    pub fn num_data_spaces(&self) -> usize {
        self.num_data_spaces
    }

    pub fn dimension_name(&self, id: DimensionId) -> Result<&str> {
        self.dimensions.name(id)
    }

    pub fn dimension_id(&self, name: &str) -> Result<DimensionId> {
        self.dimensions.id(name)
    }

    pub fn coefficient_name(&self, id: CoefficientId) -> Result<&str> {
        self.coefficients.name(id)
    }

    pub fn coefficient_id(&self, name: &str) -> Result<CoefficientId> {
        self.coefficients.id(name)
    }

    /// Returns the name of data space `id`.
    ///
    /// The reserved shared id ([`Self::shared_data_space_id`]) resolves to its
    /// reserved name.
    pub fn data_space_name(&self, id: DataSpaceId) -> Result<&str> {
        self.data_spaces.name(id)
    }

    /// Returns the id of the data space called `name`, including the
    /// reserved shared slot.
    pub fn data_space_id(&self, name: &str) -> Result<DataSpaceId> {
        self.data_spaces.id(name)
    }

    /// The reserved id one past the last real data space.
    ///
    /// It names no operand: it has no order, no projection and no read-write
    /// flag.
    pub fn shared_data_space_id(&self) -> DataSpaceId {
        self.num_data_spaces
    }

    /// Returns the dimension name table.
    pub fn dimensions(&self) -> &NameTable {
        &self.dimensions
    }

    /// Returns the coefficient name table.
    pub fn coefficients(&self) -> &NameTable {
        &self.coefficients
    }

    /// Returns the data-space name table, including the reserved slot.
    pub fn data_spaces(&self) -> &NameTable {
        &self.data_spaces
    }

    /// Returns the value of every coefficient when nothing overrides it.
    pub fn default_coefficients(&self) -> &Coefficients {
        &self.default_coefficients
    }

    /// Returns the default coefficients with named overrides applied.
    pub fn coefficients_with(&self, overrides: &[(&str, i64)]) -> Result<Coefficients> {
        let mut coefficients = self.default_coefficients.clone();
        for &(name, value) in overrides {
            coefficients.set(self.coefficient_id(name)?, value)?;
        }
        Ok(coefficients)
    }

    /// Returns the rank of data space `id`'s coordinate space.
    pub fn data_space_order(&self, id: DataSpaceId) -> Result<usize> {
        self.orders
            .get(id)
            .copied()
            .ok_or_else(|| unknown_data_space(id))
    }

    /// Returns `true` if writes to data space `id` accumulate onto existing
    /// values, `false` if it is read-only source data.
    pub fn is_read_write(&self, id: DataSpaceId) -> Result<bool> {
        self.read_write
            .get(id)
            .copied()
            .ok_or_else(|| unknown_data_space(id))
    }

    /// Returns the per-axis affine expressions of data space `id`.
    pub fn projection_of(&self, id: DataSpaceId) -> Result<&Projection> {
        self.projections.get(id).ok_or_else(|| unknown_data_space(id))
    }

    /// Returns every projection, indexed by data-space id.
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    /// Maps an iteration-space point to data space `id`'s coordinates.
    ///
    /// # Errors
    ///
    /// Returns `ArityMismatch` if `point` does not have one value per
    /// dimension or `coefficients` one value per coefficient.
    pub fn project_point(
        &self,
        id: DataSpaceId,
        coefficients: &Coefficients,
        point: &[i64],
    ) -> Result<Vec<i64>> {
        self.check_arity(coefficients, point)?;
        self.projection_of(id)?.evaluate(coefficients.as_slice(), point)
    }

    pub(crate) fn check_arity(&self, coefficients: &Coefficients, point: &[i64]) -> Result<()> {
        if point.len() != self.num_dimensions() {
            return Err(ProblemShapeError::arity_mismatch(
                self.num_dimensions(),
                point.len(),
            ));
        }
        if coefficients.len() != self.num_coefficients() {
            return Err(ProblemShapeError::arity_mismatch(
                self.num_coefficients(),
                coefficients.len(),
            ));
        }
        Ok(())
    }
}

fn unknown_data_space(id: DataSpaceId) -> ProblemShapeError {
    ProblemShapeError::unknown_identifier(IdentifierKind::DataSpace, id)
}

static PROBLEM_SHAPE: OnceLock<ProblemShape> = OnceLock::new();

/// Publishes the built-in convolution shape process-wide.
///
/// Call once before any analysis reads [`shape`].
///
/// # Errors
///
/// Returns `AlreadyInitialized` if a shape has already been published. The
/// published shape is left unchanged.
pub fn initialize() -> Result<&'static ProblemShape> {
    publish(ProblemShape::convolution())
}

/// Validates `spec` and publishes it process-wide.
///
/// Nothing is published if validation fails.
pub fn initialize_with(spec: ShapeSpec) -> Result<&'static ProblemShape> {
    publish(spec.build()?)
}

/// Returns the process-wide shape.
///
/// # Errors
///
/// Returns `UseBeforeInit` if neither [`initialize`] nor [`initialize_with`]
/// has completed.
pub fn shape() -> Result<&'static ProblemShape> {
    PROBLEM_SHAPE.get().ok_or(ProblemShapeError::UseBeforeInit)
}

fn publish(problem: ProblemShape) -> Result<&'static ProblemShape> {
    let dimensions = problem.num_dimensions();
    let data_spaces = problem.num_data_spaces();
    if PROBLEM_SHAPE.set(problem).is_err() {
        warn!("problem shape initialization attempted twice");
        return Err(ProblemShapeError::AlreadyInitialized);
    }
    info!(dimensions, data_spaces, "problem shape initialized");
    shape()
}
