//! Problem shape registry for loop-nest analysis.
//!
//! This crate describes the index space of a tensor computation: its
//! iteration dimensions, scalar coefficients, data spaces and the affine
//! projections from iteration-space points into data-space coordinates.
//! Analysis layers (tiling, reuse, buffer sizing) read it; it never calls
//! back into them.
//!
//! ```
//! let shape = problem_shape::ProblemShape::convolution();
//! let inputs = shape.data_space_id("Inputs")?;
//! let coords = shape.project_point(inputs, shape.default_coefficients(), &[3, 3, 1, 1, 0, 0, 0])?;
//! assert_eq!(coords[0], 4);
//! # Ok::<(), problem_shape::ProblemShapeError>(())
//! ```

pub mod error;
pub mod problem;

pub use error::{IdentifierKind, ProblemShapeError, Result};
pub use problem::{
    initialize, initialize_with, shape, AffineExpr, AffineTerm, CoefficientId, Coefficients,
    DataSpaceBox, DataSpaceId, DimensionId, NameTable, OperationSpace, ProblemShape, Projection,
    ShapeSpec,
};
