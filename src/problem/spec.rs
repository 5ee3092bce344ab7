//! Declarative problem shape specifications.
//!
//! A [`ShapeSpec`] is plain data: it can be written out in code, as the
//! built-in convolution shape is, or deserialized by a configuration loader.
//! [`ShapeSpec::build`] checks every structural invariant before freezing the
//! specification into an immutable [`ProblemShape`].

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::{IdentifierKind, ProblemShapeError, Result};
use super::{
    AffineExpr, AffineTerm, Coefficients, CoefficientId, DataSpaceId, DimensionId, NameTable,
    ProblemShape, Projection,
};

/// Name of the reserved data-space slot that follows the real data spaces.
pub const SHARED_DATA_SPACE_NAME: &str = "Shared/Illegal";

/// An iteration-space dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub id: DimensionId,
    pub name: String,
}

/// A named scalar parameter and its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoefficientSpec {
    pub id: CoefficientId,
    pub name: String,
    pub default: i64,
}

/// An operand of the computation.
///
/// `projection[axis]` lists the raw `(coefficient, dimension)` terms of that
/// axis. A coefficient id equal to the number of coefficients means an
/// implicit coefficient of 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSpaceSpec {
    pub id: DataSpaceId,
    pub name: String,
    pub order: usize,
    #[serde(default)]
    pub read_write: bool,
    pub projection: Vec<Vec<(CoefficientId, DimensionId)>>,
}

/// The full declarative description of a problem shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub dimensions: Vec<DimensionSpec>,
    pub coefficients: Vec<CoefficientSpec>,
    pub data_spaces: Vec<DataSpaceSpec>,
    #[serde(default = "default_shared_name")]
    pub shared_data_space: String,
}

fn default_shared_name() -> String {
    SHARED_DATA_SPACE_NAME.to_string()
}

impl ShapeSpec {
    /// The 7-dimensional convolution shape.
    ///
    /// Dimensions: `R S` (filter), `P Q` (output), `C` (input channels),
    /// `K` (output channels), `N` (batch).
    pub fn convolution() -> Self {
        let dimensions = ["R", "S", "P", "Q", "C", "K", "N"]
            .iter()
            .enumerate()
            .map(|(id, name)| DimensionSpec {
                id,
                name: name.to_string(),
            })
            .collect();

        let coefficients = ["Wstride", "Hstride", "Wdilation", "Hdilation"]
            .iter()
            .enumerate()
            .map(|(id, name)| CoefficientSpec {
                id,
                name: name.to_string(),
                default: 1,
            })
            .collect();

        // Implicit coefficient of 1.
        const ONE: CoefficientId = 4;
        const R: DimensionId = 0;
        const S: DimensionId = 1;
        const P: DimensionId = 2;
        const Q: DimensionId = 3;
        const C: DimensionId = 4;
        const K: DimensionId = 5;
        const N: DimensionId = 6;
        let (w_stride, h_stride, w_dilation, h_dilation) = (0, 1, 2, 3);

        let data_spaces = vec![
            DataSpaceSpec {
                id: 0,
                name: "Weights".to_string(),
                order: 4,
                read_write: false,
                projection: vec![vec![(ONE, R)], vec![(ONE, S)], vec![(ONE, C)], vec![(ONE, K)]],
            },
            DataSpaceSpec {
                id: 1,
                name: "Inputs".to_string(),
                order: 4,
                read_write: false,
                projection: vec![
                    vec![(w_dilation, R), (w_stride, P)],
                    vec![(h_dilation, S), (h_stride, Q)],
                    vec![(ONE, C)],
                    vec![(ONE, N)],
                ],
            },
            DataSpaceSpec {
                id: 2,
                name: "Outputs".to_string(),
                order: 4,
                read_write: true,
                projection: vec![vec![(ONE, P)], vec![(ONE, Q)], vec![(ONE, K)], vec![(ONE, N)]],
            },
        ];

        Self {
            dimensions,
            coefficients,
            data_spaces,
            shared_data_space: default_shared_name(),
        }
    }

    /// Validates the specification without building it.
    pub fn validate(&self) -> Result<()> {
        self.clone().build().map(|_| ())
    }

    /// Validates the specification and freezes it into a [`ProblemShape`].
    ///
    /// # Errors
    ///
    /// Returns `MalformedShape` if any id space is not dense and zero-based,
    /// if names are empty or collide, if a data space's order differs from
    /// its projection length, or if a projection term references an unknown
    /// dimension or coefficient.
    pub fn build(self) -> Result<ProblemShape> {
        let ShapeSpec {
            mut dimensions,
            mut coefficients,
            mut data_spaces,
            shared_data_space,
        } = self;

        dimensions.sort_by_key(|d| d.id);
        coefficients.sort_by_key(|c| c.id);
        data_spaces.sort_by_key(|d| d.id);

        check_dense(IdentifierKind::Dimension, dimensions.iter().map(|d| d.id))?;
        check_dense(IdentifierKind::Coefficient, coefficients.iter().map(|c| c.id))?;
        check_dense(IdentifierKind::DataSpace, data_spaces.iter().map(|d| d.id))?;

        let dimension_names = NameTable::new(
            IdentifierKind::Dimension,
            dimensions.into_iter().map(|d| d.name),
        )?;
        let num_dimensions = dimension_names.len();
        let num_coefficients = coefficients.len();

        let default_coefficients =
            Coefficients::new(coefficients.iter().map(|c| c.default).collect());
        let coefficient_names = NameTable::new(
            IdentifierKind::Coefficient,
            coefficients.into_iter().map(|c| c.name),
        )?;

        let mut orders = Vec::with_capacity(data_spaces.len());
        let mut read_write = Vec::with_capacity(data_spaces.len());
        let mut projections = Vec::with_capacity(data_spaces.len());
        let mut names = Vec::with_capacity(data_spaces.len() + 1);

        for space in data_spaces {
            if space.projection.len() != space.order {
                return Err(ProblemShapeError::malformed_shape(format!(
                    "data space '{}' has order {} but {} projection axes",
                    space.name,
                    space.order,
                    space.projection.len()
                )));
            }

            let mut axes = Vec::with_capacity(space.order);
            for (axis, raw_terms) in space.projection.iter().enumerate() {
                let mut terms = Vec::with_capacity(raw_terms.len());
                for &(coefficient, dimension) in raw_terms {
                    if dimension >= num_dimensions {
                        return Err(ProblemShapeError::malformed_shape(format!(
                            "data space '{}' axis {axis} references dimension {dimension}, \
                             but only {num_dimensions} are defined",
                            space.name
                        )));
                    }
                    if coefficient > num_coefficients {
                        return Err(ProblemShapeError::malformed_shape(format!(
                            "data space '{}' axis {axis} references coefficient {coefficient}, \
                             but only {num_coefficients} are defined",
                            space.name
                        )));
                    }
                    terms.push(AffineTerm::from_raw(coefficient, dimension, num_coefficients));
                }
                axes.push(AffineExpr::new(terms));
            }

            orders.push(space.order);
            read_write.push(space.read_write);
            projections.push(Projection::new(axes));
            names.push(space.name);
        }

        let num_data_spaces = names.len();
        names.push(shared_data_space);
        let data_space_names = NameTable::new(IdentifierKind::DataSpace, names)?;

        debug!(
            dimensions = num_dimensions,
            coefficients = num_coefficients,
            data_spaces = num_data_spaces,
            "problem shape validated"
        );

        Ok(ProblemShape {
            dimensions: dimension_names,
            coefficients: coefficient_names,
            default_coefficients,
            data_spaces: data_space_names,
            num_data_spaces,
            orders,
            read_write,
            projections,
        })
    }
}

/// Checks that sorted ids are exactly `0..n`.
fn check_dense(kind: IdentifierKind, ids: impl Iterator<Item = usize>) -> Result<()> {
    for (expected, id) in ids.enumerate() {
        if id != expected {
            return Err(ProblemShapeError::malformed_shape(format!(
                "{kind} ids are not dense: expected id {expected}, found {id}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_malformed(spec: ShapeSpec) {
        match spec.build() {
            Err(ProblemShapeError::MalformedShape(_)) => {}
            other => panic!("expected MalformedShape, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_convolution_is_valid() {
        assert!(ShapeSpec::convolution().validate().is_ok());
    }

    #[test]
    fn test_ids_out_of_order_are_accepted() {
        let mut spec = ShapeSpec::convolution();
        spec.dimensions.reverse();
        spec.data_spaces.swap(0, 2);
        let shape = spec.build().unwrap();
        assert_eq!(shape.dimension_name(0).unwrap(), "R");
        assert_eq!(shape.data_space_name(0).unwrap(), "Weights");
        assert!(shape.is_read_write(2).unwrap());
    }

    #[test]
    fn test_sparse_ids() {
        let mut spec = ShapeSpec::convolution();
        spec.dimensions[6].id = 7;
        expect_malformed(spec);

        let mut spec = ShapeSpec::convolution();
        spec.coefficients[0].id = 1;
        expect_malformed(spec);

        let mut spec = ShapeSpec::convolution();
        spec.data_spaces[2].id = 3;
        expect_malformed(spec);
    }

    #[test]
    fn test_duplicate_ids() {
        let mut spec = ShapeSpec::convolution();
        spec.dimensions[1].id = 0;
        expect_malformed(spec);

        let mut spec = ShapeSpec::convolution();
        spec.data_spaces[1].id = 0;
        expect_malformed(spec);
    }

    #[test]
    fn test_name_collision() {
        let mut spec = ShapeSpec::convolution();
        spec.data_spaces[1].name = "Weights".to_string();
        expect_malformed(spec);

        let mut spec = ShapeSpec::convolution();
        spec.shared_data_space = "Outputs".to_string();
        expect_malformed(spec);
    }

    #[test]
    fn test_order_mismatch() {
        let mut spec = ShapeSpec::convolution();
        spec.data_spaces[0].order = 3;
        expect_malformed(spec);
    }

    #[test]
    fn test_out_of_range_terms() {
        let mut spec = ShapeSpec::convolution();
        spec.data_spaces[0].projection[0] = vec![(4, 7)];
        expect_malformed(spec);

        let mut spec = ShapeSpec::convolution();
        spec.data_spaces[1].projection[0] = vec![(5, 0)];
        expect_malformed(spec);
    }

    #[test]
    fn test_sentinel_decodes_to_unit() {
        let shape = ShapeSpec::convolution().build().unwrap();
        let weights = shape.projection_of(0).unwrap();
        assert_eq!(weights[0].terms(), &[AffineTerm::unit(0)]);
    }
}
