//! Integration tests for the problem shape registry.

use problem_shape::{
    problem::{AffineTerm, ShapeSpec, SHARED_DATA_SPACE_NAME},
    IdentifierKind, OperationSpace, ProblemShape, ProblemShapeError,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn test_name_round_trips() {
    let shape = ProblemShape::convolution();

    for id in 0..shape.num_dimensions() {
        let name = shape.dimension_name(id).unwrap();
        assert_eq!(shape.dimension_id(name).unwrap(), id);
    }
    for id in 0..shape.num_coefficients() {
        let name = shape.coefficient_name(id).unwrap();
        assert_eq!(shape.coefficient_id(name).unwrap(), id);
    }
    for id in 0..shape.num_data_spaces() {
        let name = shape.data_space_name(id).unwrap();
        assert_eq!(shape.data_space_id(name).unwrap(), id);
    }

    for name in ["R", "S", "P", "Q", "C", "K", "N"] {
        let id = shape.dimension_id(name).unwrap();
        assert_eq!(shape.dimension_name(id).unwrap(), name);
    }
}

#[test]
fn test_unknown_identifiers() {
    let shape = ProblemShape::convolution();
    assert_eq!(
        shape.dimension_name(7).unwrap_err(),
        ProblemShapeError::unknown_identifier(IdentifierKind::Dimension, 7)
    );
    assert!(shape.dimension_id("X").is_err());
    assert!(shape.coefficient_name(4).is_err());
    assert!(shape.coefficient_id("stride").is_err());
    assert!(shape.data_space_name(4).is_err());
    assert!(shape.data_space_id("Bias").is_err());
    assert!(shape.is_read_write(5).is_err());
    assert!(shape.projection_of(5).is_err());
}

#[test]
fn test_projection_invariants() {
    let shape = ProblemShape::convolution();
    assert_eq!(shape.projections().len(), shape.num_data_spaces());

    for d in 0..shape.num_data_spaces() {
        let projection = shape.projection_of(d).unwrap();
        assert_eq!(projection.order(), shape.data_space_order(d).unwrap());
        for axis in projection.iter() {
            for term in axis.terms() {
                let (c, dim) = term.raw(shape.num_coefficients());
                assert!(dim < shape.num_dimensions());
                assert!(c <= shape.num_coefficients());
            }
        }
    }
}

#[test]
fn test_read_write_is_stable() {
    let shape = ProblemShape::convolution();
    let first: Vec<bool> = (0..shape.num_data_spaces())
        .map(|d| shape.is_read_write(d).unwrap())
        .collect();
    for _ in 0..3 {
        let again: Vec<bool> = (0..shape.num_data_spaces())
            .map(|d| shape.is_read_write(d).unwrap())
            .collect();
        assert_eq!(first, again);
    }
    assert_eq!(first, vec![false, false, true]);
}

#[test]
fn test_default_coefficients() {
    let shape = ProblemShape::convolution();
    let defaults = shape.default_coefficients();
    assert_eq!(defaults.len(), shape.num_coefficients());
    for (id, value) in defaults.iter() {
        assert!(shape.coefficient_name(id).is_ok());
        assert_eq!(value, 1);
    }
}

#[test]
fn test_convolution_layout() {
    let shape = ProblemShape::convolution();
    let names: Vec<&str> = shape.dimensions().iter().map(|(_, name)| name).collect();
    assert_eq!(names, vec!["R", "S", "P", "Q", "C", "K", "N"]);
    let names: Vec<&str> = shape.coefficients().iter().map(|(_, name)| name).collect();
    assert_eq!(names, vec!["Wstride", "Hstride", "Wdilation", "Hdilation"]);
    let names: Vec<&str> = shape.data_spaces().iter().map(|(_, name)| name).collect();
    assert_eq!(names, vec!["Weights", "Inputs", "Outputs", SHARED_DATA_SPACE_NAME]);

    let weights = shape.projection_of(0).unwrap();
    let expected = [0, 1, 4, 5];
    assert_eq!(weights.order(), 4);
    for (axis, &dim) in weights.iter().zip(&expected) {
        assert_eq!(axis.terms(), &[AffineTerm::unit(dim)]);
    }

    let inputs = shape.projection_of(1).unwrap();
    assert_eq!(inputs.order(), 4);
    // Wdilation*R + Wstride*P
    assert_eq!(
        inputs[0].terms(),
        &[AffineTerm::scaled(2, 0), AffineTerm::scaled(0, 2)]
    );
    // Hdilation*S + Hstride*Q
    assert_eq!(
        inputs[1].terms(),
        &[AffineTerm::scaled(3, 1), AffineTerm::scaled(1, 3)]
    );
    assert_eq!(inputs[2].terms(), &[AffineTerm::unit(4)]);
    assert_eq!(inputs[3].terms(), &[AffineTerm::unit(6)]);

    let outputs = shape.projection_of(2).unwrap();
    let expected = [2, 3, 5, 6];
    assert_eq!(outputs.order(), 4);
    for (axis, &dim) in outputs.iter().zip(&expected) {
        assert_eq!(axis.terms(), &[AffineTerm::unit(dim)]);
    }
}

#[test]
fn test_inputs_axis_evaluation() {
    let shape = ProblemShape::convolution();
    let point = [3, 3, 1, 1, 0, 0, 0];
    let inputs = shape.projection_of(1).unwrap();
    let x = inputs[0]
        .evaluate(shape.default_coefficients().as_slice(), &point)
        .unwrap();
    assert_eq!(x, 4);
}

#[test]
fn test_random_points_match_convolution_formula() {
    let shape = ProblemShape::convolution();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let w_stride = rng.gen_range(1..4);
        let h_stride = rng.gen_range(1..4);
        let w_dilation = rng.gen_range(1..4);
        let h_dilation = rng.gen_range(1..4);
        let coefficients = shape
            .coefficients_with(&[
                ("Wstride", w_stride),
                ("Hstride", h_stride),
                ("Wdilation", w_dilation),
                ("Hdilation", h_dilation),
            ])
            .unwrap();

        let point: Vec<i64> = (0..shape.num_dimensions())
            .map(|_| rng.gen_range(0..32))
            .collect();
        let (r, s, p, q, c, k, n) = (
            point[0], point[1], point[2], point[3], point[4], point[5], point[6],
        );

        assert_eq!(
            shape.project_point(0, &coefficients, &point).unwrap(),
            vec![r, s, c, k]
        );
        assert_eq!(
            shape.project_point(1, &coefficients, &point).unwrap(),
            vec![w_dilation * r + w_stride * p, h_dilation * s + h_stride * q, c, n]
        );
        assert_eq!(
            shape.project_point(2, &coefficients, &point).unwrap(),
            vec![p, q, k, n]
        );

        let space = OperationSpace::new(&shape, &coefficients, &point, &point).unwrap();
        for (d, bounds) in space.iter() {
            let coords = shape.project_point(d, &coefficients, &point).unwrap();
            assert!(bounds.contains(&coords));
            assert_eq!(bounds.volume().unwrap(), 1);
        }
    }
}

#[test]
fn test_spec_serde_round_trip() {
    let spec = ShapeSpec::convolution();
    let json = serde_json::to_string(&spec).unwrap();
    let decoded: ShapeSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, spec);
    assert_eq!(decoded.build().unwrap(), ProblemShape::convolution());
}

#[test]
fn test_matmul_spec_from_json() {
    let json = r#"{
        "dimensions": [
            { "id": 0, "name": "M" },
            { "id": 1, "name": "N" },
            { "id": 2, "name": "K" }
        ],
        "coefficients": [],
        "data_spaces": [
            { "id": 0, "name": "A", "order": 2, "projection": [[[0, 0]], [[0, 2]]] },
            { "id": 1, "name": "B", "order": 2, "projection": [[[0, 2]], [[0, 1]]] },
            { "id": 2, "name": "Z", "order": 2, "read_write": true,
              "projection": [[[0, 0]], [[0, 1]]] }
        ]
    }"#;
    let spec: ShapeSpec = serde_json::from_str(json).unwrap();
    let shape = spec.build().unwrap();

    assert_eq!(shape.num_dimensions(), 3);
    assert_eq!(shape.num_coefficients(), 0);
    assert_eq!(shape.data_space_name(3).unwrap(), SHARED_DATA_SPACE_NAME);
    assert!(shape.is_read_write(2).unwrap());
    assert!(!shape.is_read_write(0).unwrap());

    let coords = shape
        .project_point(1, shape.default_coefficients(), &[4, 5, 6])
        .unwrap();
    assert_eq!(coords, vec![6, 5]);
}

#[test]
fn test_malformed_json_spec() {
    let json = r#"{
        "dimensions": [{ "id": 0, "name": "M" }],
        "coefficients": [],
        "data_spaces": [
            { "id": 0, "name": "A", "order": 1, "projection": [[[0, 1]]] }
        ]
    }"#;
    let spec: ShapeSpec = serde_json::from_str(json).unwrap();
    assert!(matches!(
        spec.build(),
        Err(ProblemShapeError::MalformedShape(_))
    ));
}
