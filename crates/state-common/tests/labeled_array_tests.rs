//! Tests for LabeledArray construction and direction tokens.

use ndarray::{Array, ArrayD, IxDyn};
use state_common::{ArrayError, Direction, LabeledArray, OutDim, State, TokenParseError};

// ============================================================================
// LabeledArray
// ============================================================================

#[test]
fn test_labeled_array_keeps_dimension_order() {
    let array = LabeledArray::new(
        ArrayD::<f64>::zeros(IxDyn(&[2, 3, 4])),
        ["lon", "lat", "mid_levels"],
    )
    .unwrap();
    assert_eq!(array.dims(), &["lon", "lat", "mid_levels"]);
    assert_eq!(array.shape(), &[2, 3, 4]);
    assert_eq!(array.axis_index("lat"), Some(1));
    assert_eq!(array.axis_len("mid_levels"), Some(4));
    assert_eq!(array.axis_len("x"), None);
}

#[test]
fn test_labeled_array_rank_mismatch() {
    let result = LabeledArray::new(ArrayD::<f64>::zeros(IxDyn(&[2, 3])), ["x", "y", "z"]);
    assert!(matches!(
        result,
        Err(ArrayError::RankMismatch { dims: 3, ndim: 2 })
    ));
}

#[test]
fn test_labeled_array_coords_survive_into_owned() {
    let data = Array::from_shape_vec(IxDyn(&[3]), vec![280.0, 281.0, 282.0]).unwrap();
    let array = LabeledArray::new(data.view(), ["lat"])
        .unwrap()
        .with_coord("lat", vec![-45.0, 0.0, 45.0])
        .unwrap()
        .with_units("K");

    let owned = array.into_owned();
    assert_eq!(owned.coord("lat"), Some(&[-45.0, 0.0, 45.0][..]));
    assert_eq!(owned.units(), Some("K"));
}

#[test]
fn test_state_is_ordered_by_name() {
    let mut state: State = State::new();
    state.insert(
        "eastward_wind".to_string(),
        LabeledArray::new(ArrayD::<f64>::zeros(IxDyn(&[2])), ["x"]).unwrap(),
    );
    state.insert(
        "air_pressure".to_string(),
        LabeledArray::new(ArrayD::<f64>::zeros(IxDyn(&[2])), ["x"]).unwrap(),
    );
    let names: Vec<&String> = state.keys().collect();
    assert_eq!(names, vec!["air_pressure", "eastward_wind"]);
}

// ============================================================================
// Direction tokens
// ============================================================================

#[test]
fn test_direction_display_round_trip() {
    for direction in Direction::ALL {
        let parsed: Direction = direction.to_string().parse().unwrap();
        assert_eq!(parsed, direction);
    }
}

#[test]
fn test_direction_list_rejects_wildcard() {
    assert_eq!(
        Direction::parse_list(&["x", "*"]),
        Err(TokenParseError::InvalidToken("*".to_string()))
    );
}

#[test]
fn test_out_dim_accessors() {
    let dims = OutDim::parse_list(&["*", "x", "y"]).unwrap();
    assert!(dims[0].is_wildcard());
    assert_eq!(dims[0].direction(), None);
    assert_eq!(dims[1].direction(), Some(Direction::X));
    assert_eq!(OutDim::from(Direction::Z), OutDim::Axis(Direction::Z));
}
