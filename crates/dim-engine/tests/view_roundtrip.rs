//! Round-trip tests for raw views and their restoration.

use dim_engine::{
    combine_dimensions, get_array_view, memory_span, restore_dimensions, Attrs, DimensionError,
    DimensionNames, DimensionRegistry, Direction, LabeledArray,
};
use ndarray::{Array, ArrayD, IxDyn};
use test_utils::{axes, create_labeled_array, sequential_array};

fn model_registry() -> DimensionRegistry {
    DimensionRegistry::with_names(
        &DimensionNames::new()
            .x(axes::X_ALIASES.to_vec())
            .y(axes::Y_ALIASES.to_vec())
            .z(axes::Z_ALIASES.to_vec()),
    )
}

fn round_trip(registry: &DimensionRegistry, array: &LabeledArray<'_, f64>, out_dims: &[&str]) {
    let raw = get_array_view(registry, array, out_dims).unwrap();
    let restored = restore_dimensions(registry, &raw, out_dims, array, Attrs::new()).unwrap();
    assert_eq!(restored.dims(), array.dims(), "dims for {out_dims:?}");
    assert_eq!(restored.values(), array.values(), "values for {out_dims:?}");
    assert!(restored.attrs().is_empty());
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_reverse_transpose() {
    let registry = DimensionRegistry::default();
    let array = create_labeled_array(&[2, 3, 4], &["x", "y", "z"], "K");
    let raw = get_array_view(&registry, &array, &["z", "y", "x"]).unwrap();

    assert_eq!(raw.shape(), &[4, 3, 2]);
    let expected = array.values().view().reversed_axes();
    assert_eq!(raw.view(), expected);
    assert_eq!(memory_span(&raw), memory_span(array.values()));
}

#[test]
fn test_synthetic_singleton_axis() {
    let registry = DimensionRegistry::default();
    let array = create_labeled_array(&[2], &["x"], "K");
    let raw = get_array_view(&registry, &array, &["x", "y"]).unwrap();

    assert_eq!(raw.shape(), &[2, 1]);
    assert_eq!(raw[[0, 0]], 0.0);
    assert_eq!(raw[[1, 0]], 1.0);
    assert!(raw.is_view());
}

#[test]
fn test_scalar_with_no_out_dims() {
    let registry = DimensionRegistry::default();
    let scalar = ArrayD::from_elem(IxDyn(&[]), 3.5);
    let array = LabeledArray::new(scalar, Vec::<String>::new()).unwrap();
    let raw = get_array_view::<_, &str>(&registry, &array, &[]).unwrap();
    assert_eq!(raw.ndim(), 0);
    assert_eq!(raw.iter().next(), Some(&3.5));
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_every_ordering() {
    let registry = model_registry();
    let array = create_labeled_array(&[2, 3, 4], &axes::LON_LAT_MID, "K");
    let orderings: [&[&str]; 10] = [
        &["x", "y", "z"],
        &["z", "y", "x"],
        &["y", "x", "z"],
        &["x", "z", "y"],
        &["*", "z"],
        &["z", "*"],
        &["x", "*"],
        &["*"],
        &["x", "y", "z", "*"],
        &["*", "x", "y", "z"],
    ];
    for out_dims in orderings {
        round_trip(&registry, &array, out_dims);
    }
}

#[test]
fn test_round_trip_with_unclassified_axis() {
    let registry = model_registry();
    let array = create_labeled_array(&[2, 5, 3], &["lat", axes::TRACER, "mid_levels"], "kg/kg");
    round_trip(&registry, &array, &["*", "z"]);
    round_trip(&registry, &array, &["z", "*", "y", "x"]);
}

#[test]
fn test_round_trip_preserves_coords() {
    let registry = model_registry();
    let array = create_labeled_array(&[3, 2], &["lat", "lon"], "K")
        .with_coord("lat", vec![-60.0, 0.0, 60.0])
        .unwrap()
        .with_coord("lon", vec![0.0, 180.0])
        .unwrap();
    let raw = get_array_view(&registry, &array, &["x", "y"]).unwrap();
    let restored = restore_dimensions(&registry, &raw, &["x", "y"], &array, Attrs::new()).unwrap();
    assert_eq!(restored.coords(), array.coords());
}

#[test]
fn test_empty_array_round_trip() {
    let registry = DimensionRegistry::default();
    let empty = ArrayD::<f64>::zeros(IxDyn(&[0, 3, 2]));
    let array = LabeledArray::new(empty, ["a", "b", "z"]).unwrap();
    let raw = get_array_view(&registry, &array, &["z", "*"]).unwrap();
    assert_eq!(raw.shape(), &[2, 0]);
    let restored = restore_dimensions(&registry, &raw, &["z", "*"], &array, Attrs::new()).unwrap();
    assert_eq!(restored.shape(), &[0, 3, 2]);
}

// ============================================================================
// Zero copy
// ============================================================================

#[test]
fn test_reordering_never_copies() {
    let registry = model_registry();
    let array = create_labeled_array(&[2, 3, 4], &axes::MID_LAT_LON, "K");
    for out_dims in [&["x", "y", "z"][..], &["z", "x", "y"], &["y", "z", "x"], &["x", "z", "y"]] {
        let raw = get_array_view(&registry, &array, out_dims).unwrap();
        assert!(raw.is_view());
        assert_eq!(memory_span(&raw), memory_span(array.values()));
    }
}

#[test]
fn test_padding_never_copies() {
    let registry = model_registry();
    let array = create_labeled_array(&[3, 4], &["lat", "lon"], "K");
    let raw = get_array_view(&registry, &array, &["z", "x", "y"]).unwrap();
    assert!(raw.is_view());
    assert_eq!(raw.shape(), &[1, 4, 3]);
    assert_eq!(memory_span(&raw), memory_span(array.values()));
}

#[test]
fn test_restore_of_view_shares_template_memory() {
    let registry = model_registry();
    let array = create_labeled_array(&[2, 3, 4], &axes::LON_LAT_MID, "K");
    let raw = get_array_view(&registry, &array, &["z", "y", "x"]).unwrap();
    let restored =
        restore_dimensions(&registry, &raw, &["z", "y", "x"], &array, Attrs::new()).unwrap();
    assert!(restored.is_view());
    assert_eq!(memory_span(restored.values()), memory_span(array.values()));
}

#[test]
fn test_leading_wildcard_on_vertical_last_is_view() {
    let registry = model_registry();
    let array = create_labeled_array(&[2, 3, 4], &axes::LON_LAT_MID, "K");
    let raw = get_array_view(&registry, &array, &["*", "z"]).unwrap();
    assert!(raw.is_view());
    assert_eq!(raw.shape(), &[6, 4]);
}

// ============================================================================
// Wildcard
// ============================================================================

#[test]
fn test_wildcard_keeps_declared_order() {
    let registry = model_registry();
    let data = sequential_array(&[3, 2, 4]);
    let array = LabeledArray::new(data.view(), ["lat", "mid_levels", "lon"]).unwrap();
    let raw = get_array_view(&registry, &array, &["z", "*"]).unwrap();

    assert_eq!(raw.shape(), &[2, 12]);
    // wildcard index = lat * 4 + lon
    for lat in 0..3 {
        for z in 0..2 {
            for lon in 0..4 {
                assert_eq!(raw[[z, lat * 4 + lon]], data[[lat, z, lon]]);
            }
        }
    }
}

#[test]
fn test_wildcard_inverse() {
    let registry = model_registry();
    let data = Array::from_shape_fn(IxDyn(&[3, 2, 4, 2]), |ix| {
        (ix[0] * 1000 + ix[1] * 100 + ix[2] * 10 + ix[3]) as f64
    });
    let array = LabeledArray::new(data, ["lat", "interface_levels", "lon", "tracer"]).unwrap();
    round_trip(&registry, &array, &["*", "z"]);
    round_trip(&registry, &array, &["z", "*"]);
}

#[test]
fn test_empty_wildcard_is_length_one() {
    let registry = model_registry();
    let array = create_labeled_array(&[4], &["mid_levels"], "K");
    let raw = get_array_view(&registry, &array, &["*", "z"]).unwrap();
    assert_eq!(raw.shape(), &[1, 4]);
    round_trip(&registry, &array, &["*", "z"]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_builder_detects_ambiguous_axis() {
    let registry = model_registry();
    let array = create_labeled_array(&[2, 3], &["mid_levels", "interface_levels"], "K");
    let err = get_array_view(&registry, &array, &["z", "*"]).unwrap_err();
    match err {
        DimensionError::AmbiguousAxis { direction, candidates } => {
            assert_eq!(direction, Direction::Z);
            assert_eq!(candidates, vec!["mid_levels", "interface_levels"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_resolver_detects_ambiguous_axis() {
    let registry = model_registry();
    let a = create_labeled_array(&[2], &["lon"], "K");
    let b = create_labeled_array(&[2], &["longitude"], "K");
    assert!(matches!(
        combine_dimensions(&registry, &[&a, &b], &["x"]),
        Err(DimensionError::AmbiguousAxis { direction: Direction::X, .. })
    ));
}

#[test]
fn test_excluded_dimension_is_configuration_error() {
    let registry = model_registry();
    let array = create_labeled_array(&[2, 3], &["lon", "lat"], "K");
    assert!(matches!(
        get_array_view(&registry, &array, &["x"]),
        Err(DimensionError::Configuration(_))
    ));
    assert!(matches!(
        get_array_view(&registry, &array, &["x", "y", "lev"]),
        Err(DimensionError::Configuration(_))
    ));
    assert!(matches!(
        get_array_view(&registry, &array, &["*", "x", "*"]),
        Err(DimensionError::Configuration(_))
    ));
}
