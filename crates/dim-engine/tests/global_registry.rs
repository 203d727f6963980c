//! Tests for the process-wide registry.
//!
//! Tests in this file share the global registry, so each one holds `LOCK`
//! and resets the registry before running.

use std::sync::{Mutex, MutexGuard};

use dim_engine::{
    global, Attrs, DimensionNames, DimensionRegistry, Direction, PropertyMap, PropertySpec,
};
use test_utils::{assert_approx_eq, create_labeled_array, create_test_state, QuantitySpec};

static LOCK: Mutex<()> = Mutex::new(());

fn isolated() -> MutexGuard<'static, ()> {
    let guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    global::reset_dimension_names();
    guard
}

#[test]
fn test_default_global_registry() {
    let _guard = isolated();
    assert_eq!(global::snapshot(), DimensionRegistry::default());
}

#[test]
fn test_set_and_reset() {
    let _guard = isolated();
    global::set_dimension_names(&DimensionNames::new().x("lon").z(vec!["lev"]));
    let registry = global::snapshot();
    assert_eq!(registry.aliases(Direction::X), &["x", "lon"]);
    assert_eq!(registry.aliases(Direction::Z), &["z", "lev"]);

    global::reset_dimension_names();
    assert_eq!(global::snapshot().aliases(Direction::X), &["x"]);
}

#[test]
fn test_free_functions_use_global_aliases() {
    let _guard = isolated();
    global::set_dimension_names(&DimensionNames::new().x("lon").y("lat"));
    let array = create_labeled_array(&[4, 3], &["lat", "lon"], "K");

    assert_eq!(global::combine_dimensions(&[&array], &["x", "y"]).unwrap(), vec!["lon", "lat"]);

    let raw = global::get_array_view(&array, &["x", "y"]).unwrap();
    assert_eq!(raw.shape(), &[3, 4]);

    let restored = global::restore_dimensions(&raw, &["x", "y"], &array, Attrs::new()).unwrap();
    assert_eq!(restored.values(), array.values());
}

#[test]
fn test_global_batch_uses_builtin_units() {
    let _guard = isolated();
    global::set_dimension_names(&DimensionNames::new().z("mid_levels"));
    let state = create_test_state(&[QuantitySpec {
        name: "air_pressure",
        dims: &["mid_levels"],
        shape: &[3],
        units: "Pa",
    }]);
    let mut properties = PropertyMap::new();
    properties.insert("air_pressure".to_string(), PropertySpec::new(&["z"], "hPa").unwrap());

    let arrays = global::get_arrays_with_properties(&state, &properties).unwrap();
    assert_approx_eq!(arrays["air_pressure"][[2]], 0.02, 1e-15);
}

#[test]
fn test_reset_isolates_tests() {
    let _guard = isolated();
    let array = create_labeled_array(&[2], &["lon"], "K");
    // "lon" is unknown to the default registry, so it cannot be placed on x
    assert!(global::get_array_view(&array, &["x"]).is_err());
}
