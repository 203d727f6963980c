//! Common test fixtures for model-state tests.
//!
//! This module provides pre-defined axis names, quantities and units that
//! represent common atmospheric model layouts.

/// Axis names used by common model grids.
pub mod axes {
    /// Longitude-style names for the x direction.
    pub const X_ALIASES: &[&str] = &["lon", "longitude"];

    /// Latitude-style names for the y direction.
    pub const Y_ALIASES: &[&str] = &["lat", "latitude"];

    /// Vertical level names for the z direction.
    pub const Z_ALIASES: &[&str] = &["mid_levels", "interface_levels"];

    /// A typical 3D layout, x fastest-varying last.
    pub const LON_LAT_MID: [&str; 3] = ["lon", "lat", "mid_levels"];

    /// Column-major style layout, vertical first.
    pub const MID_LAT_LON: [&str; 3] = ["mid_levels", "lat", "lon"];

    /// Axis not belonging to any direction.
    pub const TRACER: &str = "tracer";
}

/// Common shapes.
pub mod shapes {
    /// Small 3D grid with distinct axis lengths.
    pub const SMALL_3D: [usize; 3] = [2, 3, 4];

    /// 3D grid with vertical interfaces one longer than mid levels.
    pub const INTERFACES_3D: [usize; 3] = [2, 3, 5];
}

/// Quantity names.
pub mod quantities {
    pub const AIR_TEMPERATURE: &str = "air_temperature";
    pub const AIR_PRESSURE: &str = "air_pressure";
    pub const AIR_PRESSURE_ON_INTERFACES: &str = "air_pressure_on_interface_levels";
    pub const EASTWARD_WIND: &str = "eastward_wind";
    pub const SURFACE_PRESSURE: &str = "surface_air_pressure";
    pub const SPECIFIC_HUMIDITY: &str = "specific_humidity";
}

/// Unit strings.
pub mod units {
    pub const KELVIN: &str = "degK";
    pub const CELSIUS: &str = "degC";
    pub const PASCAL: &str = "Pa";
    pub const HECTOPASCAL: &str = "hPa";
    pub const METERS_PER_SECOND: &str = "m/s";
    pub const KG_PER_KG: &str = "kg/kg";
}

/// YAML snippets for configuration tests.
pub mod yaml {
    /// Engine configuration registering longitude/latitude/level aliases.
    pub const ENGINE_CONFIG: &str = "\
dimension_names:
  x: [lon, longitude]
  y: [lat, latitude]
  z: [mid_levels, interface_levels]
units:
  - { name: dam, kind: length, scale: 10.0 }
";

    /// Input properties for temperature and pressure.
    pub const INPUT_PROPERTIES: &str = "\
air_temperature:
  dims: ['*', z]
  units: degC
air_pressure:
  dims: ['*', z]
  units: hPa
  match_dims_like: air_temperature
";

    /// Output properties restoring a heating rate like air temperature.
    pub const OUTPUT_PROPERTIES: &str = "\
air_temperature_tendency:
  dims: ['*', z]
  units: K/s
  dims_like: air_temperature
";
}
