//! Dimension resolution and raw array views for labeled model state.
//!
//! Components of a simulation label their arrays with free-form axis names
//! (`lon`, `lat`, `mid_levels`, ...). This crate maps those names onto the
//! canonical directions `x`, `y` and `z` and hands components raw arrays in
//! the axis order they ask for:
//!
//! - **Registry**: which axis names count as which direction
//! - **Views**: permuted, padded and flattened views, copied only when the
//!   strides leave no other choice
//! - **Restoration**: the inverse, back to the template's labeled axes
//! - **Batches**: whole states at once, with unit conversion
//!
//! # Architecture
//!
//! ```text
//! State + PropertyMap
//!      │
//!      ▼
//! get_arrays_with_properties
//!      │
//!      ├─► convert units (new buffer, source untouched)
//!      │
//!      └─► ViewPlan::apply_view ──► raw arrays ──► component
//!                                                      │
//!                                                      ▼
//! restore_arrays_with_properties ◄── raw results ◄─────┘
//!      │
//!      └─► ViewPlan::unflatten ──► LabeledArray (template dims/coords)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dim_engine::{get_array_view, DimensionNames, DimensionRegistry};
//!
//! let registry = DimensionRegistry::with_names(&DimensionNames::new().x("lon").z("lev"));
//!
//! // [lon, lat, lev] -> [lon * lat, lev]
//! let raw = get_array_view(&registry, &temperature, &["*", "z"])?;
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod global;
pub mod properties;
pub mod registry;
pub mod resolve;
pub mod restore;
pub mod units;
pub mod view;

// Re-export commonly used types at crate root
pub use batch::{
    ensure_no_shared_keys, get_arrays_with_properties, initialize_arrays_with_properties,
    property_plan, restore_arrays_with_properties,
};
pub use config::{load_input_properties, load_output_properties, ConfigError, EngineConfig};
pub use error::{DimensionError, ErrorKind, Result, StateMismatch};
pub use properties::{
    OutputPropertyMap, OutputPropertySpec, PropertyMap, PropertySpec, RawPropertySpec,
};
pub use registry::{AliasNames, DimensionNames, DimensionRegistry};
pub use resolve::combine_dimensions;
pub use restore::restore_dimensions;
pub use units::{
    convert_array, LinearTransform, UnitConverter, UnitDefinition, UnitError, UnitTable,
};
pub use view::{get_array_view, memory_span, ViewPlan};

pub use state_common::{Attrs, Direction, LabeledArray, OutDim, State};
