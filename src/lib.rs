//! Location picker: a draggable map marker bound to latitude/longitude and
//! administrative address fields, filled through reverse geocoding.

pub mod config;
pub mod location;
pub mod picker;
pub mod server;

pub use config::PickerConfig;
pub use picker::{LocationPicker, OrderingPolicy, UpdateOutcome};
