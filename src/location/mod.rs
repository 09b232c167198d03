//! Location subsystem for the picker.
//!
//! Coordinates, the reverse geocoder, the headless map and the form field
//! handles the picker writes to.

pub mod fields;
pub mod geocoder;
pub mod map;
pub mod types;

pub use fields::{AddressFields, FormField, FormSnapshot, TextField};
pub use geocoder::{NominatimGeocoder, ReverseGeocoder};
pub use map::{MapView, MemoryMap, TileLayer};
pub use types::{Address, Coordinate, GeocodeError, GeocodeResult, LocationError};
