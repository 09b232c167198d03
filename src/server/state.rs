use crate::location::{MemoryMap, NominatimGeocoder};
use crate::picker::LocationPicker;

/// One picker session shared by every request.
pub struct AppState {
    pub picker: LocationPicker<MemoryMap, NominatimGeocoder>,
}
