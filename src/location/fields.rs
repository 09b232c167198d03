//! Form field handles written by the picker.

use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

use super::types::Coordinate;

/// Element id of the region (gouvernorat) input.
pub const REGION_ID: &str = "gouvernoratId";
/// Element id of the municipality input.
pub const MUNICIPALITY_ID: &str = "municipaliteId";
pub const LATITUDE_ID: &str = "latitude";
pub const LONGITUDE_ID: &str = "longitude";
/// Element id of the map container.
pub const MAP_ID: &str = "map";

/// A writable form input owned by the host page.
pub trait FormField: Send + Sync {
    fn set_value(&self, value: &str);
    fn value(&self) -> String;
}

/// In-memory text input.
#[derive(Debug, Default)]
pub struct TextField {
    value: RwLock<String>,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            value: RwLock::new(value.to_string()),
        }
    }
}

impl FormField for TextField {
    fn set_value(&self, value: &str) {
        let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.push_str(value);
    }

    fn value(&self) -> String {
        self.value.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// The four inputs the picker fills.
#[derive(Clone)]
pub struct AddressFields {
    pub latitude: Arc<dyn FormField>,
    pub longitude: Arc<dyn FormField>,
    pub region: Arc<dyn FormField>,
    pub municipality: Arc<dyn FormField>,
}

impl AddressFields {
    pub fn new(
        latitude: Arc<dyn FormField>,
        longitude: Arc<dyn FormField>,
        region: Arc<dyn FormField>,
        municipality: Arc<dyn FormField>,
    ) -> Self {
        Self { latitude, longitude, region, municipality }
    }

    /// Four fresh, empty [`TextField`]s.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(TextField::new()),
            Arc::new(TextField::new()),
            Arc::new(TextField::new()),
            Arc::new(TextField::new()),
        )
    }

    pub fn write_coordinate(&self, at: Coordinate) {
        self.latitude.set_value(&at.lat_field());
        self.longitude.set_value(&at.lon_field());
    }

    pub fn write_address(&self, region: &str, municipality: &str) {
        self.region.set_value(region);
        self.municipality.set_value(municipality);
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            region: self.region.value(),
            municipality: self.municipality.value(),
            latitude: self.latitude.value(),
            longitude: self.longitude.value(),
        }
    }
}

/// Current field values, serialized under their element ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    #[serde(rename = "gouvernoratId")]
    pub region: String,
    #[serde(rename = "municipaliteId")]
    pub municipality: String,
    pub latitude: String,
    pub longitude: String,
}

impl FormSnapshot {
    /// Trimmed `(region, municipality)`, or `None` when both are blank.
    ///
    /// This is what an incident submission keys its neighbourhood on; a form
    /// whose lookup never succeeded carries no area at all.
    pub fn administrative_area(&self) -> Option<(String, String)> {
        let region = self.region.trim();
        let municipality = self.municipality.trim();
        if region.is_empty() && municipality.is_empty() {
            return None;
        }
        Some((region.to_string(), municipality.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_overwrite() {
        let f = TextField::with_value("old");
        f.set_value("new");
        assert_eq!(f.value(), "new");
        f.set_value("");
        assert_eq!(f.value(), "");
    }

    #[test]
    fn test_write_coordinate() {
        let fields = AddressFields::in_memory();
        fields.write_coordinate(Coordinate::new(36.8065, 10.1815).unwrap());
        assert_eq!(fields.latitude.value(), "36.806500");
        assert_eq!(fields.longitude.value(), "10.181500");
        assert_eq!(fields.region.value(), "");
    }

    #[test]
    fn test_snapshot_uses_element_ids() {
        let fields = AddressFields::in_memory();
        fields.write_address("Tunis", "Le Bardo");
        let json = serde_json::to_value(fields.snapshot()).unwrap();
        assert_eq!(json[REGION_ID], "Tunis");
        assert_eq!(json[MUNICIPALITY_ID], "Le Bardo");
        assert_eq!(json[LATITUDE_ID], "");
        assert_eq!(json[LONGITUDE_ID], "");
    }

    #[test]
    fn test_administrative_area_blank() {
        let fields = AddressFields::in_memory();
        assert_eq!(fields.snapshot().administrative_area(), None);

        fields.write_address("  ", "\t");
        assert_eq!(fields.snapshot().administrative_area(), None);
    }

    #[test]
    fn test_administrative_area_trims() {
        let fields = AddressFields::in_memory();
        fields.write_address(" Tunis ", "Le Bardo\n");
        assert_eq!(
            fields.snapshot().administrative_area(),
            Some(("Tunis".to_string(), "Le Bardo".to_string()))
        );
    }

    #[test]
    fn test_administrative_area_one_side_only() {
        let fields = AddressFields::in_memory();
        fields.write_address("", "Manouba");
        assert_eq!(
            fields.snapshot().administrative_area(),
            Some((String::new(), "Manouba".to_string()))
        );
    }

    #[test]
    fn test_shared_handles() {
        let region = Arc::new(TextField::new());
        let fields = AddressFields::new(
            Arc::new(TextField::new()),
            Arc::new(TextField::new()),
            region.clone(),
            Arc::new(TextField::new()),
        );
        fields.write_address("Ariana", "");
        assert_eq!(region.value(), "Ariana");
    }
}
