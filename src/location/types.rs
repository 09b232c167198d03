//! Core types for the location subsystem.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Address keys tried, in order, for the region field.
const REGION_KEYS: &[&str] = &["state"];

/// Address keys tried, in order, for the municipality field.
const MUNICIPALITY_KEYS: &[&str] = &["suburb", "county"];

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = LocationError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside lat -90..90 / lon -180..180.
    pub fn new(lat: f64, lon: f64) -> Result<Self, LocationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(LocationError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(LocationError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// For compile-time constants known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude as written to the form: fixed 6 decimals.
    pub fn lat_field(&self) -> String {
        format!("{:.6}", self.lat)
    }

    /// Longitude as written to the form: fixed 6 decimals.
    pub fn lon_field(&self) -> String {
        format!("{:.6}", self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

/// Address object of a reverse geocoding response.
///
/// Values are kept as raw JSON; only string values are ever read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(HashMap<String, Value>);

impl Address {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// First non-empty value among `keys`, or `""`.
    fn first_of(&self, keys: &[&str]) -> &str {
        keys.iter().find_map(|k| self.get(k)).unwrap_or("")
    }

    pub fn region(&self) -> &str {
        self.first_of(REGION_KEYS)
    }

    pub fn municipality(&self) -> &str {
        self.first_of(MUNICIPALITY_KEYS)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Address {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// A reverse geocoding response. Everything but `address` is informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeResult {
    /// Anything but a JSON object is treated as no address.
    #[serde(default, deserialize_with = "lenient_address")]
    pub address: Option<Address>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Set by Nominatim when nothing is found (e.g. open sea).
    #[serde(default)]
    pub error: Option<String>,
}

fn lenient_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Some(Address(map.into_iter().collect())),
        _ => None,
    })
}

impl GeocodeResult {
    pub fn with_address(address: Address) -> Self {
        Self {
            address: Some(address),
            ..Self::default()
        }
    }

    pub fn region(&self) -> &str {
        self.address.as_ref().map(Address::region).unwrap_or("")
    }

    pub fn municipality(&self) -> &str {
        self.address.as_ref().map(Address::municipality).unwrap_or("")
    }
}

/// Coordinate validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Invalid latitude {0}: expected -90..90")]
    InvalidLatitude(f64),
    #[error("Invalid longitude {0}: expected -180..180")]
    InvalidLongitude(f64),
}

/// Reverse geocoding errors.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Geocoder returned HTTP {0}")]
    Status(u16),
    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),
}
