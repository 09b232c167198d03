//! The location picker: one draggable marker bound to the address form.
//!
//! Every placement (initial, drag end, map click) writes the coordinate to the
//! latitude/longitude fields right away and starts a reverse geocoding lookup
//! in the background. Region and municipality are written when it completes.
//!
//! Lookups are never cancelled and may finish in any order. With
//! [`OrderingPolicy::LastWriteWins`] the last lookup to *finish* owns the
//! address fields, which can leave them describing an older marker position.
//! [`OrderingPolicy::LatestOnly`] drops any result that is not for the most
//! recent placement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PickerConfig;
use crate::location::{
    AddressFields, Coordinate, GeocodeError, GeocodeResult, MapView, ReverseGeocoder, TileLayer,
};

/// How concurrent lookup results are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Every completed lookup writes the address fields.
    #[default]
    LastWriteWins,
    /// Only the lookup for the latest placement writes the address fields.
    LatestOnly,
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastWriteWins => write!(f, "last-write-wins"),
            Self::LatestOnly => write!(f, "latest-only"),
        }
    }
}

/// What a background lookup did to the address fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    Applied,
    /// Lookup failed; fields left as they were.
    Failed,
    /// A newer placement was issued; result discarded.
    Superseded,
}

pub struct LocationPicker<M: MapView, G: ReverseGeocoder> {
    map: Mutex<M>,
    geocoder: Arc<G>,
    fields: AddressFields,
    default_center: Coordinate,
    zoom: u8,
    tile_layer: TileLayer,
    policy: OrderingPolicy,
    /// Ticket of the latest placement. Held while writing address fields.
    sequence: Arc<Mutex<u64>>,
    pending: Arc<AtomicUsize>,
}

impl<M: MapView, G: ReverseGeocoder> LocationPicker<M, G> {
    pub fn new(map: M, geocoder: G, fields: AddressFields, config: &PickerConfig) -> Self {
        Self {
            map: Mutex::new(map),
            geocoder: Arc::new(geocoder),
            fields,
            default_center: config.default_center,
            zoom: config.zoom,
            tile_layer: config.tile_layer.clone(),
            policy: config.ordering,
            sequence: Arc::new(Mutex::new(0)),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    pub fn default_center(&self) -> Coordinate {
        self.default_center
    }

    /// Lookups started but not yet finished.
    pub fn pending_lookups(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn fields(&self) -> &AddressFields {
        &self.fields
    }

    pub fn geocoder(&self) -> Arc<G> {
        Arc::clone(&self.geocoder)
    }

    /// Direct access to the map widget.
    pub fn map(&self) -> MutexGuard<'_, M> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set up the view, tile layer and marker, then fill the form for the
    /// default center. Must be called within a Tokio runtime.
    pub fn init(&self) -> JoinHandle<UpdateOutcome> {
        {
            let mut map = self.map();
            map.set_view(self.default_center, self.zoom);
            map.add_tile_layer(self.tile_layer.clone());
            map.add_marker(self.default_center, true);
        }
        info!(center = %self.default_center, zoom = self.zoom, "location picker initialized");
        self.set_location(self.default_center)
    }

    /// Place the marker at `at`, write the coordinate fields, and start the
    /// address lookup. Returns without waiting for it.
    pub fn set_location(&self, at: Coordinate) -> JoinHandle<UpdateOutcome> {
        let ticket = {
            let mut map = self.map();
            if map.marker_position() != Some(at) {
                map.move_marker(at);
            }
            self.fields.write_coordinate(at);

            let mut seq = lock(&self.sequence);
            *seq += 1;
            *seq
        };
        debug!(%at, ticket, "location set");

        let geocoder = Arc::clone(&self.geocoder);
        let fields = self.fields.clone();
        let sequence = Arc::clone(&self.sequence);
        let pending = Arc::clone(&self.pending);
        let policy = self.policy;

        pending.fetch_add(1, Ordering::SeqCst);
        tokio::task::spawn_blocking(move || {
            let result = geocoder.reverse(at);
            let outcome = apply_lookup(result, at, ticket, policy, &sequence, &fields);
            pending.fetch_sub(1, Ordering::SeqCst);
            outcome
        })
    }

    /// Marker drag finished: use wherever the marker ended up.
    pub fn on_drag_end(&self) -> Option<JoinHandle<UpdateOutcome>> {
        let position = self.map().marker_position()?;
        Some(self.set_location(position))
    }

    pub fn on_map_click(&self, at: Coordinate) -> JoinHandle<UpdateOutcome> {
        self.map().move_marker(at);
        self.set_location(at)
    }
}

fn apply_lookup(
    result: Result<GeocodeResult, GeocodeError>,
    at: Coordinate,
    ticket: u64,
    policy: OrderingPolicy,
    sequence: &Mutex<u64>,
    fields: &AddressFields,
) -> UpdateOutcome {
    let latest = lock(sequence);
    if policy == OrderingPolicy::LatestOnly && *latest != ticket {
        debug!(%at, ticket, latest = *latest, "discarding superseded lookup");
        return UpdateOutcome::Superseded;
    }

    match result {
        Ok(found) => {
            fields.write_address(found.region(), found.municipality());
            debug!(
                %at,
                region = found.region(),
                municipality = found.municipality(),
                "address fields updated"
            );
            UpdateOutcome::Applied
        }
        Err(e) => {
            warn!(%at, error = %e, "reverse geocoding failed");
            UpdateOutcome::Failed
        }
    }
}

fn lock(m: &Mutex<u64>) -> MutexGuard<'_, u64> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
