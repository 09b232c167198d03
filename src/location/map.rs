//! Map widget abstraction and a headless implementation.

use serde::{Deserialize, Serialize};

use super::fields::MAP_ID;
use super::types::Coordinate;

/// Tile source for rendering the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl TileLayer {
    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            attribution: "&copy; OpenStreetMap contributors".into(),
        }
    }
}

impl Default for TileLayer {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

/// The operations the picker needs from a map widget.
pub trait MapView: Send {
    fn set_view(&mut self, center: Coordinate, zoom: u8);
    fn add_tile_layer(&mut self, layer: TileLayer);
    fn add_marker(&mut self, at: Coordinate, draggable: bool);
    fn marker_position(&self) -> Option<Coordinate>;
    fn move_marker(&mut self, to: Coordinate);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub draggable: bool,
}

/// A map that only records its state. Used by the CLI, the HTTP surface and tests.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryMap {
    pub container: String,
    pub center: Option<Coordinate>,
    pub zoom: Option<u8>,
    pub tile_layers: Vec<TileLayer>,
    pub marker: Option<Marker>,
    #[serde(skip)]
    pub marker_moves: usize,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::with_container(MAP_ID)
    }

    pub fn with_container(container: &str) -> Self {
        Self {
            container: container.to_string(),
            center: None,
            zoom: None,
            tile_layers: Vec::new(),
            marker: None,
            marker_moves: 0,
        }
    }

    /// Simulate the user dragging the marker. Draggable markers only;
    /// the drag-end notification is the caller's job.
    pub fn drag_marker_to(&mut self, to: Coordinate) -> bool {
        match self.marker.as_mut() {
            Some(m) if m.draggable => {
                m.position = to;
                true
            }
            _ => false,
        }
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView for MemoryMap {
    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.center = Some(center);
        self.zoom = Some(zoom);
    }

    fn add_tile_layer(&mut self, layer: TileLayer) {
        self.tile_layers.push(layer);
    }

    fn add_marker(&mut self, at: Coordinate, draggable: bool) {
        self.marker = Some(Marker { position: at, draggable });
    }

    fn marker_position(&self) -> Option<Coordinate> {
        self.marker.map(|m| m.position)
    }

    fn move_marker(&mut self, to: Coordinate) {
        match self.marker.as_mut() {
            Some(m) => m.position = to,
            None => self.marker = Some(Marker { position: to, draggable: true }),
        }
        self.marker_moves += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_default_tile_layer() {
        let layer = TileLayer::default();
        assert!(layer.url_template.contains("{z}/{x}/{y}"));
        assert!(layer.attribution.contains("OpenStreetMap"));
    }

    #[test]
    fn test_memory_map_records_view() {
        let mut map = MemoryMap::new();
        assert_eq!(map.container, "map");
        map.set_view(coord(36.8065, 10.1815), 13);
        map.add_tile_layer(TileLayer::openstreetmap());
        assert_eq!(map.center, Some(coord(36.8065, 10.1815)));
        assert_eq!(map.zoom, Some(13));
        assert_eq!(map.tile_layers.len(), 1);
        assert!(map.marker_position().is_none());
    }

    #[test]
    fn test_drag_requires_draggable_marker() {
        let mut map = MemoryMap::new();
        assert!(!map.drag_marker_to(coord(1.0, 1.0)));

        map.add_marker(coord(0.0, 0.0), false);
        assert!(!map.drag_marker_to(coord(1.0, 1.0)));
        assert_eq!(map.marker_position(), Some(coord(0.0, 0.0)));

        map.add_marker(coord(0.0, 0.0), true);
        assert!(map.drag_marker_to(coord(1.0, 1.0)));
        assert_eq!(map.marker_position(), Some(coord(1.0, 1.0)));
        assert_eq!(map.marker_moves, 0);
    }

    #[test]
    fn test_move_marker_counts() {
        let mut map = MemoryMap::new();
        map.add_marker(coord(0.0, 0.0), true);
        map.move_marker(coord(2.0, 3.0));
        assert_eq!(map.marker_position(), Some(coord(2.0, 3.0)));
        assert_eq!(map.marker_moves, 1);
    }
}
