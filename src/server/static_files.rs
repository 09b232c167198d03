//! Browser page for the picker: a Leaflet map plus the four address inputs.
//!
//! The page keeps no state of its own. It renders `/api/picker` and sends
//! clicks and drag ends back to the server, polling while lookups are pending.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Location picker</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <link rel="stylesheet" href="/style.css">
</head>
<body>
  <main>
    <div id="map"></div>
    <form id="location-form" autocomplete="off">
      <label>Gouvernorat <input type="text" id="gouvernoratId" name="gouvernorat" readonly></label>
      <label>Municipalit&eacute; <input type="text" id="municipaliteId" name="municipalite" readonly></label>
      <label>Latitude <input type="text" id="latitude" name="latitude" readonly></label>
      <label>Longitude <input type="text" id="longitude" name="longitude" readonly></label>
      <p id="status" aria-live="polite"></p>
    </form>
  </main>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="/app.js"></script>
</body>
</html>
"#;

pub const STYLE_CSS: &str = r#"* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; background: #f4f5f7; color: #1d2230; }
main { display: grid; grid-template-columns: 1fr 320px; gap: 1rem; padding: 1rem; height: 100vh; }
#map { height: 100%; min-height: 400px; border-radius: 8px; }
form { display: flex; flex-direction: column; gap: 0.75rem; }
label { display: flex; flex-direction: column; font-size: 0.85rem; gap: 0.25rem; }
input { padding: 0.5rem; border: 1px solid #c8ccd6; border-radius: 4px; background: #fff; }
#status { font-size: 0.8rem; color: #6b7180; min-height: 1em; }
@media (max-width: 720px) {
  main { grid-template-columns: 1fr; height: auto; }
  #map { height: 60vh; }
}
"#;

pub const APP_JS: &str = r#"(function () {
  'use strict';

  var FIELD_IDS = ['gouvernoratId', 'municipaliteId', 'latitude', 'longitude'];
  var POLL_MS = 400;
  var map = null;
  var marker = null;
  var pollTimer = null;

  function setStatus(text) {
    document.getElementById('status').textContent = text;
  }

  function render(snapshot) {
    FIELD_IDS.forEach(function (id) {
      document.getElementById(id).value = snapshot.fields[id] || '';
    });
    var pos = snapshot.map.marker && snapshot.map.marker.position;
    if (marker && pos) {
      marker.setLatLng([pos.lat, pos.lon]);
    }
    if (snapshot.pending_lookups > 0) {
      setStatus('Recherche de l\'adresse…');
      schedulePoll();
    } else {
      setStatus('');
    }
  }

  function schedulePoll() {
    if (pollTimer) return;
    pollTimer = setTimeout(function () {
      pollTimer = null;
      fetchSnapshot().then(render).catch(showError);
    }, POLL_MS);
  }

  function showError(err) {
    console.error('picker error:', err);
    setStatus(err.message || String(err));
  }

  function fetchSnapshot() {
    return fetch('/api/picker').then(parse);
  }

  function parse(res) {
    return res.json().then(function (body) {
      if (!res.ok) throw new Error(body.error || ('HTTP ' + res.status));
      return body;
    });
  }

  function place(kind, latlng) {
    return fetch('/api/picker/' + kind, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ lat: latlng.lat, lon: latlng.lng })
    }).then(parse).then(render).catch(showError);
  }

  function init(snapshot) {
    var center = snapshot.map.center;
    map = L.map(snapshot.map.container).setView([center.lat, center.lon], snapshot.map.zoom);
    snapshot.map.tile_layers.forEach(function (layer) {
      L.tileLayer(layer.url_template, { attribution: layer.attribution }).addTo(map);
    });

    var pos = snapshot.map.marker ? snapshot.map.marker.position : center;
    var draggable = snapshot.map.marker ? snapshot.map.marker.draggable : true;
    marker = L.marker([pos.lat, pos.lon], { draggable: draggable }).addTo(map);

    marker.on('dragend', function () {
      place('drag', marker.getLatLng());
    });
    map.on('click', function (e) {
      marker.setLatLng(e.latlng);
      place('click', e.latlng);
    });

    render(snapshot);
  }

  document.addEventListener('DOMContentLoaded', function () {
    fetchSnapshot().then(init).catch(showError);
  });
})();
"#;
