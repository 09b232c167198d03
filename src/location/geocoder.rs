//! Reverse geocoding providers.

use std::time::Duration;

use super::types::{Coordinate, GeocodeError, GeocodeResult};
use crate::config::GeocoderConfig;

/// Resolves a coordinate to an address. Implementations may block.
pub trait ReverseGeocoder: Send + Sync + 'static {
    fn reverse(&self, at: Coordinate) -> Result<GeocodeResult, GeocodeError>;
}

// ─── Nominatim provider ─────────────────────────────────────────

/// OpenStreetMap Nominatim (or any server speaking its `/reverse` API).
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    endpoint: String,
    user_agent: String,
    timeout: Option<Duration>,
}

impl NominatimGeocoder {
    pub fn new(endpoint: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &GeocoderConfig) -> Self {
        let mut geocoder = Self::new(config.endpoint.as_str(), config.user_agent.as_str());
        geocoder.timeout = config.timeout_secs.map(Duration::from_secs);
        geocoder
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn reverse_url(&self) -> String {
        format!("{}/reverse", self.endpoint)
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn reverse(&self, at: Coordinate) -> Result<GeocodeResult, GeocodeError> {
        let mut request = ureq::get(&self.reverse_url())
            .set("User-Agent", &self.user_agent)
            .query("format", "json")
            .query("lat", &at.lat().to_string())
            .query("lon", &at.lon().to_string());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(code, _) => GeocodeError::Status(code),
            other => GeocodeError::Network(other.to_string()),
        })?;

        response
            .into_json::<GeocodeResult>()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tunis() -> Coordinate {
        Coordinate::new(36.8065, 10.1815).unwrap()
    }

    async fn reverse_blocking(
        geocoder: NominatimGeocoder,
        at: Coordinate,
    ) -> Result<GeocodeResult, GeocodeError> {
        tokio::task::spawn_blocking(move || geocoder.reverse(at))
            .await
            .unwrap()
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let g = NominatimGeocoder::new("https://nominatim.example.org/", "ua");
        assert_eq!(g.reverse_url(), "https://nominatim.example.org/reverse");
    }

    #[test]
    fn test_from_config_timeout() {
        let config = GeocoderConfig {
            timeout_secs: Some(4),
            ..GeocoderConfig::default()
        };
        let g = NominatimGeocoder::from_config(&config);
        assert_eq!(g.timeout, Some(Duration::from_secs(4)));
        assert_eq!(g.endpoint, "https://nominatim.openstreetmap.org");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reverse_sends_query_and_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "json"))
            .and(query_param("lat", "36.8065"))
            .and(query_param("lon", "10.1815"))
            .and(header("User-Agent", "picker-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "display_name": "Le Bardo, Tunis, Tunisia",
                "address": {"state": "Tunis", "suburb": "Le Bardo", "country": "Tunisia"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let g = NominatimGeocoder::new(server.uri(), "picker-test/1.0");
        let result = reverse_blocking(g, tunis()).await.unwrap();
        assert_eq!(result.region(), "Tunis");
        assert_eq!(result.municipality(), "Le Bardo");
        assert_eq!(result.display_name.as_deref(), Some("Le Bardo, Tunis, Tunisia"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reverse_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let g = NominatimGeocoder::new(server.uri(), "picker-test/1.0");
        let err = reverse_blocking(g, tunis()).await.unwrap_err();
        assert!(matches!(err, GeocodeError::Status(503)), "got {:?}", err);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reverse_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let g = NominatimGeocoder::new(server.uri(), "picker-test/1.0");
        let err = reverse_blocking(g, tunis()).await.unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidResponse(_)), "got {:?}", err);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reverse_connection_refused() {
        let g = NominatimGeocoder::new("http://127.0.0.1:1", "picker-test/1.0")
            .with_timeout(Duration::from_secs(2));
        let err = reverse_blocking(g, tunis()).await.unwrap_err();
        assert!(matches!(err, GeocodeError::Network(_)), "got {:?}", err);
    }
}
