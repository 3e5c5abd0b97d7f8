//! Optional location hint for the analysis.
//!
//! Runs independently of the classification: whatever it produces (or fails
//! to produce) only decides whether the prompt and the card mention a place.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{UpcycleError, UpcycleResult};

/// Where the location comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocationSource {
    #[default]
    None,
    /// Typed by the user.
    Manual(String),
    /// Looked up from the network.
    Automatic,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpLocation {
    status: Option<String>,
    message: Option<String>,
    city: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Resolves a [`LocationSource`] into a display string.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    client: Client,
    endpoint: String,
}

impl LocationResolver {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// `Ok(None)` when no location was requested or the manual entry is blank.
    pub async fn resolve(&self, source: &LocationSource) -> UpcycleResult<Option<String>> {
        match source {
            LocationSource::None => Ok(None),
            LocationSource::Manual(text) => Ok(manual_location(text)),
            LocationSource::Automatic => self.lookup().await.map(Some),
        }
    }

    async fn lookup(&self) -> UpcycleResult<String> {
        tracing::debug!(endpoint = %self.endpoint, "looking up location");
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| UpcycleError::geolocation(format!("lookup unavailable: {}", e)))?;

        if !response.status().is_success() {
            return Err(UpcycleError::geolocation(format!(
                "lookup returned status {}",
                response.status().as_u16()
            )));
        }

        let body: IpLocation = response
            .json()
            .await
            .map_err(|e| UpcycleError::geolocation(format!("unreadable lookup reply: {}", e)))?;
        describe(body)
    }
}

/// Trimmed manual entry; blank means no location.
pub fn manual_location(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// "Current position (48.86, 2.35)", prefixed by the place name when known.
pub fn format_position(lat: f64, lon: f64, place: Option<&str>) -> String {
    match place {
        Some(place) => format!("{} ({:.2}, {:.2})", place, lat, lon),
        None => format!("Current position ({:.2}, {:.2})", lat, lon),
    }
}

fn describe(body: IpLocation) -> UpcycleResult<String> {
    if let Some(status) = body.status.as_deref() {
        if status != "success" {
            let reason = body.message.unwrap_or_else(|| status.to_string());
            return Err(UpcycleError::geolocation(reason));
        }
    }
    let (lat, lon) = match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(UpcycleError::geolocation("lookup reply has no coordinates")),
    };
    let place = match (body.city, body.country) {
        (Some(city), Some(country)) => Some(format!("{}, {}", city, country)),
        (Some(city), None) => Some(city),
        (None, country) => country,
    };
    Ok(format_position(lat, lon, place.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_location_is_trimmed() {
        assert_eq!(manual_location("  Bordeaux "), Some("Bordeaux".to_string()));
        assert_eq!(manual_location("   "), None);
    }

    #[test]
    fn test_describe_success() {
        let body: IpLocation = serde_json::from_str(
            r#"{"status":"success","city":"Paris","country":"France","lat":48.8566,"lon":2.3522}"#,
        )
        .unwrap();
        assert_eq!(describe(body).unwrap(), "Paris, France (48.86, 2.35)");
    }

    #[test]
    fn test_describe_without_place() {
        let body: IpLocation = serde_json::from_str(r#"{"lat":-33.868,"lon":151.209}"#).unwrap();
        assert_eq!(describe(body).unwrap(), "Current position (-33.87, 151.21)");
    }

    #[test]
    fn test_describe_failure_is_geolocation_error() {
        let body: IpLocation =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
        let err = describe(body).unwrap_err();
        assert_eq!(err.category(), "geolocation");
        assert!(err.user_message().contains("private range"));
    }

    #[tokio::test]
    async fn test_manual_source_needs_no_network() {
        let resolver = LocationResolver::new("http://127.0.0.1:9");
        let resolved = resolver
            .resolve(&LocationSource::Manual("Lille".into()))
            .await
            .unwrap();
        assert_eq!(resolved.as_deref(), Some("Lille"));
        assert_eq!(resolver.resolve(&LocationSource::None).await.unwrap(), None);
    }
}
