use reqwest::Client;
use serde::Deserialize;
use anyhow::{Result, anyhow};

/// A resolved position from the one-shot startup lookup.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoFix {
    pub lat: f64,
    pub lon: f64,
}

impl GeoFix {
    /// Coordinates rounded to two decimals for display.
    pub fn display(&self) -> String {
        format!("Lat: {:.2}, Lon: {:.2}", self.lat, self.lon)
    }
}

/// Best-effort IP geolocation. Reverse geocoding to an address is not
/// implemented; only the raw coordinates are shown.
#[derive(Clone)]
pub struct GeoClient {
    client: Client,
    url: String,
}

impl GeoClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    pub async fn locate(&self) -> Result<GeoFix> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "geolocation lookup failed with status: {}",
                response.status()
            ));
        }

        let fix: GeoFix = response.json().await?;
        Ok(fix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_two_decimals() {
        let fix = GeoFix { lat: 40.712776, lon: -74.005974 };
        assert_eq!(fix.display(), "Lat: 40.71, Lon: -74.01");
    }

    #[test]
    fn test_extra_response_fields_ignored() {
        let fix: GeoFix =
            serde_json::from_str(r#"{"status":"success","lat":51.5,"lon":-0.12,"city":"London"}"#)
                .unwrap();
        assert_eq!(fix.display(), "Lat: 51.50, Lon: -0.12");
    }

    mod http {
        use super::*;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        #[tokio::test]
        async fn test_locate_parses_coordinates() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/json"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "lat": 40.712776,
                    "lon": -74.005974
                })))
                .mount(&server)
                .await;

            let client = GeoClient::new(&format!("{}/json", server.uri()));
            let fix = client.locate().await.unwrap();
            assert_eq!(fix.display(), "Lat: 40.71, Lon: -74.01");
        }

        #[tokio::test]
        async fn test_locate_error_status_is_error() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/json"))
                .respond_with(ResponseTemplate::new(429))
                .mount(&server)
                .await;

            let client = GeoClient::new(&format!("{}/json", server.uri()));
            assert!(client.locate().await.is_err());
        }
    }
}
