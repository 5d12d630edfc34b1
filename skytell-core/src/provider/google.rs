use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{error::WeatherError, http::get_json};

use super::{Geocoder, ProviderId};

const GOOGLE_MAPS_API_BASE: &str = "https://maps.googleapis.com/maps/api";
const DETAIL_FIELDS: &str = "address_component,formatted_address,geometry";

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: String, http: Client) -> Self {
        Self::with_base_url(api_key, http, GOOGLE_MAPS_API_BASE)
    }

    pub fn with_base_url(api_key: String, http: Client, base_url: &str) -> Self {
        Self {
            api_key,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query = params.to_vec();
        query.push(("key", self.api_key.as_str()));
        get_json(&self.http, ProviderId::GoogleMaps, &url, &query).await
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressComponent {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// One candidate from the Geocoding API.
///
/// `geometry` is required: a single candidate without it fails the whole
/// response as a malformed payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

/// One candidate from Places Text Search. `place_id` and `geometry` are required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceSearchResult {
    pub place_id: String,
    pub geometry: Geometry,
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceDetails {
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    status: Option<String>,
    error_message: Option<String>,
    results: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    status: Option<String>,
    error_message: Option<String>,
    result: Option<PlaceDetails>,
}

/// Google reports API-level failures in a 200 body; only `OK` and
/// `ZERO_RESULTS` are successes. A missing status counts as `OK`.
fn check_api_status(status: Option<&str>, error_message: Option<&str>) -> Result<(), WeatherError> {
    let status = status.unwrap_or("OK");
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        _ => Err(WeatherError::Provider {
            provider: ProviderId::GoogleMaps,
            message: format!("API status: {status}. {}", error_message.unwrap_or_default()),
        }),
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    #[instrument(skip(self), level = "debug")]
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>, WeatherError> {
        let envelope: ResultsEnvelope<GeocodeResult> =
            self.call("geocode/json", &[("address", query)]).await?;
        check_api_status(envelope.status.as_deref(), envelope.error_message.as_deref())?;

        let results = envelope.results.unwrap_or_default();
        tracing::debug!(count = results.len(), "geocode candidates");
        Ok(results)
    }

    #[instrument(skip(self), level = "debug")]
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceSearchResult>, WeatherError> {
        let envelope: ResultsEnvelope<PlaceSearchResult> =
            self.call("place/textsearch/json", &[("query", query)]).await?;
        check_api_status(envelope.status.as_deref(), envelope.error_message.as_deref())?;

        let results = envelope.results.unwrap_or_default();
        tracing::debug!(count = results.len(), "place search candidates");
        Ok(results)
    }

    #[instrument(skip(self), level = "debug")]
    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, WeatherError> {
        let envelope: DetailsEnvelope = self
            .call(
                "place/details/json",
                &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
            )
            .await?;
        check_api_status(envelope.status.as_deref(), envelope.error_message.as_deref())?;
        Ok(envelope.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GoogleMapsClient {
        GoogleMapsClient::with_base_url("maps-key".into(), Client::new(), &server.uri())
    }

    #[tokio::test]
    async fn geocode_parses_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .and(query_param("address", "New York,US"))
            .and(query_param("key", "maps-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [{
                    "formatted_address": "New York, NY, USA",
                    "geometry": {"location": {"lat": 40.71, "lng": -74.0}},
                    "types": ["locality", "political"],
                    "address_components": [
                        {"long_name": "New York", "short_name": "New York", "types": ["locality", "political"]},
                        {"long_name": "United States", "short_name": "US", "types": ["country", "political"]}
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let results = client(&server).geocode("New York,US").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].geometry.location, LatLng { lat: 40.71, lng: -74.0 });
        assert_eq!(results[0].address_components.len(), 2);
        assert_eq!(results[0].formatted_address.as_deref(), Some("New York, NY, USA"));
    }

    #[tokio::test]
    async fn zero_results_is_empty_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(path("/geocode/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "ZERO_RESULTS", "results": []})),
            )
            .mount(&server)
            .await;

        let results = client(&server).geocode("nowhere at all").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn api_status_failure_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(path("/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": []
            })))
            .mount(&server)
            .await;

        let err = client(&server).geocode("paris").await.unwrap_err();
        match err {
            WeatherError::Provider { provider, message } => {
                assert_eq!(provider, ProviderId::GoogleMaps);
                assert_eq!(message, "API status: REQUEST_DENIED. The provided API key is invalid.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rate_limit_surfaces_as_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(path("/place/textsearch/json"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client(&server).text_search("paris").await.unwrap_err();
        assert!(matches!(err, WeatherError::RateLimited { provider: ProviderId::GoogleMaps }));
    }

    #[tokio::test]
    async fn text_search_then_details() {
        let server = MockServer::start().await;
        Mock::given(path("/place/textsearch/json"))
            .and(query_param("query", "ucla"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [{
                    "place_id": "abc123",
                    "formatted_address": "Los Angeles, CA 90095, USA",
                    "geometry": {"location": {"lat": 34.07, "lng": -118.44}},
                    "types": ["university", "point_of_interest"]
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(path("/place/details/json"))
            .and(query_param("place_id", "abc123"))
            .and(query_param("fields", DETAIL_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "result": {
                    "formatted_address": "Los Angeles, CA 90095, USA",
                    "address_components": [
                        {"long_name": "Los Angeles", "short_name": "LA", "types": ["locality", "political"]}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let google = client(&server);
        let hits = google.text_search("ucla").await.unwrap();
        assert_eq!(hits[0].place_id, "abc123");

        let details = google.place_details("abc123").await.unwrap().expect("details present");
        assert_eq!(details.address_components[0].long_name.as_deref(), Some("Los Angeles"));
    }

    #[tokio::test]
    async fn candidate_without_geometry_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(path("/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [{"formatted_address": "Somewhere"}]
            })))
            .mount(&server)
            .await;

        let err = client(&server).geocode("somewhere").await.unwrap_err();
        match err {
            WeatherError::MalformedPayload { detail, .. } => assert!(detail.contains("geometry")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_candidate_after_a_good_one_still_fails_the_response() {
        let server = MockServer::start().await;
        Mock::given(path("/place/textsearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [
                    {
                        "place_id": "good",
                        "geometry": {"location": {"lat": 1.0, "lng": 2.0}}
                    },
                    {"geometry": {"location": {"lat": 3.0, "lng": 4.0}}}
                ]
            })))
            .mount(&server)
            .await;

        let err = client(&server).text_search("anything").await.unwrap_err();
        match err {
            WeatherError::MalformedPayload { detail, .. } => assert!(detail.contains("place_id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_401_is_unauthorized_like_the_weather_provider() {
        let server = MockServer::start().await;
        Mock::given(path("/geocode/json"))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .mount(&server)
            .await;

        let err = client(&server).geocode("paris").await.unwrap_err();
        assert!(matches!(err, WeatherError::Unauthorized { provider: ProviderId::GoogleMaps }));
    }
}
