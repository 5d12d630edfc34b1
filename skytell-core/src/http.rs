//! Shared HTTP plumbing for both providers.
//!
//! Every provider call goes through [`get_json`], so transport failures and
//! HTTP status codes map to the same [`WeatherError`] variants regardless of
//! which API was called.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{error::WeatherError, provider::ProviderId};

const USER_AGENT: &str = concat!("skytell/", env!("CARGO_PKG_VERSION"));

/// Build the single HTTP client shared by the geocoder and the weather provider.
pub fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// GET `url` with `query` and decode a JSON body into `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    provider: ProviderId,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, WeatherError> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = res.status();
    let body = res.text().await.map_err(|e| transport_error(provider, e))?;

    check_status(provider, status, &body)?;

    serde_json::from_str(&body).map_err(|e| WeatherError::MalformedPayload {
        provider,
        detail: e.to_string(),
        raw: body,
    })
}

/// The request URL carries the API key as a query parameter, so it is
/// stripped before the error can reach a log line or the terminal.
fn transport_error(provider: ProviderId, err: reqwest::Error) -> WeatherError {
    if err.is_timeout() {
        WeatherError::Timeout { provider }
    } else {
        WeatherError::Connection {
            provider,
            source: err.without_url(),
        }
    }
}

fn check_status(provider: ProviderId, status: StatusCode, body: &str) -> Result<(), WeatherError> {
    match status {
        StatusCode::UNAUTHORIZED => Err(WeatherError::Unauthorized { provider }),
        StatusCode::TOO_MANY_REQUESTS => Err(WeatherError::RateLimited { provider }),
        s if s.is_client_error() || s.is_server_error() => Err(WeatherError::Provider {
            provider,
            message: format!("HTTP {}: {}", s.as_u16(), truncate_body(body)),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Probe {
        value: u32,
    }

    fn client() -> Client {
        build_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn decodes_success_body_and_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .and(query_param("q", "x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 7})))
            .mount(&server)
            .await;

        let url = format!("{}/probe", server.uri());
        let probe: Probe = get_json(&client(), ProviderId::GoogleMaps, &url, &[("q", "x")])
            .await
            .unwrap();
        assert_eq!(probe.value, 7);
    }

    #[tokio::test]
    async fn maps_401_and_429_to_tagged_errors() {
        let server = MockServer::start().await;
        Mock::given(path("/auth"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/busy"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let http = client();
        let err = get_json::<Probe>(&http, ProviderId::OpenWeather, &format!("{}/auth", server.uri()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Unauthorized { provider: ProviderId::OpenWeather }));

        let err = get_json::<Probe>(&http, ProviderId::GoogleMaps, &format!("{}/busy", server.uri()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::RateLimited { provider: ProviderId::GoogleMaps }));
    }

    #[tokio::test]
    async fn other_http_errors_carry_status_and_truncated_body() {
        let server = MockServer::start().await;
        let long_body = "x".repeat(500);
        Mock::given(path("/broken"))
            .respond_with(ResponseTemplate::new(503).set_body_string(long_body))
            .mount(&server)
            .await;

        let err = get_json::<Probe>(&client(), ProviderId::OpenWeather, &format!("{}/broken", server.uri()), &[])
            .await
            .unwrap_err();
        match err {
            WeatherError::Provider { message, .. } => {
                assert!(message.starts_with("HTTP 503: "));
                assert!(message.ends_with("..."));
                assert_eq!(message.len(), "HTTP 503: ".len() + 200 + 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(path("/odd"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"other": 1}"#))
            .mount(&server)
            .await;

        let err = get_json::<Probe>(&client(), ProviderId::OpenWeather, &format!("{}/odd", server.uri()), &[])
            .await
            .unwrap_err();
        match err {
            WeatherError::MalformedPayload { detail, raw, .. } => {
                assert!(detail.contains("missing field `value`"));
                assert_eq!(raw, r#"{"other": 1}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_response_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"value": 1}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let http = build_client(Duration::from_millis(200)).unwrap();
        let err = get_json::<Probe>(&http, ProviderId::GoogleMaps, &format!("{}/slow", server.uri()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Timeout { provider: ProviderId::GoogleMaps }));
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        let err = get_json::<Probe>(&client(), ProviderId::OpenWeather, "http://127.0.0.1:1/none", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Connection { provider: ProviderId::OpenWeather, .. }));
    }

    #[tokio::test]
    async fn connection_error_does_not_echo_the_api_key() {
        let err = get_json::<Probe>(
            &client(),
            ProviderId::GoogleMaps,
            "http://127.0.0.1:1/geocode/json",
            &[("address", "paris"), ("key", "SECRET-KEY")],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WeatherError::Connection { .. }));
        assert!(!err.to_string().contains("SECRET-KEY"), "{err}");
        assert!(!format!("{err:?}").contains("SECRET-KEY"), "{err:?}");

        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            assert!(!inner.to_string().contains("SECRET-KEY"), "{inner}");
            source = inner.source();
        }
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("short"), "short");
        assert_eq!(truncate_body(&"é".repeat(201)).chars().count(), 203);
    }
}
