use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::WeatherError,
    http::get_json,
    model::{Coordinates, Units, WeatherLocation, WeatherRecord},
};

use super::{ProviderId, WeatherProvider};

const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, http: Client) -> Self {
        Self::with_base_url(api_key, http, OPENWEATHER_API_BASE)
    }

    pub fn with_base_url(api_key: String, http: Client, base_url: &str) -> Self {
        Self {
            api_key,
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwPrecipitation {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    name: Option<String>,
    sys: Option<OwSys>,
    coord: Option<Coordinates>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    clouds: Option<OwClouds>,
    rain: Option<OwPrecipitation>,
    snow: Option<OwPrecipitation>,
}

impl OwCurrentResponse {
    fn into_record(self) -> Option<WeatherRecord> {
        let time_utc: DateTime<Utc> = DateTime::from_timestamp(self.dt, 0)?;

        Some(WeatherRecord {
            time_utc,
            location: WeatherLocation {
                name: self.name,
                country: self.sys.and_then(|s| s.country),
                coord: self.coord,
            },
            temp: Some(self.main.temp),
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            wind_mps: self.wind.and_then(|w| w.speed),
            description: self.weather.into_iter().next().map(|w| w.description),
            clouds_pct: self.clouds.and_then(|c| c.all),
            rain_mm_1h: self.rain.and_then(|r| r.one_hour),
            snow_mm_1h: self.snow.and_then(|s| s.one_hour),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn current(&self, at: Coordinates, units: Units) -> Result<WeatherRecord, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        let lat = at.lat.to_string();
        let lon = at.lon.to_string();

        let value: serde_json::Value = get_json(
            &self.http,
            ProviderId::OpenWeather,
            &url,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ],
        )
        .await?;

        parse_current(value)
    }
}

fn parse_current(value: serde_json::Value) -> Result<WeatherRecord, WeatherError> {
    let malformed = |detail: String, value: &serde_json::Value| WeatherError::MalformedPayload {
        provider: ProviderId::OpenWeather,
        detail,
        raw: value.to_string(),
    };

    let parsed: OwCurrentResponse = serde_json::from_value(value.clone())
        .map_err(|e| malformed(e.to_string(), &value))?;
    let dt = parsed.dt;

    parsed
        .into_record()
        .ok_or_else(|| malformed(format!("timestamp `dt` out of range: {dt}"), &value))
}
