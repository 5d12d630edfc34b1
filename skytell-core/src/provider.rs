use crate::{
    Config, WeatherError,
    model::{Coordinates, Units, WeatherRecord},
    provider::{
        google::{GeocodeResult, GoogleMapsClient, PlaceDetails, PlaceSearchResult},
        openweather::OpenWeatherProvider,
    },
};
use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug};

pub mod google;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    GoogleMaps,
    OpenWeather,
}

impl ProviderId {
    /// Short name used in the config file and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::GoogleMaps => "google",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::GoogleMaps => "Google Maps",
            ProviderId::OpenWeather => "OpenWeatherMap",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::GoogleMaps, ProviderId::OpenWeather]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "google" => Ok(ProviderId::GoogleMaps),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: google, openweather."
            )),
        }
    }
}

/// Place lookup backend: text geocoding plus place search/details.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Candidates for a free-text address, in provider order. Empty on zero results.
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>, WeatherError>;

    /// Candidates from a relevance-ranked place search, in provider order.
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceSearchResult>, WeatherError>;

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, WeatherError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, at: Coordinates, units: Units) -> Result<WeatherRecord, WeatherError>;
}

fn api_key<'a>(id: ProviderId, config: &'a Config) -> anyhow::Result<&'a str> {
    config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `skytell configure {id}` and enter your API key."
        )
    })
}

/// Construct the geocoder from config, sharing `http` with the other provider.
pub fn geocoder_from_config(config: &Config, http: Client) -> anyhow::Result<Box<dyn Geocoder>> {
    let key = api_key(ProviderId::GoogleMaps, config)?;
    Ok(Box::new(GoogleMapsClient::new(key.to_owned(), http)))
}

/// Construct the weather provider from config, sharing `http` with the geocoder.
pub fn weather_provider_from_config(
    config: &Config,
    http: Client,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let key = api_key(ProviderId::OpenWeather, config)?;
    Ok(Box::new(OpenWeatherProvider::new(key.to_owned(), http)))
}
