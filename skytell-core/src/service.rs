//! Resolve -> fetch -> describe, one query at a time.

use tracing::instrument;

use crate::{
    Config,
    error::WeatherError,
    http::build_client,
    model::{Report, Units},
    narrative::describe,
    provider::{WeatherProvider, geocoder_from_config, weather_provider_from_config},
    resolver::Resolver,
};

#[derive(Debug)]
pub struct WeatherService {
    resolver: Resolver,
    weather: Box<dyn WeatherProvider>,
    units: Units,
}

impl WeatherService {
    pub fn new(resolver: Resolver, weather: Box<dyn WeatherProvider>, units: Units) -> Self {
        Self { resolver, weather, units }
    }

    /// Wire up both providers from config over one shared HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = build_client(config.timeout())?;
        let geocoder = geocoder_from_config(config, http.clone())?;
        let weather = weather_provider_from_config(config, http)?;

        let resolver = Resolver::new(
            geocoder,
            config.alias_table(),
            config.resolver,
            config.country_preference.clone(),
        );

        Ok(Self::new(resolver, weather, config.units))
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Current conditions and narrative for a free-text location.
    #[instrument(skip(self), fields(units = %self.units, resolver = ?self.resolver.strategy()))]
    pub async fn report(&self, query: &str) -> Result<Report, WeatherError> {
        let resolved = self.resolver.resolve(query).await?;
        tracing::info!(
            lat = resolved.location.lat,
            lon = resolved.location.lon,
            formatted = ?resolved.location.formatted_address,
            "resolved location"
        );

        let weather = self
            .weather
            .current(resolved.location.coordinates(), self.units)
            .await?;
        let narrative = describe(&weather, self.units);

        Ok(Report { resolved, weather, narrative })
    }
}
