//! Free text to coordinates: alias fast path, candidate ranking and the
//! country-bias fallback.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    alias::AliasTable,
    error::WeatherError,
    model::{Resolution, ResolvedLocation},
    provider::{
        Geocoder,
        google::{AddressComponent, GeocodeResult, PlaceSearchResult},
    },
};

/// Suffix appended to the input when the first lookup comes back empty.
const COUNTRY_BIAS: &str = ", US";

/// Which provider endpoint the general path uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolveStrategy {
    /// Geocoding API, candidates ranked by locality and country preference.
    #[default]
    Geocode,
    /// Places Text Search followed by a details lookup of the top hit.
    Places,
}

impl TryFrom<&str> for ResolveStrategy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "geocode" => Ok(ResolveStrategy::Geocode),
            "places" => Ok(ResolveStrategy::Places),
            _ => Err(anyhow::anyhow!(
                "Unknown resolver '{value}'. Supported: geocode, places."
            )),
        }
    }
}

/// City and country code from a flat component list.
///
/// City is the `locality` component, else `administrative_area_level_2`.
/// Country prefers the short name (the ISO code).
pub fn extract_city_country(components: &[AddressComponent]) -> (Option<String>, Option<String>) {
    let mut city = None;
    let mut admin2 = None;
    let mut country = None;

    for c in components {
        let has = |tag: &str| c.types.iter().any(|t| t == tag);
        if has("locality") {
            city = non_empty(&c.long_name);
        } else if has("administrative_area_level_2") {
            admin2 = non_empty(&c.long_name);
        } else if has("country") {
            country = non_empty(&c.short_name).or_else(|| non_empty(&c.long_name));
        }
    }

    (city.or(admin2), country)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Sort key for geocoding candidates; lower is better.
fn geocode_score(result: &GeocodeResult, country_preference: &[String]) -> (u8, usize) {
    let (city, country) = extract_city_country(&result.address_components);
    let country_rank = country
        .and_then(|cc| country_preference.iter().position(|p| *p == cc))
        .unwrap_or(country_preference.len());
    let city_bonus = if city.is_some() { 0 } else { 1 };
    (city_bonus, country_rank)
}

fn place_score(result: &PlaceSearchResult) -> u8 {
    let is_area = result.types.iter().any(|t| t == "locality" || t == "political");
    if is_area { 0 } else { 1 }
}

/// Stable sort of geocoding candidates, best first.
pub fn rank_geocode_results(results: &mut [GeocodeResult], country_preference: &[String]) {
    results.sort_by_key(|r| geocode_score(r, country_preference));
}

/// Stable sort of place search candidates, localities first.
pub fn rank_place_results(results: &mut [PlaceSearchResult]) {
    results.sort_by_key(place_score);
}

#[derive(Debug)]
pub struct Resolver {
    geocoder: Box<dyn Geocoder>,
    aliases: AliasTable,
    strategy: ResolveStrategy,
    country_preference: Vec<String>,
}

impl Resolver {
    pub fn new(
        geocoder: Box<dyn Geocoder>,
        aliases: AliasTable,
        strategy: ResolveStrategy,
        country_preference: Vec<String>,
    ) -> Self {
        Self {
            geocoder,
            aliases,
            strategy,
            country_preference,
        }
    }

    pub fn strategy(&self) -> ResolveStrategy {
        self.strategy
    }

    /// Resolve `input` to a single location.
    ///
    /// Aliases are always re-geocoded. Otherwise the configured strategy runs,
    /// and on zero results the input is geocoded once more with `", US"`
    /// appended.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve(&self, input: &str) -> Result<Resolution, WeatherError> {
        if let Some(alias) = self.aliases.lookup(input) {
            let query = alias.geocode_query();
            tracing::info!(alias = %query, "alias hit");

            let location = self
                .geocode_text(&query)
                .await?
                .ok_or_else(|| WeatherError::AliasNotFound(query.clone()))?;

            return Ok(Resolution {
                input: input.to_string(),
                alias: Some(query),
                location,
            });
        }

        let primary = match self.strategy {
            ResolveStrategy::Geocode => self.geocode_text(input).await?,
            ResolveStrategy::Places => self.place_search(input).await?,
        };

        let location = match primary {
            Some(location) => location,
            None => {
                let biased = format!("{input}{COUNTRY_BIAS}");
                tracing::info!(query = %biased, "no results, retrying with country bias");
                self.geocode_text(&biased)
                    .await?
                    .ok_or_else(|| WeatherError::NotFound(input.to_string()))?
            }
        };

        Ok(Resolution {
            input: input.to_string(),
            alias: None,
            location,
        })
    }

    async fn geocode_text(&self, query: &str) -> Result<Option<ResolvedLocation>, WeatherError> {
        let mut results = self.geocoder.geocode(query).await?;
        rank_geocode_results(&mut results, &self.country_preference);

        let Some(pick) = results.into_iter().next() else {
            return Ok(None);
        };
        let (city, country) = extract_city_country(&pick.address_components);
        tracing::debug!(?city, ?country, "picked geocode candidate");

        Ok(Some(ResolvedLocation {
            lat: pick.geometry.location.lat,
            lon: pick.geometry.location.lng,
            city,
            country,
            formatted_address: pick.formatted_address,
            types: pick.types,
        }))
    }

    async fn place_search(&self, query: &str) -> Result<Option<ResolvedLocation>, WeatherError> {
        let mut results = self.geocoder.text_search(query).await?;
        rank_place_results(&mut results);

        let Some(first) = results.into_iter().next() else {
            return Ok(None);
        };

        let details = self.geocoder.place_details(&first.place_id).await?;
        let (components, detail_address) = match details {
            Some(d) => (d.address_components, d.formatted_address),
            None => (Vec::new(), None),
        };
        let (city, country) = extract_city_country(&components);
        tracing::debug!(place_id = %first.place_id, ?city, ?country, "picked place");

        Ok(Some(ResolvedLocation {
            lat: first.geometry.location.lat,
            lon: first.geometry.location.lng,
            city,
            country,
            formatted_address: detail_address.or(first.formatted_address),
            types: first.types,
        }))
    }
}
