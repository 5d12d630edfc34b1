use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit system passed to the weather provider and used when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    #[default]
    Imperial,
}

impl Units {
    /// Value of the OpenWeatherMap `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_label(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Best match picked by the resolver for a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2 code when the provider gave a short name.
    pub country: Option<String>,
    pub formatted_address: Option<String>,
    pub types: Vec<String>,
}

impl ResolvedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lon: self.lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherLocation {
    pub name: Option<String>,
    pub country: Option<String>,
    pub coord: Option<Coordinates>,
}

/// Current conditions normalized from the weather provider.
///
/// Temperatures follow the [`Units`] the record was fetched with. Wind speed
/// is always kept in m/s and converted when rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub time_utc: DateTime<Utc>,
    pub location: WeatherLocation,
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<u8>,
    pub wind_mps: Option<f64>,
    pub description: Option<String>,
    pub clouds_pct: Option<u8>,
    pub rain_mm_1h: Option<f64>,
    pub snow_mm_1h: Option<f64>,
}

/// How the input text was turned into a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub input: String,
    /// `"{city},{country}"` query used when the input hit the alias table.
    pub alias: Option<String>,
    pub location: ResolvedLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub resolved: Resolution,
    pub weather: WeatherRecord,
    pub narrative: String,
}
