//! Turns a [`WeatherRecord`] into a one-sentence summary.

use std::fmt::Write;

use crate::model::{Units, WeatherRecord};

const MPS_TO_MPH: f64 = 2.23694;

/// Wind speed in the display unit. Rounding is left to the `{:.1}` formatter.
pub fn wind_speed(wind_mps: Option<f64>, units: Units) -> Option<f64> {
    wind_mps.map(|mps| match units {
        Units::Imperial => mps * MPS_TO_MPH,
        Units::Metric => mps,
    })
}

/// Qualitative sky clause for a cloud cover percentage.
pub fn cloud_cover_clause(clouds_pct: u8) -> &'static str {
    match clouds_pct {
        0 => "Skies are clear",
        1..=39 => "A few clouds overhead",
        40..=69 => "Partly cloudy",
        _ => "Mostly cloudy",
    }
}

/// Render `record` as a sentence, appending a clause only for values present.
///
/// Rain and snow clauses are skipped for `0.0` as well as for missing values.
/// Decimals are formatted once with `{:.1}` from the stored float, so `1.25`
/// prints as `1.2`.
pub fn describe(record: &WeatherRecord, units: Units) -> String {
    let city = record.location.name.as_deref().unwrap_or("Unknown location");
    let country = record.location.country.as_deref().unwrap_or("");
    let weather = record.description.as_deref().unwrap_or("unknown conditions");
    let temp_unit = units.temperature_label();

    let mut s = format!("In {city}, {country}, it's {weather}");

    // Writing into a String cannot fail.
    if let Some(temp) = record.temp {
        let _ = write!(s, " with a temperature of {temp:.1}{temp_unit}");
        if let Some(feels) = record.feels_like {
            let _ = write!(s, " (feels like {feels:.1}{temp_unit})");
        }
    }
    if let Some(humidity) = record.humidity {
        let _ = write!(s, ". Humidity is around {humidity}%");
    }
    if let Some(wind) = wind_speed(record.wind_mps, units) {
        let _ = write!(s, ", with winds near {wind:.1} {}", units.wind_label());
    }
    if let Some(clouds) = record.clouds_pct {
        let _ = write!(s, ". {}", cloud_cover_clause(clouds));
    }
    if let Some(rain) = record.rain_mm_1h.filter(|r| *r != 0.0) {
        let _ = write!(s, ", and {rain:.1} mm of rain in the last hour");
    }
    if let Some(snow) = record.snow_mm_1h.filter(|s| *s != 0.0) {
        let _ = write!(s, ", with {snow:.1} mm of snow in the last hour");
    }

    s.push('.');
    s
}
