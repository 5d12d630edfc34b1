//! Core library for the `skytell` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geocoding (Google Maps) and weather (OpenWeatherMap) providers
//! - Alias table and location disambiguation
//! - Narrative rendering of current conditions
//!
//! It is used by `skytell-cli`, but can also be reused by other binaries or services.

pub mod alias;
pub mod config;
pub mod error;
mod http;
pub mod model;
pub mod narrative;
pub mod provider;
pub mod resolver;
pub mod service;

pub use alias::{Alias, AliasTable};
pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use http::build_client;
pub use model::{Coordinates, Report, Resolution, ResolvedLocation, Units, WeatherRecord};
pub use narrative::describe;
pub use provider::{Geocoder, ProviderId, WeatherProvider};
pub use resolver::{ResolveStrategy, Resolver};
pub use service::WeatherService;
