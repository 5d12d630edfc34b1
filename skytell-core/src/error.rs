//! Error taxonomy for provider calls and location resolution.

use thiserror::Error;

use crate::provider::ProviderId;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{} request timed out.", .provider.display_name())]
    Timeout { provider: ProviderId },

    #[error("Network error calling {}: {source}", .provider.display_name())]
    Connection {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },

    #[error("{}: rate limited (HTTP 429). Try again later.", .provider.display_name())]
    RateLimited { provider: ProviderId },

    #[error("{} unauthorized (HTTP 401). Check your API key / plan.", .provider.display_name())]
    Unauthorized { provider: ProviderId },

    #[error("{} error: {message}", .provider.display_name())]
    Provider {
        provider: ProviderId,
        message: String,
    },

    #[error("Couldn't resolve location: '{0}'")]
    NotFound(String),

    #[error("Alias '{0}' failed to geocode.")]
    AliasNotFound(String),

    #[error("Unexpected {} payload ({detail}). Raw: {raw}", .provider.display_name())]
    MalformedPayload {
        provider: ProviderId,
        detail: String,
        raw: String,
    },
}

impl WeatherError {
    /// Provider that produced the error, if the failure came from an API call.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::Timeout { provider }
            | Self::Connection { provider, .. }
            | Self::RateLimited { provider }
            | Self::Unauthorized { provider }
            | Self::Provider { provider, .. }
            | Self::MalformedPayload { provider, .. } => Some(*provider),
            Self::NotFound(_) | Self::AliasNotFound(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::AliasNotFound(_))
    }
}
