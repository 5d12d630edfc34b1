use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use skytell_core::{Config, ProviderId, ResolveStrategy, Units, WeatherError, WeatherService};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skytell", version, about = "Current weather for a place name, in one sentence")]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a provider ("google" or "openweather").
    Configure {
        /// Provider short name.
        provider: String,
    },

    /// Show current weather for a place.
    Show {
        /// Free-text location, e.g. "la" or "sf bay area". Prompted for when omitted.
        query: Option<String>,

        /// "metric" or "imperial"; overrides the config file.
        #[arg(long)]
        units: Option<String>,

        /// Resolve with Places Text Search instead of the Geocoding API.
        #[arg(long)]
        places: bool,

        /// Print the full report as JSON instead of the sentence.
        #[arg(long)]
        json: bool,
    },

    /// List the alias shortcuts (built-in plus config).
    Aliases,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show {
                query,
                units,
                places,
                json,
            } => show(query, units.as_deref(), places, json).await,
            Command::Aliases => {
                let config = Config::load()?;
                for (key, alias) in config.alias_table().iter() {
                    println!("{key:<10} {}", alias.geocode_query());
                }
                Ok(())
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = Password::new(&format!("{} API key:", id.display_name()))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key for '{id}' must not be empty");
    }

    let mut config = Config::load()?;
    config.upsert_provider_api_key(id, api_key.to_string());
    config.save()?;

    println!(
        "Saved {} API key to {}",
        id.display_name(),
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn show(
    query: Option<String>,
    units: Option<&str>,
    places: bool,
    json: bool,
) -> anyhow::Result<()> {
    let query = match query {
        Some(q) => q,
        None => Text::new("Where?")
            .with_help_message("e.g. 'la', 'sf bay area', 'my dorm near UCLA'")
            .prompt()
            .context("Failed to read location")?,
    };
    let query = query.trim();
    if query.is_empty() {
        bail!("No location given");
    }

    let mut config = Config::load()?;
    apply_overrides(&mut config, units, places)?;

    let service = WeatherService::from_config(&config)?;
    let report = service.report(query).await.map_err(with_hint)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.narrative);
    }

    Ok(())
}

/// Attach a next step to the errors a user can act on.
fn with_hint(err: WeatherError) -> anyhow::Error {
    let hint = if err.is_not_found() {
        Some(
            "Hint: add a region or country (e.g. \"springfield, IL\"), \
             or define an alias in the config file."
                .to_string(),
        )
    } else if let WeatherError::Unauthorized { .. } = err {
        err.provider()
            .map(|id| format!("Hint: run `skytell configure {id}` to replace the stored key."))
    } else {
        None
    };

    match hint {
        Some(hint) => anyhow::anyhow!("{err}\n{hint}"),
        None => err.into(),
    }
}

fn apply_overrides(config: &mut Config, units: Option<&str>, places: bool) -> anyhow::Result<()> {
    if let Some(units) = units {
        config.units = Units::try_from(units)?;
    }
    if places {
        config.resolver = ResolveStrategy::Places;
    }
    Ok(())
}
