use std::sync::Arc;

use anyhow::{Context, bail};
use citycast_core::{
    Config, FileStore, Lookup, WeatherApi, client_from_config, state::SHORT_QUERY_MAX_CHARS,
};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather lookup")]
pub struct Cli {
    /// weatherapi.com API key; overrides the configured one.
    #[arg(long, global = true, env = "WEATHERAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default city.
    Configure,

    /// Show current conditions and the daily forecast.
    ///
    /// Without a city, shows the last selected one (or the default).
    Show {
        /// City to look up; remembered for the next run.
        city: Option<String>,

        /// Number of forecast days.
        #[arg(long)]
        days: Option<u8>,
    },

    /// List locations matching a search text.
    Search {
        query: String,
    },

    /// Interactive search-and-pick loop.
    Browse,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city, days }) => {
                let mut config = load_config(self.api_key)?;
                if let Some(days) = days {
                    config.forecast_days = days;
                }
                show(&config, city.as_deref()).await
            }
            Some(Command::Search { query }) => {
                let config = load_config(self.api_key)?;
                search(&config, &query).await
            }
            Some(Command::Browse) => {
                let config = load_config(self.api_key)?;
                browse(&config).await
            }
            None => {
                let config = load_config(self.api_key)?;
                show(&config, None).await
            }
        }
    }
}

fn load_config(api_key: Option<String>) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(key) = api_key {
        config.set_api_key(key);
    }
    Ok(config)
}

fn lookup(config: &Config) -> anyhow::Result<Lookup> {
    let api: Arc<dyn WeatherApi> = Arc::new(client_from_config(config)?);
    let store = FileStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "using city store");

    Ok(Lookup::new(config, api, Box::new(store)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Text::new("weatherapi.com API key:")
        .with_help_message("Get one at https://www.weatherapi.com/my/")
        .prompt()
        .context("Failed to read API key")?;
    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(key.trim().to_string());

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    config.default_city = city.trim().to_string();

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(config: &Config, city: Option<&str>) -> anyhow::Result<()> {
    let mut lookup = lookup(config)?;

    match city {
        Some(city) => lookup.select_city(city),
        None => lookup.start(),
    }
    lookup.settle().await;

    if let Some(err) = lookup.state().forecast_error() {
        bail!("No forecast available: {err}");
    }
    if let Some(payload) = lookup.state().forecast() {
        print!("{}", render::forecast(payload));
    }

    Ok(())
}

async fn search(config: &Config, query: &str) -> anyhow::Result<()> {
    if query.trim().chars().count() <= SHORT_QUERY_MAX_CHARS {
        println!("Type more than {SHORT_QUERY_MAX_CHARS} characters to search.");
        return Ok(());
    }

    let api = client_from_config(config)?;
    let found = api.search_locations(query.trim()).await?;

    if found.is_empty() {
        println!("No locations match \"{}\".", query.trim());
    } else {
        print!("{}", render::candidates(&found));
    }

    Ok(())
}

async fn browse(config: &Config) -> anyhow::Result<()> {
    let mut lookup = lookup(config)?;

    lookup.start();
    lookup.settle().await;
    print_current(&lookup);

    loop {
        if !lookup.state().search_visible() {
            lookup.toggle_search();
        }

        let text = match Text::new("Search city:")
            .with_help_message("empty input quits")
            .prompt()
        {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read search text"),
        };
        if text.trim().is_empty() {
            break;
        }

        lookup.type_text(&text);
        lookup.settle().await;

        if let Some(err) = lookup.state().search_error() {
            eprintln!("warning: {err}");
        }

        let candidates = lookup.state().candidates().to_vec();
        if candidates.is_empty() {
            println!("No matches.");
            continue;
        }

        let picked = match Select::new("Pick a location:", candidates).raw_prompt() {
            Ok(option) => option.index,
            Err(InquireError::OperationCanceled) => continue,
            Err(InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read selection"),
        };

        lookup.pick(picked);
        lookup.settle().await;
        print_current(&lookup);
    }

    Ok(())
}

fn print_current(lookup: &Lookup) {
    if let Some(err) = lookup.state().forecast_error() {
        eprintln!("warning: {err}");
    }
    if let Some(payload) = lookup.state().forecast() {
        println!("{}", render::forecast(payload));
    }
}
