//! Core library for the `citycast` weather lookup.
//!
//! This crate defines:
//! - Configuration handling
//! - The weatherapi.com client and its response model
//! - Persistence of the last selected city
//! - The lookup workflow: a pure state machine plus the async driver that
//!   debounces search input and runs requests
//!
//! It is used by `citycast-cli`, but can also back other front ends.

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod lookup;
pub mod model;
pub mod state;
pub mod store;

pub use api::{WeatherApi, WeatherApiClient, client_from_config};
pub use config::Config;
pub use error::FetchError;
pub use lookup::Lookup;
pub use model::{ForecastDay, ForecastPayload, LocationCandidate};
pub use state::{Action, Effect, LookupState};
pub use store::{CITY_KEY, FileStore, KeyValueStore, MemoryStore};
