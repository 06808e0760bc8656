use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    Config,
    api::WeatherApi,
    debounce::Debouncer,
    state::{Action, Effect, LookupState},
    store::{CITY_KEY, KeyValueStore},
};

/// Drives [`LookupState`]: runs its effects against the weather API and the
/// store, and feeds completions back in as actions.
///
/// All state changes happen on the owner of this value; API calls run on
/// spawned tasks and report back over a channel.
#[derive(Debug)]
pub struct Lookup {
    state: LookupState,
    api: Arc<dyn WeatherApi>,
    store: Box<dyn KeyValueStore>,
    debouncer: Debouncer<Action>,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
    default_city: String,
    pending_query: Option<String>,
}

impl Lookup {
    pub fn new(config: &Config, api: Arc<dyn WeatherApi>, store: Box<dyn KeyValueStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            state: LookupState::new(config.forecast_days),
            api,
            store,
            debouncer: Debouncer::new(config.debounce(), tx.clone()),
            tx,
            rx,
            default_city: config.default_city.clone(),
            pending_query: None,
        }
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// The persisted city, or the configured default when none is stored.
    pub fn startup_city(&self) -> String {
        match self.store.get(CITY_KEY) {
            Ok(Some(city)) if !city.trim().is_empty() => city,
            Ok(_) => self.default_city.clone(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted city, using default");
                self.default_city.clone()
            }
        }
    }

    /// Kick off the initial forecast load.
    pub fn start(&mut self) {
        let city = self.startup_city();
        tracing::debug!(%city, "starting lookup");
        self.dispatch(Action::Startup { city });
    }

    pub fn toggle_search(&mut self) {
        if self.state.search_visible() {
            self.drop_pending_query();
        }
        self.dispatch(Action::ToggleSearch);
    }

    /// Text typed into the search box; searched once typing pauses.
    pub fn type_text(&mut self, text: &str) {
        self.pending_query = Some(text.to_string());
        self.debouncer.call(Action::SearchDue {
            query: text.to_string(),
        });
    }

    pub fn pick(&mut self, index: usize) {
        self.drop_pending_query();
        self.dispatch(Action::CandidatePicked { index });
    }

    pub fn select_city(&mut self, name: &str) {
        self.drop_pending_query();
        self.dispatch(Action::CitySelected {
            name: name.to_string(),
        });
    }

    pub fn dispatch(&mut self, action: Action) {
        if let Action::SearchDue { query } = &action
            && self.pending_query.as_ref() == Some(query)
        {
            self.pending_query = None;
        }

        for effect in self.state.apply(action) {
            self.run(effect);
        }
    }

    /// Wait for the next completion (or debounced query) and apply it.
    pub async fn step(&mut self) {
        // `self.tx` keeps the channel open, so `recv` only ever yields actions.
        if let Some(action) = self.rx.recv().await {
            self.dispatch(action);
        }
    }

    /// Step until no query, search or forecast is outstanding. Returns
    /// immediately when nothing has been requested yet.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            self.step().await;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending_query.is_some() || self.state.is_searching() || self.state.is_fetching()
    }

    fn drop_pending_query(&mut self) {
        self.debouncer.cancel();
        self.pending_query = None;
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::SearchLocations { seq, query } => {
                let api = Arc::clone(&self.api);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.search_locations(&query).await;
                    let _ = tx.send(Action::SearchResolved { seq, result });
                });
            }
            Effect::FetchForecast {
                seq,
                city,
                days,
                persist,
            } => {
                let api = Arc::clone(&self.api);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.fetch_forecast(&city, days).await;
                    let _ = tx.send(Action::ForecastResolved {
                        seq,
                        city,
                        persist,
                        result,
                    });
                });
            }
            Effect::PersistCity(city) => match self.store.set(CITY_KEY, &city) {
                Ok(()) => tracing::info!(%city, "persisted selected city"),
                Err(err) => tracing::warn!(%city, error = %err, "failed to persist selected city"),
            },
        }
    }
}
