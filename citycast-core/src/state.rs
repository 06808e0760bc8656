//! Lookup screen state and its transitions.
//!
//! [`LookupState::apply`] is pure: it updates the record and returns the
//! [`Effect`]s the driver has to run. Every request carries a sequence number
//! and only the result of the most recently issued request of each kind is
//! accepted, so late responses can never overwrite newer data.

use crate::{
    config::DEFAULT_FORECAST_DAYS,
    error::FetchError,
    model::{ForecastPayload, LocationCandidate},
};

/// Trimmed queries of at most this many characters never hit the search endpoint.
pub const SHORT_QUERY_MAX_CHARS: usize = 2;

#[derive(Debug)]
pub enum Action {
    /// Initial load of the persisted (or default) city.
    Startup { city: String },
    ToggleSearch,
    /// Debounced search text.
    SearchDue { query: String },
    SearchResolved {
        seq: u64,
        result: Result<Vec<LocationCandidate>, FetchError>,
    },
    CandidatePicked { index: usize },
    CitySelected { name: String },
    ForecastResolved {
        seq: u64,
        city: String,
        persist: bool,
        result: Result<ForecastPayload, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SearchLocations { seq: u64, query: String },
    FetchForecast {
        seq: u64,
        city: String,
        days: u8,
        persist: bool,
    },
    PersistCity(String),
}

#[derive(Debug, Clone)]
pub struct LookupState {
    loading: bool,
    search_visible: bool,
    candidates: Vec<LocationCandidate>,
    forecast: Option<ForecastPayload>,
    search_error: Option<String>,
    forecast_error: Option<String>,
    days: u8,
    search_seq: u64,
    pending_search: Option<u64>,
    forecast_seq: u64,
    pending_forecast: Option<u64>,
}

impl Default for LookupState {
    fn default() -> Self {
        Self::new(DEFAULT_FORECAST_DAYS)
    }
}

impl LookupState {
    /// Fresh state; `loading` starts out true until the startup fetch resolves.
    pub fn new(days: u8) -> Self {
        Self {
            loading: true,
            search_visible: false,
            candidates: Vec::new(),
            forecast: None,
            search_error: None,
            forecast_error: None,
            days,
            search_seq: 0,
            pending_search: None,
            forecast_seq: 0,
            pending_forecast: None,
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn search_visible(&self) -> bool {
        self.search_visible
    }

    pub fn candidates(&self) -> &[LocationCandidate] {
        &self.candidates
    }

    pub fn forecast(&self) -> Option<&ForecastPayload> {
        self.forecast.as_ref()
    }

    /// Failure of the latest search, cleared when a new query comes in.
    pub fn search_error(&self) -> Option<&str> {
        self.search_error.as_deref()
    }

    /// Failure of the latest forecast fetch, cleared by the next success.
    pub fn forecast_error(&self) -> Option<&str> {
        self.forecast_error.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        self.pending_search.is_some()
    }

    /// True while a forecast request is in flight. Unlike [`Self::loading`]
    /// this is false before the first request is issued.
    pub fn is_fetching(&self) -> bool {
        self.pending_forecast.is_some()
    }

    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Startup { city } => vec![self.begin_forecast(city, false)],
            Action::ToggleSearch => {
                self.search_visible = !self.search_visible;
                if !self.search_visible {
                    self.candidates.clear();
                    self.invalidate_search();
                }
                Vec::new()
            }
            Action::SearchDue { query } => {
                self.search_error = None;
                let query = query.trim();
                // Short input leaves the current candidates in place.
                if query.chars().count() <= SHORT_QUERY_MAX_CHARS {
                    return Vec::new();
                }

                self.search_seq += 1;
                self.pending_search = Some(self.search_seq);
                vec![Effect::SearchLocations {
                    seq: self.search_seq,
                    query: query.to_string(),
                }]
            }
            Action::SearchResolved { seq, result } => {
                if self.pending_search != Some(seq) {
                    tracing::debug!(seq, latest = self.search_seq, "dropping stale search result");
                    return Vec::new();
                }

                self.pending_search = None;
                match result {
                    Ok(candidates) => {
                        self.candidates = candidates;
                        self.search_error = None;
                    }
                    Err(err) => self.search_error = Some(err.to_string()),
                }
                Vec::new()
            }
            Action::CandidatePicked { index } => match self.candidates.get(index) {
                Some(candidate) => {
                    let name = candidate.name.clone();
                    self.select(name)
                }
                None => Vec::new(),
            },
            Action::CitySelected { name } => self.select(name),
            Action::ForecastResolved {
                seq,
                city,
                persist,
                result,
            } => {
                if seq != self.forecast_seq {
                    tracing::debug!(seq, latest = self.forecast_seq, %city, "dropping stale forecast");
                    return Vec::new();
                }

                self.loading = false;
                self.pending_forecast = None;
                match result {
                    Ok(payload) => {
                        self.forecast = Some(payload);
                        self.forecast_error = None;
                        if persist {
                            vec![Effect::PersistCity(city)]
                        } else {
                            Vec::new()
                        }
                    }
                    Err(err) => {
                        self.forecast_error = Some(err.to_string());
                        Vec::new()
                    }
                }
            }
        }
    }

    fn select(&mut self, name: String) -> Vec<Effect> {
        self.candidates.clear();
        self.search_visible = false;
        self.invalidate_search();
        vec![self.begin_forecast(name, true)]
    }

    fn begin_forecast(&mut self, city: String, persist: bool) -> Effect {
        self.loading = true;
        self.forecast_seq += 1;
        self.pending_forecast = Some(self.forecast_seq);
        Effect::FetchForecast {
            seq: self.forecast_seq,
            city,
            days: self.days,
            persist,
        }
    }

    fn invalidate_search(&mut self) {
        self.search_seq += 1;
        self.pending_search = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResolvedLocation;

    fn candidate(name: &str, country: &str) -> LocationCandidate {
        serde_json::from_value(serde_json::json!({ "name": name, "country": country })).unwrap()
    }

    fn payload(name: &str) -> ForecastPayload {
        ForecastPayload {
            location: ResolvedLocation {
                name: name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn decode_error() -> FetchError {
        FetchError::Decode {
            endpoint: "forecast.json",
            source: serde_json::from_str::<u8>("nope").unwrap_err(),
        }
    }

    fn search_seq(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::SearchLocations { seq, .. }] => *seq,
            other => panic!("expected a single search, got {other:?}"),
        }
    }

    fn forecast_seq(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::FetchForecast { seq, .. }] => *seq,
            other => panic!("expected a single forecast fetch, got {other:?}"),
        }
    }

    fn with_candidates(names: &[&str]) -> LookupState {
        let mut state = LookupState::default();
        state.apply(Action::ToggleSearch);
        let seq = search_seq(&state.apply(Action::SearchDue { query: "abc".into() }));
        state.apply(Action::SearchResolved {
            seq,
            result: Ok(names.iter().map(|n| candidate(n, "X")).collect()),
        });
        state
    }

    #[test]
    fn initial_state_is_loading_with_nothing_shown() {
        let state = LookupState::default();

        assert!(state.loading());
        assert!(!state.search_visible());
        assert!(state.candidates().is_empty());
        assert!(state.forecast().is_none());
        assert!(!state.is_fetching());
    }

    #[test]
    fn fetching_tracks_only_the_latest_forecast() {
        let mut state = LookupState::default();
        let first = forecast_seq(&state.apply(Action::CitySelected { name: "Paris".into() }));
        let second = forecast_seq(&state.apply(Action::CitySelected { name: "Oslo".into() }));
        assert!(state.is_fetching());

        state.apply(Action::ForecastResolved {
            seq: first,
            city: "Paris".into(),
            persist: true,
            result: Ok(payload("Paris")),
        });
        assert!(state.is_fetching());

        state.apply(Action::ForecastResolved {
            seq: second,
            city: "Oslo".into(),
            persist: true,
            result: Err(decode_error()),
        });
        assert!(!state.is_fetching());
    }

    #[test]
    fn search_and_forecast_errors_are_kept_apart() {
        let mut state = LookupState::default();
        let seq = forecast_seq(&state.apply(Action::Startup { city: "Atlantis".into() }));
        state.apply(Action::ForecastResolved {
            seq,
            city: "Atlantis".into(),
            persist: false,
            result: Err(decode_error()),
        });

        let seq = search_seq(&state.apply(Action::SearchDue { query: "Lon".into() }));
        state.apply(Action::SearchResolved {
            seq,
            result: Ok(vec![candidate("London", "UK")]),
        });

        assert!(state.search_error().is_none());
        assert!(state.forecast_error().unwrap().contains("forecast.json"));
    }

    #[test]
    fn new_query_clears_previous_search_error() {
        let mut state = LookupState::default();
        let seq = search_seq(&state.apply(Action::SearchDue { query: "Par".into() }));
        state.apply(Action::SearchResolved {
            seq,
            result: Err(decode_error()),
        });
        assert!(state.search_error().is_some());

        assert!(state.apply(Action::SearchDue { query: "Pa".into() }).is_empty());
        assert!(state.search_error().is_none());
    }

    #[test]
    fn startup_fetches_without_persisting() {
        let mut state = LookupState::default();
        let effects = state.apply(Action::Startup { city: "Almaty".into() });

        assert_eq!(
            effects,
            vec![Effect::FetchForecast {
                seq: 1,
                city: "Almaty".into(),
                days: 7,
                persist: false,
            }]
        );

        let effects = state.apply(Action::ForecastResolved {
            seq: 1,
            city: "Almaty".into(),
            persist: false,
            result: Ok(payload("Almaty")),
        });

        assert!(effects.is_empty());
        assert!(!state.loading());
        assert_eq!(state.forecast().unwrap().location.name, "Almaty");
    }

    #[test]
    fn hiding_search_clears_candidates() {
        let mut state = with_candidates(&["London"]);
        assert_eq!(state.candidates().len(), 1);

        state.apply(Action::ToggleSearch);

        assert!(!state.search_visible());
        assert!(state.candidates().is_empty());
    }

    #[test]
    fn short_query_searches_nothing_and_keeps_candidates() {
        let mut state = with_candidates(&["London", "Londrina"]);

        let effects = state.apply(Action::SearchDue { query: "Lo".into() });
        assert!(effects.is_empty());
        assert_eq!(state.candidates().len(), 2);

        let effects = state.apply(Action::SearchDue { query: "  Lo   ".into() });
        assert!(effects.is_empty());
    }

    #[test]
    fn three_char_query_searches_trimmed_text() {
        let mut state = LookupState::default();
        let effects = state.apply(Action::SearchDue { query: " Lon ".into() });

        assert_eq!(
            effects,
            vec![Effect::SearchLocations {
                seq: 1,
                query: "Lon".into(),
            }]
        );
        assert!(state.is_searching());
    }

    #[test]
    fn stale_search_result_is_dropped() {
        let mut state = LookupState::default();
        let first = search_seq(&state.apply(Action::SearchDue { query: "Lon".into() }));
        let second = search_seq(&state.apply(Action::SearchDue { query: "Londo".into() }));

        state.apply(Action::SearchResolved {
            seq: second,
            result: Ok(vec![candidate("London", "UK")]),
        });
        state.apply(Action::SearchResolved {
            seq: first,
            result: Ok(vec![candidate("Longyearbyen", "Norway"), candidate("Lonoke", "USA")]),
        });

        assert_eq!(state.candidates().len(), 1);
        assert_eq!(state.candidates()[0].name, "London");
        assert!(!state.is_searching());
    }

    #[test]
    fn failed_search_keeps_previous_candidates() {
        let mut state = with_candidates(&["London"]);
        let seq = search_seq(&state.apply(Action::SearchDue { query: "Par".into() }));

        state.apply(Action::SearchResolved {
            seq,
            result: Err(decode_error()),
        });

        assert_eq!(state.candidates()[0].name, "London");
        assert!(state.search_error().is_some());
        assert!(!state.is_searching());
    }

    #[test]
    fn picking_candidate_clears_list_and_starts_loading() {
        let mut state = with_candidates(&["London"]);
        state.apply(Action::Startup { city: "Almaty".into() });
        state.apply(Action::ForecastResolved {
            seq: 1,
            city: "Almaty".into(),
            persist: false,
            result: Ok(payload("Almaty")),
        });

        let effects = state.apply(Action::CandidatePicked { index: 0 });

        assert_eq!(
            effects,
            vec![Effect::FetchForecast {
                seq: 2,
                city: "London".into(),
                days: 7,
                persist: true,
            }]
        );
        assert!(state.loading());
        assert!(!state.search_visible());
        assert!(state.candidates().is_empty());

        let effects = state.apply(Action::ForecastResolved {
            seq: 2,
            city: "London".into(),
            persist: true,
            result: Ok(payload("London")),
        });

        assert_eq!(effects, vec![Effect::PersistCity("London".into())]);
        assert!(!state.loading());
        assert_eq!(state.forecast().unwrap().location.name, "London");
    }

    #[test]
    fn out_of_range_pick_is_ignored() {
        let mut state = with_candidates(&["London"]);
        assert!(state.apply(Action::CandidatePicked { index: 5 }).is_empty());
        assert_eq!(state.candidates().len(), 1);
    }

    #[test]
    fn search_in_flight_at_selection_cannot_repopulate_list() {
        let mut state = LookupState::default();
        let seq = search_seq(&state.apply(Action::SearchDue { query: "Lon".into() }));
        state.apply(Action::CitySelected { name: "Paris".into() });

        state.apply(Action::SearchResolved {
            seq,
            result: Ok(vec![candidate("London", "UK")]),
        });

        assert!(state.candidates().is_empty());
    }

    #[test]
    fn newer_forecast_wins_over_late_older_one() {
        let mut state = LookupState::default();
        let paris = forecast_seq(&state.apply(Action::CitySelected { name: "Paris".into() }));
        let oslo = forecast_seq(&state.apply(Action::CitySelected { name: "Oslo".into() }));

        let effects = state.apply(Action::ForecastResolved {
            seq: oslo,
            city: "Oslo".into(),
            persist: true,
            result: Ok(payload("Oslo")),
        });
        assert_eq!(effects, vec![Effect::PersistCity("Oslo".into())]);

        let effects = state.apply(Action::ForecastResolved {
            seq: paris,
            city: "Paris".into(),
            persist: true,
            result: Ok(payload("Paris")),
        });

        assert!(effects.is_empty());
        assert_eq!(state.forecast().unwrap().location.name, "Oslo");
    }

    #[test]
    fn failed_forecast_keeps_previous_payload_and_stops_loading() {
        let mut state = LookupState::default();
        state.apply(Action::Startup { city: "Almaty".into() });
        state.apply(Action::ForecastResolved {
            seq: 1,
            city: "Almaty".into(),
            persist: false,
            result: Ok(payload("Almaty")),
        });

        let seq = forecast_seq(&state.apply(Action::CitySelected { name: "Atlantis".into() }));
        let effects = state.apply(Action::ForecastResolved {
            seq,
            city: "Atlantis".into(),
            persist: true,
            result: Err(decode_error()),
        });

        assert!(effects.is_empty());
        assert!(!state.loading());
        assert_eq!(state.forecast().unwrap().location.name, "Almaty");
        assert!(state.forecast_error().unwrap().contains("forecast.json"));
    }

    #[test]
    fn reselecting_same_city_fetches_again() {
        let mut state = LookupState::default();
        let first = forecast_seq(&state.apply(Action::CitySelected { name: "London".into() }));
        state.apply(Action::ForecastResolved {
            seq: first,
            city: "London".into(),
            persist: true,
            result: Ok(payload("London")),
        });

        let second = forecast_seq(&state.apply(Action::CitySelected { name: "London".into() }));
        assert!(second > first);

        let effects = state.apply(Action::ForecastResolved {
            seq: second,
            city: "London".into(),
            persist: true,
            result: Ok(payload("London")),
        });
        assert_eq!(effects, vec![Effect::PersistCity("London".into())]);
    }
}
