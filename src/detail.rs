//! Country detail view state
//!
//! The lookup and the weather sub-fetch are tracked separately; a weather
//! failure never touches a resolved country. Results that arrive after the
//! view was unmounted are dropped instead of applied.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::gateway::WeatherApi;
use crate::model::{Country, WeatherSnapshot};
use crate::store::CountryStore;

/// Message shown in place of the weather section when its request fails
pub const WEATHER_FAILURE: &str = "Failed to fetch weather data";

/// Shared flag telling pending work whether its view still exists
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the view as gone; every clone observes it
    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Country lookup progress
#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    Idle,
    Loading,
    Found(Country),
    /// Terminal: the loaded collection has no such country
    NotFound,
    /// The collection could not be loaded
    Failed(String),
}

/// Weather sub-fetch progress
///
/// Stays `Idle` for countries without a capital.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherState {
    Idle,
    Loading,
    Ready(WeatherSnapshot),
    Failed(String),
}

/// Find a country by case-insensitive exact common name
pub fn find_country<'a>(countries: &'a [Country], name: &str) -> Option<&'a Country> {
    countries.iter().find(|country| country.matches_name(name))
}

/// One mounted detail view
#[derive(Debug)]
pub struct CountryDetail {
    name: String,
    liveness: Liveness,
    lookup: LookupState,
    weather: WeatherState,
}

impl CountryDetail {
    /// Mount a view for a route parameter (URL-encoded common name)
    pub fn mount(param: &str) -> Self {
        let name = urlencoding::decode(param)
            .unwrap_or(Cow::Borrowed(param))
            .into_owned();
        debug!(name = %name, "detail view mounted");
        Self {
            name,
            liveness: Liveness::new(),
            lookup: LookupState::Idle,
            weather: WeatherState::Idle,
        }
    }

    /// Decoded country name this view looks up
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn unmount(&self) {
        self.liveness.release();
    }

    pub fn lookup(&self) -> &LookupState {
        &self.lookup
    }

    pub fn weather(&self) -> &WeatherState {
        &self.weather
    }

    pub fn country(&self) -> Option<&Country> {
        match &self.lookup {
            LookupState::Found(country) => Some(country),
            _ => None,
        }
    }

    /// Resolve the country, then the weather for its first capital
    pub async fn resolve(&mut self, store: &CountryStore, weather: &dyn WeatherApi) {
        if !self.liveness.is_alive() {
            return;
        }

        self.lookup = LookupState::Loading;
        let state = store.ensure_loaded().await;
        if !self.liveness.is_alive() {
            warn!(name = %self.name, "detail view gone, discarding country lookup");
            return;
        }

        let country = match find_country(&state.items, &self.name) {
            Some(country) => country.clone(),
            None => {
                self.lookup = match state.error {
                    Some(error) if state.items.is_empty() => LookupState::Failed(error),
                    _ => {
                        info!(name = %self.name, "country not found");
                        LookupState::NotFound
                    }
                };
                return;
            }
        };

        let capital = country.first_capital().map(str::to_string);
        self.lookup = LookupState::Found(country);
        let Some(capital) = capital else {
            debug!(name = %self.name, "no capital, skipping weather");
            return;
        };

        self.weather = WeatherState::Loading;
        let result = weather.get_weather(&capital).await;
        if !self.liveness.is_alive() {
            warn!(city = %capital, "detail view gone, discarding weather");
            return;
        }

        self.weather = match result {
            Ok(snapshot) => WeatherState::Ready(snapshot),
            Err(err) => {
                warn!(city = %capital, error = %err, "weather fetch failed");
                WeatherState::Failed(WEATHER_FAILURE.to_string())
            }
        };
    }
}

impl Drop for CountryDetail {
    fn drop(&mut self) {
        self.liveness.release();
    }
}
