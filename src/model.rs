//! Records returned by the countries and weather providers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields requested from the countries provider
pub const COUNTRY_FIELDS: &str = "name,capital,region,subregion,population,currencies,flags,cca3";

/// Country reference record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// Three-letter code, unique within the collection
    pub cca3: String,
    pub name: CountryName,
    pub region: String,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub capital: Vec<String>,
    pub population: u64,
    /// Currency code to currency
    #[serde(default)]
    pub currencies: BTreeMap<String, Currency>,
    pub flags: Flags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryName {
    pub common: String,
    pub official: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    pub png: String,
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl Country {
    /// First listed capital, used as the weather query key
    pub fn first_capital(&self) -> Option<&str> {
        self.capital.first().map(String::as_str)
    }

    /// Case-insensitive exact match on the common name
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.common.to_lowercase() == name.to_lowercase()
    }
}

/// Current conditions for one city
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// City name the provider was queried with
    pub city: String,
    pub conditions: Conditions,
    /// Provider response as received
    pub raw: Value,
}

/// Typed view of the commonly present fields; everything is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub description: Option<String>,
}

impl Conditions {
    /// Pick known fields out of a provider response
    pub fn from_raw(raw: &Value) -> Self {
        let number = |pointer: &str| raw.pointer(pointer).and_then(Value::as_f64);
        Self {
            temperature: number("/main/temp"),
            feels_like: number("/main/feels_like"),
            humidity: number("/main/humidity"),
            wind_speed: number("/wind/speed"),
            description: raw
                .pointer("/weather/0/description")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

impl WeatherSnapshot {
    pub fn new(city: &str, raw: Value) -> Self {
        Self {
            city: city.to_string(),
            conditions: Conditions::from_raw(&raw),
            raw,
        }
    }
}

/// Backend tables holding test rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTable {
    /// `test_data`, readable without a session
    Public,
    /// `protected_data`, readable and writable only with a session
    Protected,
}

impl DataTable {
    pub fn name(&self) -> &'static str {
        match self {
            DataTable::Public => "test_data",
            DataTable::Protected => "protected_data",
        }
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, DataTable::Protected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn country_with_optional_fields_missing() {
        let country: Country = serde_json::from_value(json!({
            "cca3": "ATA",
            "name": { "common": "Antarctica", "official": "Antarctica" },
            "region": "Antarctic",
            "population": 1000,
            "flags": { "png": "https://flagcdn.com/w320/aq.png" }
        }))
        .unwrap();

        assert!(country.capital.is_empty());
        assert!(country.first_capital().is_none());
        assert!(country.currencies.is_empty());
        assert!(country.subregion.is_none());
        assert!(country.matches_name("ANTARCTICA"));
    }

    #[test]
    fn conditions_from_provider_json() {
        let snapshot = WeatherSnapshot::new(
            "Paris",
            json!({
                "weather": [{ "main": "Clouds", "description": "broken clouds" }],
                "main": { "temp": 18.5, "feels_like": 17.9, "humidity": 60 },
                "wind": { "speed": 4.1 }
            }),
        );

        assert_eq!(snapshot.city, "Paris");
        assert_eq!(snapshot.conditions.temperature, Some(18.5));
        assert_eq!(snapshot.conditions.humidity, Some(60.0));
        assert_eq!(snapshot.conditions.description.as_deref(), Some("broken clouds"));
    }

    #[test]
    fn conditions_tolerate_unknown_shape() {
        let conditions = Conditions::from_raw(&json!({ "current": { "temp_c": 20 } }));
        assert_eq!(conditions, Conditions::default());
    }
}
