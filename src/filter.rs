//! Search and region filtering of the country list

use std::collections::BTreeSet;

use crate::model::Country;

/// Search text and selected region of the country list
///
/// Empty strings mean "no filter". Both filters apply together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryFilter {
    pub search: String,
    pub region: String,
}

impl CountryFilter {
    pub fn new(search: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            region: region.into(),
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_region(&mut self, region: impl Into<String>) {
        self.region = region.into();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn clear_region(&mut self) {
        self.region.clear();
    }

    /// Reset both filters at once
    pub fn clear_all(&mut self) {
        self.clear_search();
        self.clear_region();
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !self.region.is_empty()
    }

    /// Labels of the filters in effect
    pub fn chips(&self) -> Vec<String> {
        let mut chips = Vec::new();
        if !self.search.is_empty() {
            chips.push(format!("Search: {}", self.search));
        }
        if !self.region.is_empty() {
            chips.push(format!("Region: {}", self.region));
        }
        chips
    }

    /// Matching countries in their original order
    pub fn apply<'a>(&self, countries: &'a [Country]) -> Vec<&'a Country> {
        filter_countries(countries, &self.search, &self.region)
    }
}

/// Countries whose common name or first capital contains `search`
/// (case-insensitively) and whose region equals `region` exactly
pub fn filter_countries<'a>(countries: &'a [Country], search: &str, region: &str) -> Vec<&'a Country> {
    let needle = search.to_lowercase();
    countries
        .iter()
        .filter(|country| {
            search.is_empty()
                || country.name.common.to_lowercase().contains(&needle)
                || country
                    .first_capital()
                    .is_some_and(|capital| capital.to_lowercase().contains(&needle))
        })
        .filter(|country| region.is_empty() || country.region == region)
        .collect()
}

/// Distinct regions of the collection, sorted ascending
pub fn region_options(countries: &[Country]) -> Vec<String> {
    countries
        .iter()
        .map(|country| country.region.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
