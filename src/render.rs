//! Plain-text views over store snapshots

use std::fmt::Write;

use chrono::{DateTime, Utc};
use num_format::{Locale, ToFormattedString};

use crate::detail::{CountryDetail, LookupState, WeatherState};
use crate::filter::CountryFilter;
use crate::model::{Country, DataTable, WeatherSnapshot};
use crate::routes::NavItem;
use crate::row::{TableView, TestRow};
use crate::store::FetchState;

pub fn population(value: u64) -> String {
    value.to_formatted_string(&Locale::en)
}

fn currency_label(name: &str, symbol: Option<&str>) -> String {
    match symbol {
        Some(symbol) => format!("{} ({})", name, symbol),
        None => name.to_string(),
    }
}

/// Currencies as shown on a list card
pub fn card_currencies(country: &Country) -> String {
    if country.currencies.is_empty() {
        return "N/A".to_string();
    }
    country
        .currencies
        .values()
        .map(|c| currency_label(&c.name, c.symbol.as_deref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Currencies with their codes, as shown on the detail view
pub fn detail_currencies(country: &Country) -> String {
    if country.currencies.is_empty() {
        return "None".to_string();
    }
    country
        .currencies
        .iter()
        .map(|(code, c)| format!("{} [{}]", currency_label(&c.name, c.symbol.as_deref()), code))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn region_line(country: &Country) -> String {
    match &country.subregion {
        Some(subregion) => format!("{} ({})", country.region, subregion),
        None => country.region.clone(),
    }
}

pub fn flag_alt(country: &Country) -> String {
    country
        .flags
        .alt
        .clone()
        .unwrap_or_else(|| format!("Flag of {}", country.name.common))
}

/// One country of the list
pub fn country_card(country: &Country) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", country.name.common, country.cca3);
    let _ = writeln!(out, "  Region:     {}", region_line(country));
    if let Some(capital) = country.first_capital() {
        let _ = writeln!(out, "  Capital:    {}", capital);
    }
    let _ = writeln!(out, "  Population: {}", population(country.population));
    let _ = writeln!(out, "  Currencies: {}", card_currencies(country));
    let _ = writeln!(out, "  Flag:       {} ({})", country.flags.png, flag_alt(country));
    out
}

/// The countries list with its filters applied
pub fn country_list(state: &FetchState<Country>, filter: &CountryFilter) -> String {
    if state.loading && state.is_empty() {
        return "Loading countries...\n".to_string();
    }
    if let Some(error) = &state.error {
        return format!("Error: {}\n", error);
    }

    let visible = filter.apply(&state.items);
    let mut out = String::new();
    let chips = filter.chips();
    if !chips.is_empty() {
        let _ = writeln!(out, "Filters: {} | Clear all", chips.join(" | "));
    }
    let _ = writeln!(
        out,
        "Showing {} of {} countries",
        visible.len(),
        state.items.len()
    );

    if visible.is_empty() {
        let _ = writeln!(out, "No countries found matching your criteria");
        return out;
    }
    for country in visible {
        out.push('\n');
        out.push_str(&country_card(country));
    }
    out
}

pub fn weather(state: &WeatherState) -> String {
    match state {
        WeatherState::Idle => String::new(),
        WeatherState::Loading => "Loading weather...\n".to_string(),
        WeatherState::Failed(message) => format!("{}\n", message),
        WeatherState::Ready(snapshot) => weather_snapshot(snapshot),
    }
}

fn weather_snapshot(snapshot: &WeatherSnapshot) -> String {
    let conditions = &snapshot.conditions;
    let mut out = String::new();
    let _ = writeln!(out, "Weather in {}", snapshot.city);
    if let Some(description) = &conditions.description {
        let _ = writeln!(out, "  Conditions:  {}", description);
    }
    if let Some(temperature) = conditions.temperature {
        let _ = writeln!(out, "  Temperature: {:.1}°", temperature);
    }
    if let Some(feels_like) = conditions.feels_like {
        let _ = writeln!(out, "  Feels like:  {:.1}°", feels_like);
    }
    if let Some(humidity) = conditions.humidity {
        let _ = writeln!(out, "  Humidity:    {}%", humidity);
    }
    if let Some(wind_speed) = conditions.wind_speed {
        let _ = writeln!(out, "  Wind:        {}", wind_speed);
    }
    out
}

/// The detail view: country section, then the independent weather section
pub fn country_detail(detail: &CountryDetail) -> String {
    let mut out = match detail.lookup() {
        LookupState::Idle | LookupState::Loading => return "Loading country...\n".to_string(),
        LookupState::Failed(error) => return format!("Error: {}\n", error),
        LookupState::NotFound => return "Country not found.\n".to_string(),
        LookupState::Found(country) => detail_section(country),
    };

    let weather = weather(detail.weather());
    if !weather.is_empty() {
        out.push('\n');
        out.push_str(&weather);
    }
    out
}

fn detail_section(country: &Country) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", country.name.common);
    let _ = writeln!(out, "{}", country.name.official);
    let _ = writeln!(out, "Region:     {}", region_line(country));
    if !country.capital.is_empty() {
        let _ = writeln!(out, "Capital:    {}", country.capital.join(", "));
    }
    let _ = writeln!(out, "Population: {}", population(country.population));
    let _ = writeln!(out, "Currencies: {}", detail_currencies(country));
    let _ = writeln!(out, "Flag:       {} ({})", country.flags.png, flag_alt(country));
    out
}

/// Rows as an aligned text table
pub fn table(view: &TableView) -> String {
    let mut widths: Vec<usize> = view.headers.iter().map(|h| h.chars().count()).collect();
    for row in &view.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(&view.headers));
    let _ = writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &view.rows {
        let _ = writeln!(out, "{}", line(row));
    }
    out
}

fn empty_message(table: DataTable) -> &'static str {
    match table {
        DataTable::Public => "No data available at this time.",
        DataTable::Protected => "No protected data available. Please create some entries.",
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// A test-data table section
///
/// A failed protected listing still offers the row form.
pub fn rows_section(table: DataTable, state: &FetchState<TestRow>) -> String {
    let mut out = String::new();
    if state.loading && state.is_empty() {
        let _ = writeln!(out, "Loading {}...", table.name());
        return out;
    }

    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {}", error);
        if table.requires_session() {
            let _ = writeln!(out, "{}", FORM_HINT);
        }
        return out;
    }

    if table == DataTable::Public {
        let updated = state
            .fetched_at
            .as_ref()
            .map(timestamp)
            .unwrap_or_else(|| "never".to_string());
        let _ = writeln!(out, "Status: Connected | Last Updated: {}", updated);
    } else {
        let _ = writeln!(out, "{}", FORM_HINT);
    }

    let view = TableView::from_rows(&state.items);
    if view.is_empty() {
        let _ = writeln!(out, "{}", empty_message(table));
    } else {
        out.push_str(&self::table(&view));
    }
    out
}

/// How to create a row from the command line
pub const FORM_HINT: &str = "Create an entry: insert --protected <column=value>...";

pub fn navigation(items: &[NavItem]) -> String {
    items
        .iter()
        .map(|item| item.label.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}
