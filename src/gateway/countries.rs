use async_trait::async_trait;
use tracing::debug;

use super::{CountriesApi, Gateway};
use crate::config::endpoint;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::model::{Country, COUNTRY_FIELDS};

#[async_trait]
impl CountriesApi for Gateway {
    async fn list_countries(&self) -> Result<Vec<Country>> {
        let url = endpoint(&self.config.countries_url, "all");
        let countries = Fetch::get(&self.http_client, &url)
            .query("fields", COUNTRY_FIELDS)
            .execute::<Vec<Country>>()
            .await?;
        debug!(count = countries.len(), "countries received");
        Ok(countries)
    }
}
