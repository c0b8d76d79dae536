//! Country Atlas client library
//!
//! Browse country reference data, look up the current weather in a
//! country's capital, and read or write test rows in a backend table that
//! is public or restricted to signed-in users.
//!
//! All state lives in an [`Atlas`] value created once at startup and passed
//! to whatever renders it.

pub mod config;
pub mod detail;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod gateway;
pub mod model;
pub mod render;
pub mod routes;
pub mod row;
pub mod store;

use std::sync::Arc;

pub use atlas_auth::Session;
use tracing::info;

use crate::config::AtlasConfig;
use crate::detail::CountryDetail;
use crate::error::Result;
use crate::gateway::{Gateway, RowsApi};
use crate::model::DataTable;
use crate::routes::{NavItem, Route};
use crate::row::TestRow;
use crate::store::{CountriesLoader, CountryStore, RowStore, RowsLoader, Store};

/// Application context: the gateway, the session and one store per domain
pub struct Atlas {
    gateway: Arc<Gateway>,
    countries: CountryStore,
    test_rows: RowStore,
    protected_rows: RowStore,
}

impl Atlas {
    /// Create the context from configuration
    ///
    /// # Example
    ///
    /// ```
    /// use country_atlas::{config::AtlasConfig, Atlas};
    ///
    /// let config = AtlasConfig::new("https://your-project-url.supabase.co", "your-anon-key")?;
    /// let atlas = Atlas::new(config)?;
    /// assert!(atlas.session().is_none());
    /// # Ok::<(), country_atlas::error::Error>(())
    /// ```
    pub fn new(config: AtlasConfig) -> Result<Self> {
        Ok(Self::from_gateway(Arc::new(Gateway::new(config)?)))
    }

    /// Create the context around an existing gateway
    pub fn from_gateway(gateway: Arc<Gateway>) -> Self {
        let countries = Store::new(CountriesLoader::new(gateway.clone()));
        let test_rows = Store::new(RowsLoader::new(gateway.clone(), DataTable::Public));
        let protected_rows = Store::new(RowsLoader::new(gateway.clone(), DataTable::Protected));
        Self {
            gateway,
            countries,
            test_rows,
            protected_rows,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn countries(&self) -> &CountryStore {
        &self.countries
    }

    /// Store of a test table
    pub fn rows(&self, table: DataTable) -> &RowStore {
        match table {
            DataTable::Public => &self.test_rows,
            DataTable::Protected => &self.protected_rows,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.gateway.sign_in(email, password).await
    }

    pub async fn sign_out(&self) {
        self.gateway.sign_out().await
    }

    /// Live session, if any
    pub fn session(&self) -> Option<Session> {
        self.gateway.session()
    }

    pub fn navigation(&self) -> Vec<NavItem> {
        routes::navigation(self.session().as_ref())
    }

    /// Route shown for a requested path, or `None` for unknown paths
    pub fn open(&self, path: &str) -> Option<Route> {
        Route::parse(path).map(|route| route.guard(self.session().as_ref()))
    }

    /// Mount a detail view for a route parameter and resolve it
    pub async fn country_detail(&self, param: &str) -> CountryDetail {
        let mut detail = CountryDetail::mount(param);
        detail.resolve(&self.countries, self.gateway.as_ref()).await;
        detail
    }

    /// Insert a row, then refetch the table it went into
    ///
    /// The cache is only ever replaced by the refetch; a rejected insert
    /// leaves it untouched.
    pub async fn submit_row(&self, table: DataTable, row: &TestRow) -> Result<TestRow> {
        let created = self.gateway.insert_row(table, row).await?;
        info!(table = table.name(), "row created");
        self.rows(table).refresh().await;
        Ok(created)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::AtlasConfig;
    pub use crate::error::{Error, Result};
    pub use crate::filter::CountryFilter;
    pub use crate::model::{Country, DataTable};
    pub use crate::routes::Route;
    pub use crate::row::{Scalar, TestRow};
    pub use crate::Atlas;
}
