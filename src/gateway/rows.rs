use async_trait::async_trait;
use atlas_postgrest::PostgrestClient;
use serde_json::Value;
use tracing::debug;

use super::{Gateway, RowsApi};
use crate::error::{Error, Result};
use crate::model::DataTable;
use crate::row::TestRow;

impl Gateway {
    /// Table client carrying the user's token when one is available
    ///
    /// Protected tables fail with [`Error::Auth`] before any request is made
    /// when there is no live session.
    fn table_client(&self, table: DataTable) -> Result<PostgrestClient> {
        let client = PostgrestClient::new(
            self.config.supabase_url.as_str(),
            &self.config.anon_key,
            table.name(),
            self.http_client.clone(),
        );

        let token = match self.auth.access_token() {
            Ok(token) => Some(token),
            Err(err) if table.requires_session() => return Err(err.into()),
            Err(_) => None,
        };

        match token {
            Some(token) => client.with_auth(&token).map_err(Error::from_select),
            None => Ok(client),
        }
    }
}

#[async_trait]
impl RowsApi for Gateway {
    async fn list_rows(&self, table: DataTable) -> Result<Vec<TestRow>> {
        let rows = self
            .table_client(table)?
            .select("*")
            .execute::<TestRow>()
            .await
            .map_err(Error::from_select)?;
        debug!(table = table.name(), count = rows.len(), "rows received");
        Ok(rows)
    }

    async fn insert_row(&self, table: DataTable, row: &TestRow) -> Result<TestRow> {
        let created = self
            .table_client(table)?
            .insert(row)
            .await
            .map_err(Error::from_insert)?;

        // the write is committed even when no representation comes back
        let created = match created {
            Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
            Value::Object(map) => Value::Object(map),
            _ => {
                debug!(table = table.name(), "insert returned no representation");
                return Ok(row.clone());
            }
        };
        Ok(serde_json::from_value(created)?)
    }
}
