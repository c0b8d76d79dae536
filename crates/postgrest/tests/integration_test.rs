#![cfg(feature = "integration-tests")]

// Runs against a live project. Requires SUPABASE_URL and SUPABASE_ANON_KEY and a
// readable `test_data` table.

use atlas_postgrest::PostgrestClient;
use reqwest::Client;
use std::env;

fn create_test_client(table: &str) -> PostgrestClient {
    let url = env::var("SUPABASE_URL").expect("SUPABASE_URL must be set for integration tests");
    let key = env::var("SUPABASE_ANON_KEY")
        .expect("SUPABASE_ANON_KEY must be set for integration tests");
    PostgrestClient::new(&url, &key, table, Client::new())
}

#[tokio::test]
async fn test_connection_and_basic_select() {
    let result = create_test_client("test_data")
        .select("*")
        .execute::<serde_json::Value>()
        .await;

    assert!(result.is_ok(), "Failed to select from test_data: {:?}", result.err());
}

#[tokio::test]
async fn test_protected_insert_without_session_is_rejected() {
    let result = create_test_client("protected_data")
        .insert(serde_json::json!({ "name": "anonymous" }))
        .await;

    let err = result.expect_err("anonymous insert into protected_data should fail");
    assert!(err.status().is_some(), "expected an API rejection, got {:?}", err);
}
