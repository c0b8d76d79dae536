use async_trait::async_trait;
use serde_json::Value;

use super::{Gateway, WeatherApi};
use crate::config::endpoint;
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::model::WeatherSnapshot;

#[async_trait]
impl WeatherApi for Gateway {
    async fn get_weather(&self, city: &str) -> Result<WeatherSnapshot> {
        if city.trim().is_empty() {
            return Err(Error::validation("city name must not be empty"));
        }

        let url = endpoint(&self.config.weather_url, "weather");
        let mut request = Fetch::get(&self.http_client, &url)
            .query("q", city)
            .query("units", &self.config.weather_units);
        if let Some(key) = &self.config.weather_api_key {
            request = request.query("appid", key);
        }

        let raw = request.execute::<Value>().await?;
        Ok(WeatherSnapshot::new(city, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtlasConfig;
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> Gateway {
        let config = AtlasConfig::new(&server.uri(), "anon")
            .unwrap()
            .with_weather_url(&server.uri())
            .unwrap()
            .with_weather_api_key(Some("secret".to_string()));
        Gateway::new(config).unwrap()
    }

    #[tokio::test]
    async fn queries_by_city_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Buenos Aires"))
            .and(query_param("appid", "secret"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Buenos Aires",
                "weather": [{ "description": "clear sky" }],
                "main": { "temp": 22.0 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = gateway(&server).get_weather("Buenos Aires").await.unwrap();
        assert_eq!(snapshot.city, "Buenos Aires");
        assert_eq!(snapshot.conditions.temperature, Some(22.0));
        assert_eq!(snapshot.raw["name"], "Buenos Aires");
    }

    #[tokio::test]
    async fn unknown_city_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&server)
            .await;

        let err = gateway(&server).get_weather("Atlantis").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn empty_city_is_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(gateway(&server).get_weather("  ").await.is_err());
    }

    /// Log sink shared with the test body
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn api_key_stays_out_of_debug_log() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("appid", "TOPSECRETKEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "main": { "temp": 9.0 } })))
            .expect(1)
            .mount(&server)
            .await;

        let config = AtlasConfig::new(&server.uri(), "anon")
            .unwrap()
            .with_weather_url(&server.uri())
            .unwrap()
            .with_weather_api_key(Some("TOPSECRETKEY".to_string()));
        let gateway = Gateway::new(config).unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        gateway.get_weather("Paris").await.unwrap();

        let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("provider request"));
        assert!(out.contains("/weather"));
        assert!(out.contains("appid"));
        assert!(!out.contains("TOPSECRETKEY"));
    }

    #[tokio::test]
    async fn transport_error_does_not_carry_api_key() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };
        let config = AtlasConfig::new(&uri, "anon")
            .unwrap()
            .with_weather_url(&uri)
            .unwrap()
            .with_weather_api_key(Some("TOPSECRETKEY".to_string()));

        let err = Gateway::new(config)
            .unwrap()
            .get_weather("Paris")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(!err.to_string().contains("TOPSECRETKEY"));
    }
}
