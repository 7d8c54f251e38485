use pluridesk_service::config::{Config, DatabaseConfig, ServerConfig};
use pluridesk_service::Application;
use serde_json::{json, Value};
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub owner_id: Uuid,
}

impl TestApp {
    /// Spawn the app against `TEST_DATABASE_URL`. Returns `None` when the
    /// variable is not set so tests can skip instead of failing on machines
    /// without Postgres. Every spawn gets a fresh owner id, which keeps test
    /// data isolated even on a shared database.
    pub async fn spawn() -> Option<Self> {
        let db_url = std::env::var("TEST_DATABASE_URL").ok()?;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: db_url,
                max_connections: 5,
                min_connections: 1,
            },
            owner_id: Uuid::new_v4(),
            log_level: "info".to_string(),
            service_name: "pluridesk-service-test".to_string(),
        };

        let app = Application::build(config.clone())
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        Some(TestApp {
            address,
            client,
            owner_id: config.owner_id,
        })
    }

    pub async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(&body)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("request failed")
    }

    pub async fn patch(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .patch(format!("{}{}", self.address, path))
            .json(&body)
            .send()
            .await
            .expect("request failed")
    }

    /// Create a client and return its id.
    pub async fn seed_client(&self, name: &str, currency: &str) -> Uuid {
        let resp = self
            .post("/clients", json!({ "name": name, "default_currency": currency }))
            .await;
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.expect("invalid json");
        body["client_id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("client_id missing")
    }

    /// Create a flat-fee job for a client and return its id.
    pub async fn seed_flat_fee_job(&self, client_id: Uuid, title: &str, rate: f64) -> Uuid {
        let resp = self
            .post(
                "/jobs",
                json!({
                    "client_id": client_id,
                    "title": title,
                    "pricing_type": "flat_fee",
                    "rate": rate,
                }),
            )
            .await;
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.expect("invalid json");
        body["job_id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("job_id missing")
    }
}
