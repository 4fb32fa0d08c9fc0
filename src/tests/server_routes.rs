#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use httpmock::Method::POST;
    use httpmock::MockServer;
    use http::StatusCode;
    use serde_json::{json, Value};

    use crate::config::settings::{MetricsConfig, SettingsConfig};
    use crate::provider::{ProviderOptions, TokenProvider};
    use crate::server::server::app;
    use crate::server::token_routes::{ACCESS_TOKEN_PATH, ID_TOKEN_PATH};
    use crate::tests::common::{build_reqwest_client, credentials_bytes, spawn_axum};

    fn settings() -> SettingsConfig {
        SettingsConfig {
            metrics: MetricsConfig {
                path: "/metrics".into(),
                is_enabled: true,
            },
            ..Default::default()
        }
    }

    fn provider(server: &MockServer) -> Arc<TokenProvider> {
        let options = ProviderOptions::new(["scope-a"]).with_target_audience("https://service.example");
        Arc::new(TokenProvider::new(&credentials_bytes(&server.url("/token")), options).unwrap())
    }

    #[tokio::test]
    async fn serves_cached_access_token() {
        let token_server = MockServer::start_async().await;
        let mock = token_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .header("content-type", "application/json");
                then.status(200).json_body(json!({
                    "access_token": "AT-http",
                    "token_type": "Bearer",
                    "expires_in": 3600
                }));
            })
            .await;
        let (_handle, addr) = spawn_axum(app(&settings(), provider(&token_server))).await;
        let client = build_reqwest_client();
        let url = format!("http://{}{}", addr, ACCESS_TOKEN_PATH);

        for _ in 0..3 {
            let response = client.get(&url).send().await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body["access_token"], "AT-http");
            assert_eq!(body["token_type"], "Bearer");
            let expires_in = body["expires_in"].as_i64().unwrap();
            assert!(expires_in > 3500 && expires_in <= 3600, "{expires_in}");
        }

        // exactly one exchange behind three requests
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn serves_id_token() {
        let token_server = MockServer::start_async().await;
        token_server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({ "id_token": "ID-http" }));
            })
            .await;
        let (_handle, addr) = spawn_axum(app(&settings(), provider(&token_server))).await;

        let response = build_reqwest_client()
            .get(format!("http://{}{}", addr, ID_TOKEN_PATH))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "id_token": "ID-http" }));
    }

    #[tokio::test]
    async fn exchange_failure_is_bad_gateway() {
        let token_server = MockServer::start_async().await;
        token_server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(500).body("upstream down");
            })
            .await;
        let (_handle, addr) = spawn_axum(app(&settings(), provider(&token_server))).await;

        let response = build_reqwest_client()
            .get(format!("http://{}{}", addr, ACCESS_TOKEN_PATH))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.text().await.unwrap().contains("upstream down"));
    }

    #[tokio::test]
    async fn metrics_route_exposes_exchange_counters() {
        let token_server = MockServer::start_async().await;
        token_server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({
                    "access_token": "AT-metrics",
                    "token_type": "Bearer"
                }));
            })
            .await;
        let (_handle, addr) = spawn_axum(app(&settings(), provider(&token_server))).await;
        let client = build_reqwest_client();

        client
            .get(format!("http://{}{}", addr, ACCESS_TOKEN_PATH))
            .send()
            .await
            .unwrap();
        let metrics = client
            .get(format!("http://{}/metrics", addr))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(metrics.contains("satokenagent_exchange_requests_total"), "{metrics}");
    }

    #[tokio::test]
    async fn metrics_route_is_absent_when_disabled() {
        let token_server = MockServer::start_async().await;
        let (_handle, addr) = spawn_axum(app(&SettingsConfig::default(), provider(&token_server))).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/metrics", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
