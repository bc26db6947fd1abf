use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::client::ApiClient;
use super::error::ApiError;
use crate::logic::parsing::{listing_items, service_names};
use crate::models::ServiceRecord;

pub const SERVICES_PATH: &str = "api/db/services";
pub const LIST_PAGE_SIZE: u32 = 1000;

/// Read access to service configuration records.
#[async_trait]
pub trait ServiceCatalog {
    /// Names of every known service.
    async fn list_service_names(&self) -> Result<Vec<String>, ApiError>;

    /// The record stored under `name`, or `None` when there is none.
    async fn find_service(&self, name: &str) -> Result<Option<ServiceRecord>, ApiError>;
}

#[async_trait]
impl ServiceCatalog for ApiClient {
    async fn list_service_names(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(SERVICES_PATH.split('/'), &[("limit", LIST_PAGE_SIZE.to_string())])?;
        let body = self.get_json(url).await?;
        Ok(service_names(&body))
    }

    async fn find_service(&self, name: &str) -> Result<Option<ServiceRecord>, ApiError> {
        let url = self.endpoint(
            SERVICES_PATH.split('/'),
            &[("name", name.to_string()), ("limit", "1".to_string())],
        )?;
        let body = self.get_json(url.clone()).await?;

        match listing_items(&body).first() {
            Some(entry) => serde_json::from_value(entry.clone())
                .map(Some)
                .map_err(|source| ApiError::Decode {
                    url: url.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }
}

impl ApiClient {
    /// Partially update the service document `name` with `body`.
    pub async fn update_service(&self, name: &str, body: &Value) -> Result<(StatusCode, String), ApiError> {
        let url = self.endpoint(SERVICES_PATH.split('/').chain([name]), &[])?;
        self.put_json(url, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer one HTTP request with `status` and `body`; the handle yields
    /// the request line that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (ApiClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        let client = ApiClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        (client, handle)
    }

    #[tokio::test]
    async fn test_list_service_names_requests_one_page() {
        let (client, server) = serve_once("200 OK", r#"{"items":[{"name":"a"},{"service_name":"b"}]}"#).await;
        let names = client.list_service_names().await.unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(server.await.unwrap(), "GET /api/db/services?limit=1000 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_find_service_reads_first_wrapped_item() {
        let (client, server) = serve_once("200 OK", r#"{"items":[{"name":"orders","port":7000}]}"#).await;
        let record = client.find_service("orders").await.unwrap().unwrap();
        assert_eq!(record.name, "orders");
        assert_eq!(record.port, Some(7000));
        assert_eq!(
            server.await.unwrap(),
            "GET /api/db/services?name=orders&limit=1 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_find_service_empty_answer_is_none() {
        let (client, _server) = serve_once("200 OK", "[]").await;
        assert!(client.find_service("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_service_error_status() {
        let (client, _server) = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;
        match client.find_service("orders").await.unwrap_err() {
            ApiError::Status { status, body, url } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.contains("boom"));
                assert!(url.ends_with("/api/db/services?name=orders&limit=1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_find_service_undecodable_record() {
        let (client, _server) = serve_once("200 OK", r#"[{"name":"orders","port":"seven"}]"#).await;
        let err = client.find_service("orders").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert!(err.url().ends_with("?name=orders&limit=1"), "{}", err.url());
    }

    #[tokio::test]
    async fn test_find_service_non_json_body() {
        let (client, _server) = serve_once("200 OK", "<html>").await;
        assert!(matches!(
            client.find_service("orders").await.unwrap_err(),
            ApiError::Decode { .. }
        ));
    }

    #[tokio::test]
    async fn test_update_service_encodes_name() {
        let (client, server) = serve_once("200 OK", r#"{"ok":true}"#).await;
        let (status, text) = client
            .update_service("team/orders", &json!({ "argocd_application": { "path": "." } }))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, r#"{"ok":true}"#);
        assert_eq!(
            server.await.unwrap(),
            "PUT /api/db/services/team%2Forders HTTP/1.1"
        );
    }
}
