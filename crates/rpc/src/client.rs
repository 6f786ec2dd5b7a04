use std::time::Duration;

use checkpointz_types::{
    primitives::Slot,
    response::ApiResponse,
    slot::{BeaconSlot, BeaconSlots, SlotDetail},
    status::Status,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RpcError;

pub const STATUS_PATH: &str = "/checkpointz/v1/status";
pub const BEACON_SLOTS_PATH: &str = "/checkpointz/v1/beacon/slots";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub fn beacon_slot_path(slot: Slot) -> String {
    format!("{BEACON_SLOTS_PATH}/{slot}")
}

/// Read-only client for a Checkpointz instance.
#[derive(Debug, Clone)]
pub struct CheckpointzClient {
    http: reqwest::Client,
    base_url: String,
}

impl CheckpointzClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let invalid = |reason: String| RpcError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("checkpointz-dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| invalid(err.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn status(&self) -> Result<Status, RpcError> {
        self.get(STATUS_PATH).await
    }

    pub async fn beacon_slots(&self) -> Result<Vec<BeaconSlot>, RpcError> {
        let slots: BeaconSlots = self.get(BEACON_SLOTS_PATH).await?;
        Ok(slots.slots)
    }

    pub async fn beacon_slot(&self, slot: Slot) -> Result<SlotDetail, RpcError> {
        self.get(&beacon_slot_path(slot)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RpcError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| RpcError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status { url, status });
        }

        let body = response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|source| {
                if source.is_decode() {
                    RpcError::Decode {
                        url: url.clone(),
                        source,
                    }
                } else {
                    RpcError::Transport {
                        url: url.clone(),
                        source,
                    }
                }
            })?;
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    use super::*;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr) -> CheckpointzClient {
        CheckpointzClient::new(&format!("http://{addr}/"), Duration::from_secs(5)).unwrap()
    }

    fn router() -> Router {
        Router::new()
            .route(
                STATUS_PATH,
                get(|| async {
                    Json(json!({
                        "data": {
                            "upstreams": {
                                "teku": {"name": "teku", "healthy": true, "network_name": "goerli"}
                            },
                            "finality": {"finalized": {"epoch": "42", "root": "0xabc"}},
                            "operating_mode": "light"
                        }
                    }))
                }),
            )
            .route(
                BEACON_SLOTS_PATH,
                get(|| async {
                    Json(json!({"data": {"slots": [{"slot": 1, "epoch": 10}, {"slot": 2, "epoch": 11}]}}))
                }),
            )
            .route(
                "/checkpointz/v1/beacon/slots/:slot",
                get(|Path(slot): Path<u64>| async move {
                    if slot == 404 {
                        return (StatusCode::NOT_FOUND, Json(json!({"message": "not found"})));
                    }
                    (
                        StatusCode::OK,
                        Json(json!({"data": {"block": null, "epoch": slot / 32}})),
                    )
                }),
            )
            .route("/garbage/checkpointz/v1/status", get(|| async { "<html>" }))
    }

    #[tokio::test]
    async fn test_status() {
        let addr = serve(router()).await;

        let status = client(addr).status().await.unwrap();

        assert_eq!(status.upstreams.len(), 1);
        assert_eq!(status.upstreams["teku"].network_name.as_deref(), Some("goerli"));
        assert_eq!(status.finality.unwrap().finalized.unwrap().epoch, 42);
    }

    #[tokio::test]
    async fn test_beacon_slots() {
        let addr = serve(router()).await;

        let slots = client(addr).beacon_slots().await.unwrap();

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].epoch, Some(11));
    }

    #[tokio::test]
    async fn test_beacon_slot() {
        let addr = serve(router()).await;

        let detail = client(addr).beacon_slot(64).await.unwrap();

        assert!(detail.block.is_none());
        assert_eq!(detail.epoch, Some(2));
    }

    #[tokio::test]
    async fn test_error_status() {
        let addr = serve(router()).await;

        let err = client(addr).beacon_slot(404).await.unwrap_err();

        assert!(matches!(err, RpcError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let addr = serve(router()).await;
        let client =
            CheckpointzClient::new(&format!("http://{addr}/garbage"), Duration::from_secs(5))
                .unwrap();

        let err = client.status().await.unwrap_err();

        assert!(matches!(err, RpcError::Decode { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(addr).status().await.unwrap_err();

        assert!(matches!(err, RpcError::Transport { .. }), "{err}");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            CheckpointzClient::new("not a url", DEFAULT_REQUEST_TIMEOUT),
            Err(RpcError::InvalidUrl { .. })
        ));
        assert!(matches!(
            CheckpointzClient::new("ftp://example.org", DEFAULT_REQUEST_TIMEOUT),
            Err(RpcError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_paths() {
        assert_eq!(beacon_slot_path(529024), "/checkpointz/v1/beacon/slots/529024");
        let client =
            CheckpointzClient::new("https://sync.example.org/", DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "https://sync.example.org");
    }
}
