//! Orchestrator HTTP client
//!
//! Thin typed wrapper over `reqwest`. Every failure maps onto a transient
//! [`HoloError`]; the caller decides whether to retry on the next poll.

use std::time::Duration;

use holo_core::{HoloError, HoloResult, StateSnapshot};
use holo_face::VisemeTrack;
use reqwest::{Client, Response};
use tracing::{debug, trace};

/// Default orchestrator address
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the orchestrator service
#[derive(Clone, Debug)]
pub struct OrchestratorClient {
    http: Client,
    base_url: String,
}

impl OrchestratorClient {
    pub fn new(base_url: impl Into<String>) -> HoloResult<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> HoloResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HoloError::Config(format!("http client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a possibly relative asset reference against the base URL
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{url}", self.base_url)
        } else {
            format!("{}/{url}", self.base_url)
        }
    }

    /// `GET /poll_state`
    pub async fn poll_state(&self) -> HoloResult<StateSnapshot> {
        let url = format!("{}/poll_state", self.base_url);
        trace!(url = %url, "polling state");

        let resp = self.http.get(&url).send().await.map_err(transport)?;
        let resp = check_status(resp, &url)?;
        let bytes = resp.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|e| HoloError::MalformedPayload(e.to_string()))
    }

    /// `POST /reset_state`
    pub async fn reset_state(&self) -> HoloResult<()> {
        self.post_empty("reset_state").await
    }

    /// `POST /generate_goodbye`
    pub async fn generate_goodbye(&self) -> HoloResult<()> {
        self.post_empty("generate_goodbye").await
    }

    /// `GET {viseme_url}` and parse the cue document
    pub async fn fetch_visemes(&self, viseme_url: &str) -> HoloResult<VisemeTrack> {
        let url = self.resolve(viseme_url);
        debug!(url = %url, "fetching viseme track");

        let resp = self.http.get(&url).send().await.map_err(transport)?;
        let resp = check_status(resp, &url)?;
        let bytes = resp.bytes().await.map_err(transport)?;
        VisemeTrack::from_slice(&bytes)
    }

    async fn post_empty(&self, endpoint: &str) -> HoloResult<()> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, "posting command");

        let resp = self.http.post(&url).send().await.map_err(transport)?;
        check_status(resp, &url)?;
        Ok(())
    }
}

fn transport(e: reqwest::Error) -> HoloError {
    HoloError::Transport(e.to_string())
}

fn check_status(resp: Response, url: &str) -> HoloResult<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(HoloError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::Router;
    use holo_core::{OrchestratorStatus, UpdateId};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_resolve() {
        let client = OrchestratorClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.resolve("/audio/a.json"),
            "http://localhost:5000/audio/a.json"
        );
        assert_eq!(client.resolve("audio/a.json"), "http://localhost:5000/audio/a.json");
        assert_eq!(client.resolve("https://cdn/a.json"), "https://cdn/a.json");
    }

    #[tokio::test]
    async fn test_poll_state() {
        let router = Router::new().route(
            "/poll_state",
            get(|| async {
                r#"{"status":"SPEAKING","audio_url":"/a.wav","viseme_url":"/a.json",
                    "trigger_carousel":false,"asins":["B1"],"gesture":"talk","last_update_id":12}"#
            }),
        );
        let client = OrchestratorClient::new(serve(router).await).unwrap();

        let snap = client.poll_state().await.unwrap();
        assert_eq!(snap.update_id, UpdateId::new(12));
        assert_eq!(snap.status, OrchestratorStatus::Speaking);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_http_status() {
        let router = Router::new()
            .route("/reset_state", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/poll_state", get(|| async { "not json" }));
        let client = OrchestratorClient::new(serve(router).await).unwrap();

        match client.reset_state().await {
            Err(HoloError::HttpStatus { status, .. }) => assert_eq!(status, 500),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            client.poll_state().await,
            Err(HoloError::MalformedPayload(_))
        ));
        // No goodbye route at all
        assert!(client.generate_goodbye().await.unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_fetch_visemes() {
        let router = Router::new().route(
            "/audio/a.json",
            get(|| async {
                r#"{"metadata":{"duration":0.6},"mouthCues":[
                    {"start":0.0,"end":0.3,"value":"A"},
                    {"start":0.3,"end":0.6,"value":"D"}]}"#
            }),
        );
        let client = OrchestratorClient::new(serve(router).await).unwrap();

        let track = client.fetch_visemes("/audio/a.json").await.unwrap();
        assert_eq!(track.len(), 2);
        assert!((track.duration() - 0.6).abs() < 1e-9);
    }
}
