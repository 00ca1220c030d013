//! # Airdrop Backend Client
//!
//! JSON-over-HTTP client for the airdrop backend. One `reqwest::Client`
//! with an enabled cookie store carries the session credential for every
//! call; the application never sees the cookie itself.
//!
//! ## Failure Classification
//!
//! Server rejections are classified by HTTP status code only, never by
//! parsing message text:
//!
//! - **401** — the session is missing or expired (`Unauthorized`).
//! - **400** — business-rule rejection (`ValidationRejected`), with the
//!   body decoded into a tagged `ErrorBody` union.
//! - **anything else** — an opaque transport failure.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ErrorBody};
use crate::form::AirdropDefinition;
use crate::state::AirdropStatus;

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub wallet_address: String,
    pub signature: String,
    pub timestamp: u64,
}

/// Successful outcome of `POST /airdrop/create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub message: String,
    pub event_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    message: String,
    data: CreateData,
}

#[derive(Debug, Deserialize)]
struct CreateData {
    #[serde(rename = "eventId")]
    event_id: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    data: AirdropStatus,
}

#[derive(Debug, Default, Deserialize)]
struct RawErrorBody {
    errors: Option<Vec<String>>,
    message: Option<String>,
}

/// Decodes a 400 response body into the tagged error union. An
/// undecodable or shapeless body degrades to `Empty` rather than
/// surfacing a stale or invented message.
pub fn decode_error_body(body: &str) -> ErrorBody {
    let raw: RawErrorBody = serde_json::from_str(body).unwrap_or_default();
    match (raw.errors, raw.message) {
        (Some(errors), _) => ErrorBody::FieldErrors(errors),
        (None, Some(message)) => ErrorBody::SingleMessage(message),
        (None, None) => ErrorBody::Empty,
    }
}

/// Maps a non-success response to the client error taxonomy.
pub fn classify_rejection(status: StatusCode, body: &str) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::BAD_REQUEST => ClientError::ValidationRejected(decode_error_body(body)),
        other => ClientError::Transport(format!("unexpected status {}", other)),
    }
}

/// The backend call surface. The session manager and the lifecycle
/// controller depend on this trait so tests can substitute a stub.
/// Only used as a generic bound, never as a trait object.
#[allow(async_fn_in_trait)]
pub trait AirdropApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<(), ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;
    async fn create(&self, definition: &AirdropDefinition) -> Result<CreateOutcome, ClientError>;
    async fn draw_one(&self, event_id: &str) -> Result<String, ClientError>;
    async fn draw_all(&self, event_id: &str) -> Result<String, ClientError>;
    async fn check_status(&self, event_id: &str) -> Result<AirdropStatus, ClientError>;
}

/// The production client.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and classifies any non-success response.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!("Backend rejected request: {} {}", status, body);
        Err(classify_rejection(status, &body))
    }
}

impl AirdropApi for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<(), ClientError> {
        debug!("POST /auth/login for {}", request.wallet_address);
        self.execute(self.http.post(self.url("/auth/login")).json(request))
            .await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ClientError> {
        debug!("POST /auth/logout");
        self.execute(self.http.post(self.url("/auth/logout")))
            .await?;
        Ok(())
    }

    async fn create(&self, definition: &AirdropDefinition) -> Result<CreateOutcome, ClientError> {
        debug!("POST /airdrop/create ({})", definition.event_name);
        let response = self
            .execute(self.http.post(self.url("/airdrop/create")).json(definition))
            .await?;
        let body: CreateResponse = response.json().await?;
        Ok(CreateOutcome {
            message: body.message,
            event_id: body.data.event_id,
        })
    }

    async fn draw_one(&self, event_id: &str) -> Result<String, ClientError> {
        debug!("POST /airdrop/{}/drawOne", event_id);
        let response = self
            .execute(
                self.http
                    .post(self.url(&format!("/airdrop/{}/drawOne", event_id)))
                    .json(&serde_json::json!({})),
            )
            .await?;
        let body: MessageResponse = response.json().await?;
        Ok(body.message)
    }

    async fn draw_all(&self, event_id: &str) -> Result<String, ClientError> {
        debug!("POST /airdrop/{}/drawAll", event_id);
        let response = self
            .execute(
                self.http
                    .post(self.url(&format!("/airdrop/{}/drawAll", event_id)))
                    .json(&serde_json::json!({})),
            )
            .await?;
        let body: MessageResponse = response.json().await?;
        Ok(body.message)
    }

    async fn check_status(&self, event_id: &str) -> Result<AirdropStatus, ClientError> {
        debug!("GET /airdrop/{}/status", event_id);
        let response = self
            .execute(
                self.http
                    .get(self.url(&format!("/airdrop/{}/status", event_id))),
            )
            .await?;
        let body: StatusResponse = response.json().await?;
        Ok(body.data)
    }
}
