//! # Airdrop Lifecycle Controller - The Brain of the Console
//!
//! Issues create/draw-one/draw-all/status-check requests against the
//! backend and folds every outcome into one uniform client surface.
//!
//! ## Core Responsibilities
//!
//! 1.  **Operation gating:** draw and status actions require a non-empty
//!     event identifier; a missing one is a client-side failure and no
//!     network call is made. The event identifier is supplied manually
//!     by the operator — this client does not track created events.
//!
//! 2.  **Uniform failure handling:** a 401 triggers the session
//!     manager's forced sign-out and is never reinterpreted as a
//!     validation error; a 400 replaces the staged error list according
//!     to the decoded body shape; anything else surfaces as an opaque
//!     message with no state assumed changed. Nothing is ever retried
//!     automatically.
//!
//! 3.  **Loading discipline:** each operation holds a `LoadingGuard` for
//!     its full duration, so the loading flag is reset on every exit
//!     path, success or failure.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::core::api_client::{AirdropApi, CreateOutcome};
use crate::error::{ClientError, ErrorBody};
use crate::form::AirdropDefinition;
use crate::session::SessionManager;
use crate::state::{AirdropStatus, LoadingGuard, LoadingState};
use crate::wallet::WalletProvider;

/// Fallback shown when a 400 carries no usable message.
const GENERIC_ACTION_ERROR: &str = "An error occurred";

pub struct LifecycleController<A: AirdropApi, W: WalletProvider> {
    api: Arc<A>,
    session: Arc<SessionManager<A, W>>,
    /// Server-reported errors staged against the creation form.
    form_errors: RwLock<Vec<String>>,
    /// Server-reported error staged against the draw/status actions.
    action_error: RwLock<Option<String>>,
    /// Last fetched snapshot, replaced wholesale on each status check.
    last_status: RwLock<Option<AirdropStatus>>,
    loading: Arc<RwLock<LoadingState>>,
}

impl<A: AirdropApi, W: WalletProvider> LifecycleController<A, W> {
    pub fn new(api: Arc<A>, session: Arc<SessionManager<A, W>>) -> Self {
        Self {
            api,
            session,
            form_errors: RwLock::new(Vec::new()),
            action_error: RwLock::new(None),
            last_status: RwLock::new(None),
            loading: Arc::new(RwLock::new(LoadingState::idle())),
        }
    }

    pub fn form_errors(&self) -> Vec<String> {
        self.form_errors.read().clone()
    }

    pub fn action_error(&self) -> Option<String> {
        self.action_error.read().clone()
    }

    pub fn last_status(&self) -> Option<AirdropStatus> {
        self.last_status.read().clone()
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading.read().clone()
    }

    /// Submits a validated definition. On success the staged form errors
    /// are cleared and the server-issued event id is surfaced.
    pub async fn create(
        &self,
        definition: &AirdropDefinition,
    ) -> Result<CreateOutcome, ClientError> {
        let _loading = LoadingGuard::begin(self.loading.clone(), "Creating airdrop event...");
        match self.api.create(definition).await {
            Ok(outcome) => {
                self.form_errors.write().clear();
                info!("Airdrop created: {} ({})", outcome.message, outcome.event_id);
                Ok(outcome)
            }
            Err(e) => {
                self.stage_create_failure(&e).await;
                Err(e)
            }
        }
    }

    pub async fn draw_one(&self, event_id: &str) -> Result<String, ClientError> {
        let event_id = require_event_id(event_id)?;
        let _loading = LoadingGuard::begin(self.loading.clone(), "Drawing one prize...");
        match self.api.draw_one(event_id).await {
            Ok(message) => {
                *self.action_error.write() = None;
                Ok(message)
            }
            Err(e) => {
                self.stage_action_failure(&e).await;
                Err(e)
            }
        }
    }

    pub async fn draw_all(&self, event_id: &str) -> Result<String, ClientError> {
        let event_id = require_event_id(event_id)?;
        let _loading = LoadingGuard::begin(self.loading.clone(), "Drawing all prizes...");
        match self.api.draw_all(event_id).await {
            Ok(message) => {
                *self.action_error.write() = None;
                Ok(message)
            }
            Err(e) => {
                self.stage_action_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Fetches the current snapshot, replacing the stored one wholesale.
    pub async fn check_status(&self, event_id: &str) -> Result<AirdropStatus, ClientError> {
        let event_id = require_event_id(event_id)?;
        let _loading = LoadingGuard::begin(self.loading.clone(), "Checking airdrop status...");
        match self.api.check_status(event_id).await {
            Ok(status) => {
                *self.last_status.write() = Some(status.clone());
                Ok(status)
            }
            Err(e) => {
                self.stage_action_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Failure handling for `create`: a 400 replaces the staged form
    /// error list according to the body shape; a 401 forces sign-out and
    /// leaves the list untouched.
    async fn stage_create_failure(&self, error: &ClientError) {
        match error {
            ClientError::Unauthorized => self.force_sign_out().await,
            ClientError::ValidationRejected(body) => {
                *self.form_errors.write() = match body {
                    ErrorBody::FieldErrors(errors) => errors.clone(),
                    ErrorBody::SingleMessage(message) => vec![message.clone()],
                    ErrorBody::Empty => Vec::new(),
                };
            }
            other => {
                warn!("Airdrop creation failed: {}", other);
                self.form_errors.write().clear();
            }
        }
    }

    /// Failure handling for draw/status actions: only a 400's single
    /// message is staged; a field-error list or empty body degrades to a
    /// generic message.
    async fn stage_action_failure(&self, error: &ClientError) {
        match error {
            ClientError::Unauthorized => self.force_sign_out().await,
            ClientError::ValidationRejected(body) => {
                let message = match body {
                    ErrorBody::SingleMessage(message) => message.clone(),
                    _ => GENERIC_ACTION_ERROR.to_string(),
                };
                *self.action_error.write() = Some(message);
            }
            other => warn!("Airdrop action failed: {}", other),
        }
    }

    async fn force_sign_out(&self) {
        warn!("Session rejected by server. Forcing sign-out.");
        self.session.sign_out(true).await;
    }
}

fn require_event_id(event_id: &str) -> Result<&str, ClientError> {
    let event_id = event_id.trim();
    if event_id.is_empty() {
        Err(ClientError::MissingEventId)
    } else {
        Ok(event_id)
    }
}
