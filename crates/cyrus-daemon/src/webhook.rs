// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook ingress (spec §6): `POST <path>` validates auth, parses the
//! normalized event, and dispatches to the `Orchestrator` in O(1),
//! returning before the session's own task finishes.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use cyrus_core::Clock;
use cyrus_engine::{ConfigurationManager, Orchestrator};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth_config::WebhookAuthConfig;

pub struct AppState<C: Clock + 'static> {
    pub orchestrator: Arc<Orchestrator<C>>,
    pub config: Arc<ConfigurationManager>,
    pub auth: WebhookAuthConfig,
}

impl<C: Clock + 'static> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
            config: self.config.clone(),
            auth: self.auth.clone(),
        }
    }
}

/// `POST <path>` (spec §6). Non-POST and method-routing itself is
/// handled by the axum router (a GET here never reaches this
/// handler); this function covers auth, body parsing, and dispatch.
pub async fn handle<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let header_value = state.auth.header_value(&headers);
    if state.auth.verify(&body, header_value.as_deref()).is_err() {
        warn!("webhook rejected: invalid signature or bearer token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let event = match cyrus_wire::payload::parse(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "webhook rejected: malformed payload");
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": e.to_string() }))).into_response();
        }
    };

    let repos = state.config.current().repositories.clone();
    match state.orchestrator.handle_webhook(event, &repos).await {
        Ok(dispatch) => {
            info!(?dispatch, "webhook dispatched");
            (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response()
        }
        Err(e) => {
            warn!(error = %e, "webhook routing/dispatch failed");
            (StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response()
        }
    }
}

/// `GET /status` (spec §6).
pub async fn status<C: Clock + 'static>(State(state): State<AppState<C>>) -> Json<cyrus_core::ActiveWorkStatus> {
    Json(state.orchestrator.status().await)
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
