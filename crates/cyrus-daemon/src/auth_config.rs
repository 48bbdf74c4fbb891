// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves which webhook authentication mode (spec §6) this
//! deployment uses, and picks the right header for each.

use axum::http::HeaderMap;
use cyrus_wire::{AuthError, WebhookAuth};

#[derive(Clone)]
pub struct WebhookAuthConfig {
    auth: WebhookAuth,
}

impl WebhookAuthConfig {
    /// `CYRUS_WEBHOOK_HMAC_SECRET` takes precedence over
    /// `CYRUS_WEBHOOK_BEARER_TOKEN` if both happen to be set; a
    /// deployment picks exactly one mode (spec §6).
    pub fn from_env() -> Self {
        if let Ok(secret) = std::env::var("CYRUS_WEBHOOK_HMAC_SECRET") {
            return Self { auth: WebhookAuth::Hmac { secret } };
        }
        if let Ok(token) = std::env::var("CYRUS_WEBHOOK_BEARER_TOKEN") {
            return Self { auth: WebhookAuth::Bearer { token } };
        }
        // No secret configured: every request is rejected. A
        // deployment must explicitly opt into a mode rather than
        // silently accepting unauthenticated webhooks.
        Self { auth: WebhookAuth::Bearer { token: String::new() } }
    }

    #[cfg(test)]
    pub(crate) fn for_test(auth: WebhookAuth) -> Self {
        Self { auth }
    }

    pub fn header_value(&self, headers: &HeaderMap) -> Option<String> {
        let header_name = match &self.auth {
            WebhookAuth::Hmac { .. } => "x-signature",
            WebhookAuth::Bearer { .. } => "authorization",
        };
        headers.get(header_name).and_then(|v| v.to_str().ok()).map(str::to_string)
    }

    pub fn verify(&self, body: &[u8], header_value: Option<&str>) -> Result<(), AuthError> {
        self.auth.verify(body, header_value)
    }
}

#[cfg(test)]
#[path = "auth_config_tests.rs"]
mod tests;
