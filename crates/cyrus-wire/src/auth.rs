// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook authentication: HMAC-signature and bearer-token modes
//! (spec §6).

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("webhook signature or bearer token did not match")]
    Invalid,
    #[error("configured secret is not valid HMAC key material")]
    BadKey,
}

/// Per-deployment webhook authentication mode.
#[derive(Debug, Clone)]
pub enum WebhookAuth {
    /// Verify `X-Signature` as HMAC-SHA-256 of the raw body, hex-encoded.
    Hmac { secret: String },
    /// Compare `Authorization: Bearer <token>` constant-time.
    Bearer { token: String },
}

impl WebhookAuth {
    /// Verify a raw request against this auth mode. `signature_header`
    /// is `X-Signature` for HMAC mode, `Authorization` for bearer mode;
    /// callers pick the right header before calling this.
    pub fn verify(&self, body: &[u8], header_value: Option<&str>) -> Result<(), AuthError> {
        let header_value = header_value.ok_or(AuthError::Invalid)?;
        match self {
            WebhookAuth::Hmac { secret } => verify_hmac(secret, body, header_value),
            WebhookAuth::Bearer { token } => verify_bearer(token, header_value),
        }
    }
}

fn verify_hmac(secret: &str, body: &[u8], signature_hex: &str) -> Result<(), AuthError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::BadKey)?;
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    let provided = hex_decode(signature_hex).ok_or(AuthError::Invalid)?;
    // Digests compared via the byte-hashes themselves (already fixed-length,
    // constant-time-comparable) — no length-dependent early return.
    if expected.len() == provided.len() && bool::from(expected.as_slice().ct_eq(&provided)) {
        Ok(())
    } else {
        Err(AuthError::Invalid)
    }
}

fn verify_bearer(token: &str, header_value: &str) -> Result<(), AuthError> {
    let Some(provided) = header_value.strip_prefix("Bearer ") else {
        return Err(AuthError::Invalid);
    };
    // Hash both sides first so the comparison is constant-time and
    // independent of the raw token's length (mirrors the teacher's
    // bearer-token check).
    let expected_hash = Sha256::digest(token.as_bytes());
    let provided_hash = Sha256::digest(provided.as_bytes());
    if bool::from(expected_hash.ct_eq(&provided_hash)) {
        Ok(())
    } else {
        Err(AuthError::Invalid)
    }
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    let s = s.strip_prefix("sha256=").unwrap_or(s);
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
