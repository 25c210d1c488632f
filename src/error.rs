// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors surfaced by the session and HTTP layers.
///
/// `Authentication` covers both a failed token exchange and an unauthorized
/// response that survived the single retry. `Forbidden` and `Transport` are
/// terminal on first occurrence and never retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication failed{}: {message}", fmt_status(.status))]
    Authentication { status: Option<u16>, message: String },

    #[error("permission denied: {message}")]
    Forbidden { message: String },

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("invalid identity token: {0}")]
    InvalidIdentity(String),

    #[error("session store error: {0}")]
    Store(String),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(s) => format!(" ({s})"),
        None => String::new(),
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

impl ApiError {
    /// True when the caller can recover by signing in again.
    pub fn needs_sign_in(&self) -> bool {
        matches!(self, ApiError::Authentication { .. })
    }
}
