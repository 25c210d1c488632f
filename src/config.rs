// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};

/// How outbound requests get authorized. Exactly one mode is active per
/// deployment; the backend decides which one it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Machine-to-machine bearer token via client-credentials exchange.
    ClientCredentials,
    /// The externally issued identity token is sent as the bearer credential.
    IdentityAssertion,
    /// Server-side cookie session renewed through a refresh endpoint.
    CookieSession,
}

impl AuthMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "client-credentials" | "client_credentials" => Ok(AuthMode::ClientCredentials),
            "identity" | "identity-assertion" => Ok(AuthMode::IdentityAssertion),
            "cookie" | "cookie-session" => Ok(AuthMode::CookieSession),
            other => Err(anyhow!(
                "Unknown auth mode '{}', expected client-credentials, identity or cookie",
                other
            )),
        }
    }
}

/// Deploy-time configuration, injected through the environment and treated as
/// opaque beyond presence checks.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, e.g. `https://api.example.com` (no trailing slash).
    pub api_url: String,
    /// Path prefix for resource endpoints, e.g. `/api`.
    pub api_base_path: String,
    pub auth_mode: AuthMode,
    /// Token-issuance endpoint; required in client-credentials mode.
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with an injectable variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = get("SPENDBOOK_API_URL")
            .context("SPENDBOOK_API_URL is not set")?
            .trim_end_matches('/')
            .to_string();
        let api_base_path = get("SPENDBOOK_API_BASE_PATH").unwrap_or_else(|| "/api".to_string());

        let auth_mode = match get("SPENDBOOK_AUTH_MODE") {
            Some(s) => AuthMode::parse(&s)?,
            None => AuthMode::ClientCredentials,
        };

        let token_url = get("SPENDBOOK_TOKEN_URL");
        let client_id = get("SPENDBOOK_CLIENT_ID");
        let client_secret = get("SPENDBOOK_CLIENT_SECRET");

        if auth_mode == AuthMode::ClientCredentials {
            if token_url.is_none() {
                bail!("SPENDBOOK_TOKEN_URL is required in client-credentials mode");
            }
            if client_id.is_none() || client_secret.is_none() {
                bail!(
                    "SPENDBOOK_CLIENT_ID and SPENDBOOK_CLIENT_SECRET are required in client-credentials mode"
                );
            }
        }

        Ok(Config {
            api_url,
            api_base_path,
            auth_mode,
            token_url,
            client_id,
            client_secret,
        })
    }

    /// Base for resource endpoints: `<api_url><api_base_path>`.
    pub fn resource_base(&self) -> String {
        format!("{}{}", self.api_url, self.api_base_path)
    }
}
