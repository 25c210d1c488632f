// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::RefCell;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::ApiError;
use crate::session::SessionManager;

pub const UA: &str = concat!(
    "spendbook/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/spendbook)"
);

/// An outbound request as seen by the transport seam.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: String) -> Self {
        ApiRequest {
            method,
            url,
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }
}

/// A response that made it back from the server, whatever its status.
/// Transport-level failures (no response at all) are `ApiError::Transport`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(ApiError::from)
    }

    /// Best-effort human message from a conventional `{"message": …}` error
    /// body; falls back to the raw body.
    pub fn error_message(&self) -> String {
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(&self.body)
            && let Some(msg) = v.get("message").and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if self.body.trim().is_empty() {
            format!("HTTP {}", self.status)
        } else {
            self.body.trim().to_string()
        }
    }
}

/// Seam between the retry state machine and the wire. Production goes
/// through reqwest; tests script responses.
pub trait Transport {
    fn execute(&self, req: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Blocking reqwest transport with a cookie store (for the cookie-session
/// strategy), a fixed UA and an explicit per-request timeout.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(UA)
            .cookie_store(true)
            .build()?;
        Ok(ReqwestTransport { client })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self.client.request(req.method.clone(), &req.url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(bearer) = &req.bearer {
            builder = builder.bearer_auth(bearer);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok(ApiResponse { status, body })
    }
}

/// Authorized client for the backend. Every call runs the same per-request
/// state machine: attach credential, send, and on the first unauthorized
/// response recover once and retry once. Forbidden and transport failures
/// are surfaced immediately.
pub struct ApiClient {
    transport: Box<dyn Transport>,
    session: RefCell<SessionManager>,
    api_url: String,
    resource_base: String,
}

impl ApiClient {
    pub fn new(cfg: &Config) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new()?;
        let session = SessionManager::from_config(cfg)?;
        Ok(ApiClient {
            transport: Box::new(transport),
            session: RefCell::new(session),
            api_url: cfg.api_url.clone(),
            resource_base: cfg.resource_base(),
        })
    }

    /// Test seam: scripted transport and a fully injected session.
    pub fn with_parts(
        transport: Box<dyn Transport>,
        session: SessionManager,
        api_url: &str,
        api_base_path: &str,
    ) -> Self {
        ApiClient {
            transport,
            session: RefCell::new(session),
            api_url: api_url.trim_end_matches('/').to_string(),
            resource_base: format!("{}{}", api_url.trim_end_matches('/'), api_base_path),
        }
    }

    /// One logical request. The retry flag is local, so concurrent or
    /// back-to-back calls never share a retry budget.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.resource_base, path);
        let mut retried = false;
        loop {
            let bearer = self.session.borrow_mut().bearer_for_request()?;
            let req = ApiRequest {
                method: method.clone(),
                url: url.clone(),
                query: query.clone(),
                bearer,
                body: body.clone(),
            };
            let resp = self.transport.execute(&req)?;
            match resp.status {
                401 => {
                    if retried {
                        return Err(ApiError::Authentication {
                            status: Some(401),
                            message: resp.error_message(),
                        });
                    }
                    retried = true;
                    // A failed recovery surfaces the recovery error; it
                    // explains why the retry could not happen.
                    self.session
                        .borrow_mut()
                        .recover_unauthorized(self.transport.as_ref())?;
                }
                403 => {
                    return Err(ApiError::Forbidden {
                        message: resp.error_message(),
                    });
                }
                s if !(200..300).contains(&s) => {
                    return Err(ApiError::Api {
                        status: s,
                        message: resp.error_message(),
                    });
                }
                _ => return Ok(resp),
            }
        }
    }

    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, query, None)?.json()
    }

    pub fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, Vec::new(), Some(body))?.json()
    }

    pub fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, Vec::new(), Some(body))?.json()
    }

    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, Vec::new(), None)?;
        Ok(())
    }

    /// Identity sync after sign-in: `GET <api_url>/api/me` with the raw
    /// assertion as bearer. Single attempt, no retry; callers treat failure
    /// as non-fatal.
    pub fn get_me(&self, assertion: &str) -> Result<serde_json::Value, ApiError> {
        let mut req = ApiRequest::new(Method::GET, format!("{}/api/me", self.api_url));
        req.bearer = Some(assertion.to_string());
        let resp = self.transport.execute(&req)?;
        if !resp.is_success() {
            return Err(ApiError::Api {
                status: resp.status,
                message: resp.error_message(),
            });
        }
        resp.json()
    }

    /// Unauthenticated health probe against the backend.
    pub fn health(&self) -> Result<ApiResponse, ApiError> {
        let req = ApiRequest::new(Method::GET, format!("{}/actuator/health", self.api_url));
        self.transport.execute(&req)
    }

    pub fn sign_in(&self, assertion: &str) -> Result<crate::session::IdentityClaims, ApiError> {
        self.session.borrow_mut().sign_in(assertion)
    }

    pub fn sign_out(&self) {
        self.session.borrow_mut().sign_out();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    pub fn identity(&self) -> Option<crate::session::IdentityClaims> {
        self.session.borrow().identity().cloned()
    }
}
