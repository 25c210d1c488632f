// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::{AuthMode, Config};
use crate::error::ApiError;
use crate::http::{ApiRequest, Transport};

/// Seconds subtracted from a token's declared lifetime so it is renewed
/// before the issuer actually rejects it.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Spendbook", "spendbook"));

/// Body returned by the token-issuance endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: Option<String>,
}

/// A cached bearer credential. Never reused past `expires_at`.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    fn from_response(resp: &TokenResponse, now: DateTime<Utc>) -> Self {
        let lifetime = (resp.expires_in as i64 - TOKEN_EXPIRY_MARGIN_SECS).max(0);
        Credential {
            token: resp.access_token.clone(),
            expires_at: now + Duration::seconds(lifetime),
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Time source, injectable so tests can move the clock past the margin.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Performs the client-credentials exchange against the issuance endpoint.
pub trait TokenIssuer {
    fn issue(&self) -> Result<TokenResponse, ApiError>;
}

/// Real issuer: `POST <token_url>` with `grant_type=client_credentials`,
/// client id/secret as HTTP Basic auth, form-encoded body.
pub struct HttpTokenIssuer {
    client: reqwest::blocking::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl HttpTokenIssuer {
    pub fn new(token_url: String, client_id: String, client_secret: String) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(crate::http::UA)
            .build()?;
        Ok(HttpTokenIssuer {
            client,
            token_url,
            client_id,
            client_secret,
        })
    }
}

impl TokenIssuer for HttpTokenIssuer {
    fn issue(&self) -> Result<TokenResponse, ApiError> {
        let resp = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .map_err(|e| ApiError::Authentication {
                status: None,
                message: e.to_string(),
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(ApiError::Authentication {
                status: Some(status),
                message,
            });
        }
        resp.json::<TokenResponse>().map_err(|e| ApiError::Authentication {
            status: Some(status),
            message: format!("malformed token response: {}", e),
        })
    }
}

/// Display claims decoded from an identity assertion. Decoded locally for
/// display only; the backend re-validates the assertion on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub exp: Option<i64>,
}

impl IdentityClaims {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => exp <= now.timestamp(),
            None => false,
        }
    }
}

/// Decode the payload segment of a JWT without verifying its signature.
pub fn decode_identity_claims(token: &str) -> Result<IdentityClaims, ApiError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ApiError::InvalidIdentity("not a JWT (missing payload segment)".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ApiError::InvalidIdentity(format!("payload is not base64url: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::InvalidIdentity(format!("payload is not a claims object: {}", e)))
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    identity_token: String,
}

/// On-disk persistence for the identity assertion: one JSON file in the
/// platform data dir, cleared on sign-out.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn default_path() -> Result<Self, ApiError> {
        let proj = ProjectDirs::from(APP.0, APP.1, APP.2).ok_or_else(|| {
            ApiError::Store("could not determine platform-specific data dir".into())
        })?;
        let data_dir = proj.data_dir();
        fs::create_dir_all(data_dir)
            .map_err(|e| ApiError::Store(format!("create data dir: {}", e)))?;
        Ok(SessionStore {
            path: data_dir.join("session.json"),
        })
    }

    pub fn at(path: PathBuf) -> Self {
        SessionStore { path }
    }

    pub fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let stored: StoredSession = serde_json::from_str(&raw).ok()?;
        Some(stored.identity_token)
    }

    pub fn save(&self, identity_token: &str) -> Result<(), ApiError> {
        let stored = StoredSession {
            identity_token: identity_token.to_string(),
        };
        let raw = serde_json::to_string(&stored)?;
        fs::write(&self.path, raw).map_err(|e| ApiError::Store(format!("write session: {}", e)))
    }

    pub fn clear(&self) {
        // Best effort; a missing file is already the desired state.
        let _ = fs::remove_file(&self.path);
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// How the request layer authorizes calls and recovers from a 401.
pub enum SessionStrategy {
    /// Bearer token per request, acquired lazily via client-credentials
    /// exchange and cached until expiry minus margin.
    ClientCredentials,
    /// The signed-in identity assertion itself is the bearer credential.
    /// No local recovery; an unauthorized response means sign in again.
    IdentityAssertion,
    /// Server-side cookie session; recovery posts to the refresh endpoint.
    CookieSession { refresh_url: String },
}

/// Process-wide owner of the session credential. All access goes through
/// this type; nothing else mutates the cache.
pub struct SessionManager {
    strategy: SessionStrategy,
    issuer: Option<Box<dyn TokenIssuer>>,
    clock: Box<dyn Clock>,
    store: SessionStore,
    cached: Option<Credential>,
    identity_token: Option<String>,
    identity: Option<IdentityClaims>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("cached", &self.cached)
            .field("identity_token", &self.identity_token)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn from_config(cfg: &Config) -> Result<Self, ApiError> {
        let (strategy, issuer): (SessionStrategy, Option<Box<dyn TokenIssuer>>) =
            match cfg.auth_mode {
                AuthMode::ClientCredentials => {
                    let (token_url, client_id, client_secret) = match (
                        cfg.token_url.clone(),
                        cfg.client_id.clone(),
                        cfg.client_secret.clone(),
                    ) {
                        (Some(u), Some(i), Some(s)) => (u, i, s),
                        _ => {
                            return Err(ApiError::Authentication {
                                status: None,
                                message: "client-credentials mode needs SPENDBOOK_TOKEN_URL, \
                                          SPENDBOOK_CLIENT_ID and SPENDBOOK_CLIENT_SECRET"
                                    .into(),
                            });
                        }
                    };
                    let issuer = HttpTokenIssuer::new(token_url, client_id, client_secret)?;
                    (SessionStrategy::ClientCredentials, Some(Box::new(issuer)))
                }
                AuthMode::IdentityAssertion => (SessionStrategy::IdentityAssertion, None),
                AuthMode::CookieSession => (
                    SessionStrategy::CookieSession {
                        refresh_url: format!("{}/api/auth/refresh", cfg.api_url),
                    },
                    None,
                ),
            };

        let mut mgr = SessionManager {
            strategy,
            issuer,
            clock: Box::new(SystemClock),
            store: SessionStore::default_path()?,
            cached: None,
            identity_token: None,
            identity: None,
        };
        mgr.restore();
        Ok(mgr)
    }

    /// Fully injectable constructor, used by tests to substitute a fake
    /// clock, issuer and store without touching process-wide state.
    pub fn with_parts(
        strategy: SessionStrategy,
        issuer: Option<Box<dyn TokenIssuer>>,
        clock: Box<dyn Clock>,
        store: SessionStore,
    ) -> Self {
        SessionManager {
            strategy,
            issuer,
            clock,
            store,
            cached: None,
            identity_token: None,
            identity: None,
        }
    }

    /// Reload a persisted assertion. Expired or malformed assertions are
    /// discarded along with the store file.
    pub fn restore(&mut self) {
        let Some(token) = self.store.load() else {
            return;
        };
        match decode_identity_claims(&token) {
            Ok(claims) if !claims.is_expired(self.clock.now()) => {
                self.identity_token = Some(token);
                self.identity = Some(claims);
            }
            _ => self.store.clear(),
        }
    }

    /// Return a currently valid credential, exchanging for a fresh one only
    /// when the cache is empty or past its expiry-minus-margin instant.
    pub fn get_credential(&mut self) -> Result<String, ApiError> {
        match &self.strategy {
            SessionStrategy::ClientCredentials => {
                let now = self.clock.now();
                if let Some(cred) = &self.cached
                    && cred.is_valid(now)
                {
                    return Ok(cred.token.clone());
                }
                let issuer = self.issuer.as_ref().ok_or_else(|| ApiError::Authentication {
                    status: None,
                    message: "no token issuer configured".into(),
                })?;
                let resp = issuer.issue()?;
                let cred = Credential::from_response(&resp, now);
                let token = cred.token.clone();
                self.cached = Some(cred);
                Ok(token)
            }
            SessionStrategy::IdentityAssertion => match (&self.identity_token, &self.identity) {
                (Some(token), Some(claims)) if !claims.is_expired(self.clock.now()) => {
                    Ok(token.clone())
                }
                _ => Err(ApiError::Authentication {
                    status: None,
                    message: "no active session; sign in first".into(),
                }),
            },
            SessionStrategy::CookieSession { .. } => Err(ApiError::Authentication {
                status: None,
                message: "cookie sessions carry no bearer credential".into(),
            }),
        }
    }

    /// Bearer to stamp on an outbound request, if the strategy uses one.
    pub fn bearer_for_request(&mut self) -> Result<Option<String>, ApiError> {
        match self.strategy {
            SessionStrategy::CookieSession { .. } => Ok(None),
            _ => self.get_credential().map(Some),
        }
    }

    /// Discard the cached credential. Next `get_credential` forces a fresh
    /// exchange. Side effect only.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// One recovery cycle after an unauthorized response. The caller retries
    /// the original request exactly once if this succeeds.
    pub fn recover_unauthorized(&mut self, transport: &dyn Transport) -> Result<(), ApiError> {
        match &self.strategy {
            SessionStrategy::ClientCredentials => {
                self.invalidate();
                self.get_credential()?;
                Ok(())
            }
            SessionStrategy::IdentityAssertion => Err(ApiError::Authentication {
                status: None,
                message: "session expired; sign in again".into(),
            }),
            SessionStrategy::CookieSession { refresh_url } => {
                let req = ApiRequest::new(reqwest::Method::POST, refresh_url.clone());
                let resp = transport.execute(&req)?;
                if resp.is_success() {
                    Ok(())
                } else {
                    Err(ApiError::Authentication {
                        status: Some(resp.status),
                        message: "session refresh rejected".into(),
                    })
                }
            }
        }
    }

    /// Establish a session from an externally issued identity assertion.
    /// Claims are decoded locally for display only.
    pub fn sign_in(&mut self, assertion: &str) -> Result<IdentityClaims, ApiError> {
        let claims = decode_identity_claims(assertion)?;
        if claims.is_expired(self.clock.now()) {
            return Err(ApiError::InvalidIdentity("assertion already expired".into()));
        }
        self.store.save(assertion)?;
        self.identity_token = Some(assertion.to_string());
        self.identity = Some(claims.clone());
        Ok(claims)
    }

    /// Clear session state and persisted storage. Never fails.
    pub fn sign_out(&mut self) {
        self.cached = None;
        self.identity_token = None;
        self.identity = None;
        self.store.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        let now = self.clock.now();
        if let Some(claims) = &self.identity
            && !claims.is_expired(now)
        {
            return true;
        }
        matches!(&self.cached, Some(cred) if cred.is_valid(now))
    }

    pub fn identity(&self) -> Option<&IdentityClaims> {
        self.identity.as_ref()
    }

    pub fn identity_token(&self) -> Option<&str> {
        self.identity_token.as_deref()
    }
}
