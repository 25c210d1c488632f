// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Method;
use spendbook::error::ApiError;
use spendbook::http::{ApiClient, ApiRequest, ApiResponse, Transport};
use spendbook::session::{
    Clock, SessionManager, SessionStore, SessionStrategy, TokenIssuer, TokenResponse,
};

struct FakeClock(Rc<Cell<DateTime<Utc>>>);

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

struct FakeIssuer {
    calls: Rc<Cell<usize>>,
    /// Exchanges numbered `fail_from` and later are rejected.
    fail_from: Rc<Cell<usize>>,
}

impl TokenIssuer for FakeIssuer {
    fn issue(&self) -> Result<TokenResponse, ApiError> {
        self.calls.set(self.calls.get() + 1);
        if self.calls.get() >= self.fail_from.get() {
            return Err(ApiError::Authentication {
                status: Some(503),
                message: "issuer down".into(),
            });
        }
        Ok(TokenResponse {
            access_token: format!("tok-{}", self.calls.get()),
            token_type: "Bearer".into(),
            expires_in: 3600,
            scope: None,
        })
    }
}

struct ScriptedTransport {
    script: RefCell<VecDeque<Result<ApiResponse, ApiError>>>,
    log: Rc<RefCell<Vec<ApiRequest>>>,
}

impl Transport for ScriptedTransport {
    fn execute(&self, req: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.log.borrow_mut().push(req.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .expect("transport received more requests than scripted")
    }
}

fn ok(status: u16, body: &str) -> Result<ApiResponse, ApiError> {
    Ok(ApiResponse {
        status,
        body: body.to_string(),
    })
}

struct Harness {
    client: ApiClient,
    log: Rc<RefCell<Vec<ApiRequest>>>,
    issuer_calls: Rc<Cell<usize>>,
    issuer_fail_from: Rc<Cell<usize>>,
    _dir: tempfile::TempDir,
}

fn setup(strategy: SessionStrategy, script: Vec<Result<ApiResponse, ApiError>>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let now = Rc::new(Cell::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()));
    let issuer_calls = Rc::new(Cell::new(0));
    let issuer_fail_from = Rc::new(Cell::new(usize::MAX));
    let issuer = FakeIssuer {
        calls: issuer_calls.clone(),
        fail_from: issuer_fail_from.clone(),
    };
    let session = SessionManager::with_parts(
        strategy,
        Some(Box::new(issuer)),
        Box::new(FakeClock(now)),
        SessionStore::at(dir.path().join("session.json")),
    );
    let log = Rc::new(RefCell::new(Vec::new()));
    let transport = ScriptedTransport {
        script: RefCell::new(script.into_iter().collect()),
        log: log.clone(),
    };
    Harness {
        client: ApiClient::with_parts(
            Box::new(transport),
            session,
            "http://localhost:8081",
            "/api",
        ),
        log,
        issuer_calls,
        issuer_fail_from,
        _dir: dir,
    }
}

fn setup_cc(script: Vec<Result<ApiResponse, ApiError>>) -> Harness {
    setup(SessionStrategy::ClientCredentials, script)
}

#[test]
fn success_passes_through() {
    let h = setup_cc(vec![ok(200, r#"{"status":"ok"}"#)]);
    let resp = h
        .client
        .send(Method::GET, "/categories", Vec::new(), None)
        .unwrap();
    assert_eq!(resp.status, 200);

    let log = h.log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].url, "http://localhost:8081/api/categories");
    assert_eq!(log[0].bearer.as_deref(), Some("tok-1"));
}

#[test]
fn unauthorized_once_recovers_and_retries_once() {
    let h = setup_cc(vec![ok(401, ""), ok(200, "[]")]);
    let resp = h
        .client
        .send(Method::GET, "/transactions", Vec::new(), None)
        .unwrap();
    assert_eq!(resp.status, 200);

    // one logical call, exactly two physical requests
    let log = h.log.borrow();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].bearer.as_deref(), Some("tok-1"));
    assert_eq!(log[1].bearer.as_deref(), Some("tok-2"), "retried with the fresh token");
    assert_eq!(h.issuer_calls.get(), 2);
}

#[test]
fn unauthorized_twice_stops_after_one_retry() {
    let h = setup_cc(vec![ok(401, ""), ok(401, r#"{"message":"bad token"}"#)]);
    let err = h
        .client
        .send(Method::GET, "/transactions", Vec::new(), None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Authentication { status: Some(401), .. }));
    assert_eq!(h.log.borrow().len(), 2, "no third attempt");
}

#[test]
fn forbidden_is_never_retried() {
    let h = setup_cc(vec![ok(403, r#"{"message":"not yours"}"#)]);
    let err = h
        .client
        .send(Method::DELETE, "/categories/abc", Vec::new(), None)
        .unwrap_err();
    match err {
        ApiError::Forbidden { message } => assert_eq!(message, "not yours"),
        other => panic!("expected Forbidden, got {:?}", other),
    }
    assert_eq!(h.log.borrow().len(), 1);
}

#[test]
fn transport_failure_is_never_retried() {
    let h = setup_cc(vec![Err(ApiError::Transport("connection refused".into()))]);
    let err = h
        .client
        .send(Method::GET, "/transactions", Vec::new(), None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(h.log.borrow().len(), 1);
}

#[test]
fn server_error_message_is_extracted() {
    let h = setup_cc(vec![ok(500, r#"{"message":"boom"}"#)]);
    let err = h
        .client
        .send(Method::GET, "/transactions", Vec::new(), None)
        .unwrap_err();
    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Api, got {:?}", other),
    }
}

#[test]
fn retry_budgets_are_per_request() {
    // Request A burns its single retry and fails; request B on the same
    // client still gets a full budget and succeeds.
    let h = setup_cc(vec![
        ok(401, ""),
        ok(401, ""),
        ok(401, ""),
        ok(200, "[]"),
    ]);
    let err = h
        .client
        .send(Method::GET, "/transactions", Vec::new(), None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Authentication { .. }));

    let resp = h
        .client
        .send(Method::GET, "/categories", Vec::new(), None)
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(h.log.borrow().len(), 4);
}

#[test]
fn failed_recovery_surfaces_the_refresh_error() {
    // first exchange succeeds and stamps the request; the recovery exchange fails
    let h = setup_cc(vec![ok(401, "")]);
    h.issuer_fail_from.set(2);
    let err = h
        .client
        .send(Method::GET, "/transactions", Vec::new(), None)
        .unwrap_err();
    match err {
        ApiError::Authentication { status, message } => {
            assert_eq!(status, Some(503));
            assert_eq!(message, "issuer down");
        }
        other => panic!("expected Authentication, got {:?}", other),
    }
    assert_eq!(h.log.borrow().len(), 1, "retry never sent");
}

#[test]
fn cookie_mode_refreshes_via_endpoint() {
    let h = setup(
        SessionStrategy::CookieSession {
            refresh_url: "http://localhost:8081/api/auth/refresh".into(),
        },
        vec![ok(401, ""), ok(204, ""), ok(200, "[]")],
    );
    let resp = h
        .client
        .send(Method::GET, "/transactions", Vec::new(), None)
        .unwrap();
    assert_eq!(resp.status, 200);

    let log = h.log.borrow();
    assert_eq!(log.len(), 3);
    assert!(log[0].bearer.is_none(), "cookie mode sends no bearer");
    assert_eq!(log[1].method, Method::POST);
    assert_eq!(log[1].url, "http://localhost:8081/api/auth/refresh");
    assert_eq!(log[2].url, log[0].url);
    assert_eq!(h.issuer_calls.get(), 0);
}

#[test]
fn cookie_refresh_rejection_surfaces_authentication() {
    let h = setup(
        SessionStrategy::CookieSession {
            refresh_url: "http://localhost:8081/api/auth/refresh".into(),
        },
        vec![ok(401, ""), ok(401, "")],
    );
    let err = h
        .client
        .send(Method::GET, "/transactions", Vec::new(), None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Authentication { status: Some(401), .. }));
    assert_eq!(h.log.borrow().len(), 2, "original request not re-sent");
}

#[test]
fn get_me_uses_the_assertion_directly() {
    let h = setup_cc(vec![ok(200, r#"{"id":"u1","email":"user@example.com"}"#)]);
    let me = h.client.get_me("raw-assertion").unwrap();
    assert_eq!(me["id"], "u1");

    let log = h.log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].url, "http://localhost:8081/api/me");
    assert_eq!(log[0].bearer.as_deref(), Some("raw-assertion"));
    assert_eq!(h.issuer_calls.get(), 0, "identity sync bypasses the token cache");
}
