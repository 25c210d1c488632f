// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use spendbook::config::{AuthMode, Config};

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn client_credentials_mode_requires_issuer_settings() {
    let cfg = Config::from_lookup(lookup(&[
        ("SPENDBOOK_API_URL", "https://api.example.com/"),
        ("SPENDBOOK_TOKEN_URL", "https://auth.example.com/token"),
        ("SPENDBOOK_CLIENT_ID", "cid"),
        ("SPENDBOOK_CLIENT_SECRET", "secret"),
    ]))
    .unwrap();
    assert_eq!(cfg.auth_mode, AuthMode::ClientCredentials);
    assert_eq!(cfg.api_url, "https://api.example.com", "trailing slash trimmed");
    assert_eq!(cfg.resource_base(), "https://api.example.com/api");

    let err = Config::from_lookup(lookup(&[(
        "SPENDBOOK_API_URL",
        "https://api.example.com",
    )]))
    .unwrap_err();
    assert!(err.to_string().contains("SPENDBOOK_TOKEN_URL"));
}

#[test]
fn api_url_is_mandatory() {
    let err = Config::from_lookup(lookup(&[])).unwrap_err();
    assert!(err.to_string().contains("SPENDBOOK_API_URL"));
}

#[test]
fn identity_and_cookie_modes_need_no_issuer() {
    let cfg = Config::from_lookup(lookup(&[
        ("SPENDBOOK_API_URL", "http://localhost:8081"),
        ("SPENDBOOK_AUTH_MODE", "identity"),
    ]))
    .unwrap();
    assert_eq!(cfg.auth_mode, AuthMode::IdentityAssertion);

    let cfg = Config::from_lookup(lookup(&[
        ("SPENDBOOK_API_URL", "http://localhost:8081"),
        ("SPENDBOOK_AUTH_MODE", "cookie"),
        ("SPENDBOOK_API_BASE_PATH", "/rest/v1"),
    ]))
    .unwrap();
    assert_eq!(cfg.auth_mode, AuthMode::CookieSession);
    assert_eq!(cfg.resource_base(), "http://localhost:8081/rest/v1");
}

#[test]
fn auth_mode_spellings() {
    assert_eq!(
        AuthMode::parse("client_credentials").unwrap(),
        AuthMode::ClientCredentials
    );
    assert_eq!(
        AuthMode::parse("Identity-Assertion").unwrap(),
        AuthMode::IdentityAssertion
    );
    assert_eq!(AuthMode::parse("cookie-session").unwrap(), AuthMode::CookieSession);
    assert!(AuthMode::parse("saml").is_err());
}
