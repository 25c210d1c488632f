// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::config::{AuthMode, Config};
use crate::http::ApiClient;

pub fn handle(cfg: &Config, client: &ApiClient) -> Result<()> {
    println!("API base: {}", cfg.resource_base());
    let mode = match cfg.auth_mode {
        AuthMode::ClientCredentials => "client-credentials",
        AuthMode::IdentityAssertion => "identity-assertion",
        AuthMode::CookieSession => "cookie-session",
    };
    println!("Auth mode: {}", mode);
    println!(
        "Session: {}",
        if client.is_authenticated() {
            "active"
        } else {
            "none"
        }
    );

    match client.health() {
        Ok(resp) if resp.is_success() => {
            println!("Backend: reachable (HTTP {})", resp.status)
        }
        Ok(resp) => println!("Backend: unhealthy (HTTP {})", resp.status),
        Err(e) => println!("Backend: unreachable ({})", e),
    }
    Ok(())
}
