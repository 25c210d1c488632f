// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};

use crate::http::ApiClient;
use crate::utils::{maybe_print_json, pretty_table};

pub fn login(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let assertion = if let Some(tok) = sub.get_one::<String>("token") {
        tok.clone()
    } else if let Some(path) = sub.get_one::<String>("token-file") {
        std::fs::read_to_string(path)
            .with_context(|| format!("Read token file '{}'", path))?
            .trim()
            .to_string()
    } else {
        bail!("Provide --token or --token-file");
    };

    let claims = client.sign_in(&assertion)?;
    println!(
        "Signed in as {}",
        claims.email.as_deref().unwrap_or(claims.sub.as_str())
    );

    // Best-effort: let the backend materialize its local user record.
    // A failure here never fails sign-in.
    match client.get_me(&assertion) {
        Ok(_) => println!("User synced with backend."),
        Err(e) => eprintln!("Warning: backend user sync failed: {}", e),
    }
    Ok(())
}

pub fn logout(client: &ApiClient) -> Result<()> {
    client.sign_out();
    println!("Logged out.");
    Ok(())
}

pub fn whoami(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let Some(claims) = client.identity() else {
        println!("Not signed in.");
        return Ok(());
    };
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &claims)? {
        let rows = vec![
            vec!["Subject".to_string(), claims.sub.clone()],
            vec![
                "Name".to_string(),
                claims.name.clone().unwrap_or_default(),
            ],
            vec![
                "Email".to_string(),
                claims.email.clone().unwrap_or_default(),
            ],
            vec![
                "Expires".to_string(),
                claims
                    .exp
                    .map(|e| e.to_string())
                    .unwrap_or_default(),
            ],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}
