// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use spendbook::{cli, commands, config::Config, error::ApiError, http::ApiClient};

fn main() -> Result<()> {
    if let Err(err) = run() {
        // An unrecoverable authorization failure ends with a sign-in hint;
        // nothing else in the app can proceed without a session.
        if err
            .downcast_ref::<ApiError>()
            .is_some_and(|e| e.needs_sign_in())
        {
            eprintln!("Not signed in or session expired. Run 'spendbook login --token <jwt>'.");
        }
        return Err(err);
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::from_env()?;
    let client = ApiClient::new(&cfg)?;

    match matches.subcommand() {
        Some(("login", sub)) => commands::auth::login(&client, sub)?,
        Some(("logout", _)) => commands::auth::logout(&client)?,
        Some(("whoami", sub)) => commands::auth::whoami(&client, sub)?,
        Some(("category", sub)) => commands::categories::handle(&client, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&client, sub)?,
        Some(("summary", sub)) => commands::report::handle(&client, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&cfg, &client)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
