// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::http::ApiClient;
use crate::models::{Category, CategoryRequest};
use crate::services::categories;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let req = request_from_args(sub);
            let cat = categories::create(client, &req)?;
            println!("Added category '{}' (id: {})", cat.name, cat.id);
        }
        Some(("list", sub)) => list(client, sub)?,
        Some(("tree", _)) => tree(client)?,
        Some(("edit", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            let req = request_from_args(sub);
            let cat = categories::update(client, id, &req)?;
            println!("Updated category '{}'", cat.name);
        }
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            categories::delete(client, id)?;
            println!("Removed category {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn request_from_args(sub: &clap::ArgMatches) -> CategoryRequest {
    CategoryRequest {
        name: sub.get_one::<String>("name").unwrap().clone(),
        parent_id: sub.get_one::<String>("parent").cloned(),
        icon: sub.get_one::<String>("icon").cloned(),
        color: sub.get_one::<String>("color").cloned(),
    }
}

fn list(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let data = categories::list(client)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data.iter().map(row).collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Parent", "Icon", "Color"], rows)
        );
    }
    Ok(())
}

fn tree(client: &ApiClient) -> Result<()> {
    for root in categories::roots(client)? {
        println!("{}", root.name);
        for child in categories::children(client, &root.id)? {
            println!("  └ {}", child.name);
        }
    }
    Ok(())
}

fn row(c: &Category) -> Vec<String> {
    vec![
        c.id.clone(),
        c.name.clone(),
        c.parent_id.clone().unwrap_or_default(),
        c.icon.clone().unwrap_or_default(),
        c.color.clone().unwrap_or_default(),
    ]
}
