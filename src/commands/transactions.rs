// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use crate::http::ApiClient;
use crate::models::{Transaction, TransactionRequest, TransactionSource, TransactionType};
use crate::services::transactions;
use crate::services::transactions::TransactionQuery;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle(client: &ApiClient, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(client, sub)?,
        Some(("list", sub)) => list(client, sub)?,
        Some(("recent", sub)) => recent(client, sub)?,
        Some(("edit", sub)) => edit(client, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            transactions::delete(client, id)?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn parse_type(s: &str) -> Result<TransactionType> {
    TransactionType::parse(s).ok_or_else(|| anyhow!("Invalid type '{}', expected income or expense", s))
}

fn add(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let kind = parse_type(sub.get_one::<String>("type").unwrap())?;

    let req = TransactionRequest {
        category_id: sub.get_one::<String>("category").cloned(),
        amount,
        r#type: kind,
        transaction_date: date,
        note: sub.get_one::<String>("note").cloned(),
        raw_description: sub.get_one::<String>("desc").cloned(),
        source: Some(TransactionSource::Manual),
    };
    let tx = transactions::create(client, &req)?;
    println!(
        "Recorded {} {} on {} (id: {})",
        tx.r#type.as_str(),
        fmt_money(&tx.amount),
        tx.transaction_date,
        tx.id
    );
    Ok(())
}

fn query_from_args(sub: &clap::ArgMatches) -> Result<TransactionQuery> {
    let mut q = TransactionQuery {
        page: sub.get_one::<u32>("page").copied(),
        size: sub.get_one::<u32>("size").copied(),
        sort: sub.get_one::<String>("sort").cloned(),
        category_id: sub.get_one::<String>("category").cloned(),
        ..Default::default()
    };
    if let Some(t) = sub.get_one::<String>("type") {
        q.r#type = Some(parse_type(t)?);
    }
    if let Some(d) = sub.get_one::<String>("from") {
        q.start_date = Some(parse_date(d)?);
    }
    if let Some(d) = sub.get_one::<String>("to") {
        q.end_date = Some(parse_date(d)?);
    }
    Ok(q)
}

fn list(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let query = query_from_args(sub)?;
    let page = transactions::list(client, &query)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &page.content)? {
        let rows = page.content.iter().map(row).collect();
        println!("{}", pretty_table(HEADERS, rows));
        println!(
            "Page {} of {} ({} total)",
            page.number + 1,
            page.total_pages.max(1),
            page.total_elements
        );
    }
    Ok(())
}

fn recent(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let data = transactions::recent(client)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data.iter().map(row).collect();
        println!("{}", pretty_table(HEADERS, rows));
    }
    Ok(())
}

/// Partial edit: fetch the current record, overlay the provided flags, send
/// the full payload back (the update endpoint takes a complete body).
fn edit(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").unwrap();
    let current = transactions::get(client, id)?;

    let req = TransactionRequest {
        category_id: sub
            .get_one::<String>("category")
            .cloned()
            .or(current.category.map(|c| c.id)),
        amount: match sub.get_one::<String>("amount") {
            Some(s) => parse_decimal(s)?,
            None => current.amount,
        },
        r#type: match sub.get_one::<String>("type") {
            Some(s) => parse_type(s)?,
            None => current.r#type,
        },
        transaction_date: match sub.get_one::<String>("date") {
            Some(s) => parse_date(s)?,
            None => current.transaction_date,
        },
        note: sub.get_one::<String>("note").cloned().or(current.note),
        raw_description: sub
            .get_one::<String>("desc")
            .cloned()
            .or(current.raw_description),
        source: Some(current.source),
    };
    let tx = transactions::update(client, id, &req)?;
    println!("Updated transaction {}", tx.id);
    Ok(())
}

const HEADERS: &[&str] = &["Date", "Type", "Amount", "Category", "Note", "Id"];

fn row(t: &Transaction) -> Vec<String> {
    vec![
        t.transaction_date.to_string(),
        t.r#type.as_str().to_string(),
        fmt_money(&t.amount),
        t.category.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
        t.note.clone().unwrap_or_default(),
        t.id.clone(),
    ]
}
