// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::http::ApiClient;
use crate::services::transactions;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};

pub fn handle(client: &ApiClient, sub: &clap::ArgMatches) -> Result<()> {
    let from = match sub.get_one::<String>("from") {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };
    let to = match sub.get_one::<String>("to") {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };

    let summary = transactions::summary(client, from, to)?;
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &summary)? {
        let rows = vec![
            vec!["Income".to_string(), fmt_money(&summary.total_income)],
            vec!["Expense".to_string(), fmt_money(&summary.total_expense)],
            vec!["Balance".to_string(), fmt_money(&summary.balance)],
        ];
        println!(
            "Summary {} .. {}",
            summary.start_date, summary.end_date
        );
        println!("{}", pretty_table(&["", "Amount"], rows));
    }
    Ok(())
}
