// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print results as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print results as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("spendbook")
        .version(crate_version!())
        .about("Command-line client for the Spendbook income/expense API")
        .subcommand(
            Command::new("login")
                .about("Sign in with an identity token from your provider")
                .arg(Arg::new("token").long("token").help("Identity token (JWT)"))
                .arg(
                    Arg::new("token-file")
                        .long("token-file")
                        .conflicts_with("token")
                        .help("Read the identity token from a file"),
                ),
        )
        .subcommand(Command::new("logout").about("Clear the local session"))
        .subcommand(json_flags(
            Command::new("whoami").about("Show the signed-in identity"),
        ))
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .about("Create a category")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("parent").long("parent").help("Parent category id"))
                        .arg(Arg::new("icon").long("icon"))
                        .arg(Arg::new("color").long("color")),
                )
                .subcommand(json_flags(Command::new("list").about("List all categories")))
                .subcommand(
                    Command::new("tree").about("List root categories with their children"),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Update a category")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("parent").long("parent").help("Parent category id"))
                        .arg(Arg::new("icon").long("icon"))
                        .arg(Arg::new("color").long("color")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a category")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Manage transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .required(true)
                                .help("Transaction date, YYYY-MM-DD"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("income or expense"),
                        )
                        .arg(Arg::new("category").long("category").help("Category id"))
                        .arg(Arg::new("note").long("note"))
                        .arg(Arg::new("desc").long("desc").help("Raw description")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions with filters")
                        .arg(
                            Arg::new("page")
                                .long("page")
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(
                            Arg::new("size")
                                .long("size")
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(
                            Arg::new("sort")
                                .long("sort")
                                .help("Sort order, e.g. transactionDate,desc"),
                        )
                        .arg(Arg::new("type").long("type").help("income or expense"))
                        .arg(Arg::new("category").long("category").help("Category id"))
                        .arg(Arg::new("from").long("from").help("Start date, YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").help("End date, YYYY-MM-DD")),
                ))
                .subcommand(json_flags(
                    Command::new("recent").about("Show the most recent transactions"),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Update a transaction")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("note").long("note"))
                        .arg(Arg::new("desc").long("desc")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(json_flags(
            Command::new("summary")
                .about("Income/expense totals for a period")
                .arg(Arg::new("from").long("from").help("Start date, YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").help("End date, YYYY-MM-DD")),
        ))
        .subcommand(Command::new("doctor").about("Check backend connectivity and configuration"))
}
