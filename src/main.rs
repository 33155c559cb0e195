use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use cardbook::config::{Config, ConfigStore};
use cardbook::gateway::Location;
use cardbook::models::{CardFilters, RecordFilters};
use cardbook::stores::{FetchMode, StoreError};
use cardbook::Client;

#[derive(Parser, Debug)]
#[command(name = "cardbook", version)]
#[command(about = "Command-line client for the cardbook credit-card ledger", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/cardbook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log in with this mobile number before running the command
    #[arg(long, global = true, env = "CARDBOOK_MOBILE")]
    mobile: Option<String>,

    /// Password for --mobile
    #[arg(long, global = true, env = "CARDBOOK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the logged-in user
    Whoami,

    /// List cards
    Cards {
        /// Only active (true) or inactive (false) cards
        #[arg(long)]
        active: Option<bool>,
    },

    /// Show one card
    Card { id: String },

    /// List swipe types and consumption types
    Categories,

    /// List records, newest first
    Records {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Spending per consumption type
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Recent consumption summary
    Recent,

    /// Home dashboard summary
    Dashboard,

    /// End the session
    Logout,
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    #[arg(long)]
    card_id: Option<String>,

    #[arg(long)]
    consumption_type_id: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    end_date: Option<String>,
}

impl From<FilterArgs> for RecordFilters {
    fn from(args: FilterArgs) -> Self {
        RecordFilters {
            card_id: args.card_id,
            consumption_type_id: args.consumption_type_id,
            start_date: args.start_date,
            end_date: args.end_date,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    cardbook::init_tracing();
    let cli = Cli::parse();

    let path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = ConfigStore::open(path).context("Failed to load configuration")?;
    let client = Client::from_config(&config.get(), Arc::new(Location::default()))
        .context("Failed to build HTTP client")?;

    if let Err(err) = run(&client, cli).await {
        client.report(&err);
        let notice = client.messages().current();
        bail!("{}: {}", notice.severity, notice.text);
    }
    Ok(())
}

async fn run(client: &Client, cli: Cli) -> Result<(), StoreError> {
    let users = client.users();
    match (&cli.mobile, &cli.password) {
        (Some(mobile), Some(password)) => {
            users.login(mobile, password).await?;
        }
        _ if matches!(cli.command, Command::Logout) => {}
        _ => {
            users.init_user().await?;
        }
    }

    match cli.command {
        Command::Whoami => print_json(&users.current_user()),
        Command::Cards { active } => {
            let filters = CardFilters {
                is_active: active,
                ..CardFilters::default()
            };
            for card in client.cards().fetch_cards(&filters).await? {
                println!(
                    "{:<24} {:>12.2}  bill {:>2}  due {:>2}  {}",
                    card.display_name(),
                    card.credit_limit,
                    card.bill_day,
                    card.payment_day,
                    card.id
                );
            }
        }
        Command::Card { id } => print_json(&client.cards().card_detail(&id).await?),
        Command::Categories => {
            let categories = client.categories();
            println!("Swipe types:");
            for swipe in categories.fetch_swipe_types().await? {
                println!("  {:<16} {}", swipe.name, swipe.id);
            }
            println!("Consumption types:");
            for consumption in categories.fetch_consumption_types().await? {
                println!("  {:<16} {}", consumption.name, consumption.id);
            }
        }
        Command::Records { filters, pages } => {
            let filters = RecordFilters::from(filters);
            let records = client.records();
            records.reset_records();
            records.fetch_records(&filters, FetchMode::Replace).await?;
            for _ in 1..pages {
                if records.load_more_records(&filters).await?.is_none() {
                    break;
                }
            }

            let state = records.state();
            for record in &state.records {
                println!(
                    "{:<26} {:>10.2}  {:<6} {}",
                    record.trade_date.as_deref().unwrap_or("-"),
                    record.amount,
                    match record.record_type {
                        cardbook::models::RecordKind::Payment => "pay",
                        cardbook::models::RecordKind::Repayment => "repay",
                    },
                    record.description.as_deref().unwrap_or("")
                );
            }
            println!(
                "{} of {} records",
                state.records.len(),
                state.pagination.total
            );
        }
        Command::Stats { filters } => {
            let stats = client
                .records()
                .fetch_stats(&RecordFilters::from(filters))
                .await?;
            for stat in &stats.stats {
                println!(
                    "{:<16} {:>12.2}  ({} records)",
                    stat.consumption_type_name, stat.total_amount, stat.count
                );
            }
            println!("{:<16} {:>12.2}", "Total", stats.total_amount);
        }
        Command::Recent => print_json(&client.records().fetch_recent_consumptions().await?),
        Command::Dashboard => print_json(&client.dashboard().await?),
        Command::Logout => {
            users.logout().await;
            client.messages().success("Logged out");
            println!("{}", client.messages().current().text);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error = %e, "Failed to render output"),
    }
}
