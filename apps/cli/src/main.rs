//! Clubfolio operator CLI.
//!
//! Wires the SQLite storage into the core services and exposes the ledger
//! operations as subcommands. Results are printed as JSON.

mod config;
mod main_lib;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use clubfolio_core::assets::NewStock;
use clubfolio_core::clubs::{NewClub, NewFund, NewFundSplit};
use clubfolio_core::members::{MemberCashMovement, MemberRole, NewMembership};
use clubfolio_core::transactions::{Page, TransactionFilter, TransactionInput};
use config::Config;
use main_lib::{build_state, init_tracing};

#[derive(Parser)]
#[command(name = "clubfolio", about = "Investment club ledger and unit accounting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if needed and apply pending migrations.
    Migrate,
    /// Create a club.
    CreateClub {
        #[arg(long)]
        name: String,
        #[arg(long)]
        id: Option<String>,
    },
    /// Create a fund inside a club.
    CreateFund {
        #[arg(long)]
        club: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        id: Option<String>,
    },
    /// Replace a club's fund splits, e.g. `--split f1=0.6 --split f2=0.4`.
    SetSplits {
        #[arg(long)]
        club: String,
        #[arg(long = "split", value_parser = parse_split)]
        splits: Vec<NewFundSplit>,
    },
    /// Add a user to a club.
    AddMember {
        #[arg(long)]
        club: String,
        #[arg(long)]
        user: String,
        /// ADMIN, MEMBER or READ_ONLY.
        #[arg(long, default_value = "MEMBER")]
        role: MemberRole,
    },
    /// Register a stock, or return the existing one.
    AddStock {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Record the price of an asset on a date.
    SetPrice {
        #[arg(long)]
        asset: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        price: Decimal,
    },
    /// Member deposit: cash into the club bank, units issued.
    Deposit {
        #[arg(long)]
        club: String,
        #[arg(long)]
        member: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Member withdrawal: units redeemed, cash out of the club bank.
    Withdraw {
        #[arg(long)]
        club: String,
        #[arg(long)]
        member: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Post a transaction given as a JSON object.
    Post {
        /// e.g. {"clubId":"c1","transactionType":"BUY","transactionDate":"2024-01-10",...}
        json: String,
    },
    /// List a club's transactions, newest first.
    Transactions {
        #[arg(long)]
        club: String,
        #[arg(long)]
        fund: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Show a fund's open positions.
    Holdings {
        #[arg(long)]
        club: String,
        #[arg(long)]
        fund: String,
    },
    /// Value the club on a date and store the unit value.
    Nav {
        #[arg(long)]
        club: String,
        #[arg(long)]
        date: NaiveDate,
        /// Compute without storing.
        #[arg(long, default_value_t = false)]
        preview: bool,
    },
    /// Show a member's units and equity at the latest unit value.
    Equity {
        #[arg(long)]
        club: String,
        #[arg(long)]
        member: String,
    },
}

fn parse_split(raw: &str) -> std::result::Result<NewFundSplit, String> {
    let (fund_id, percentage) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FUND_ID=FRACTION, got '{}'", raw))?;
    let split_percentage = percentage
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid fraction '{}': {}", percentage, e))?;
    Ok(NewFundSplit {
        fund_id: fund_id.trim().to_string(),
        split_percentage,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config.log_format);
    let state = build_state(&config).await?;

    match cli.command {
        Commands::Migrate => {
            tracing::info!("Database is up to date");
        }
        Commands::CreateClub { name, id } => {
            let club = state.club_service.create_club(NewClub { id, name }).await?;
            print_json(&club)?;
        }
        Commands::CreateFund { club, name, id } => {
            let fund = state
                .club_service
                .create_fund(NewFund {
                    id,
                    club_id: club,
                    name,
                })
                .await?;
            print_json(&fund)?;
        }
        Commands::SetSplits { club, splits } => {
            let splits = state.club_service.set_fund_splits(&club, splits).await?;
            print_json(&splits)?;
        }
        Commands::AddMember { club, user, role } => {
            let membership = state
                .member_service
                .add_member(NewMembership {
                    id: None,
                    club_id: club,
                    user_id: user,
                    role,
                })
                .await?;
            print_json(&membership)?;
        }
        Commands::AddStock {
            symbol,
            name,
            currency,
        } => {
            let asset = state
                .asset_service
                .get_or_create_stock(NewStock {
                    symbol,
                    name,
                    currency,
                })
                .await?;
            print_json(&asset)?;
        }
        Commands::SetPrice { asset, date, price } => {
            // Fails with NotFound before anything is written for an unknown id.
            state.asset_service.get_asset_by_id(&asset)?;
            state
                .price_repository
                .upsert_price(&asset, date, price)
                .await?;
            tracing::info!("Recorded {} for {} on {}", price, asset, date);
        }
        Commands::Deposit {
            club,
            member,
            amount,
            date,
        } => {
            let transaction = state
                .member_service
                .deposit(MemberCashMovement {
                    club_id: club,
                    membership_id: member,
                    amount,
                    transaction_date: date,
                })
                .await?;
            print_json(&transaction)?;
        }
        Commands::Withdraw {
            club,
            member,
            amount,
            date,
        } => {
            let transaction = state
                .member_service
                .withdraw(MemberCashMovement {
                    club_id: club,
                    membership_id: member,
                    amount,
                    transaction_date: date,
                })
                .await?;
            print_json(&transaction)?;
        }
        Commands::Post { json } => {
            let input: TransactionInput =
                serde_json::from_str(&json).context("invalid transaction JSON")?;
            let posted = state
                .transaction_service
                .create_transaction_from_input(input)
                .await?;
            print_json(&posted.transaction)?;
            if !posted.linked.is_empty() {
                print_json(&posted.linked)?;
            }
            if !posted.unallocated_amount.is_zero() {
                tracing::warn!(
                    "{} was not covered by fund splits and stays in the bank",
                    posted.unallocated_amount
                );
            }
        }
        Commands::Transactions {
            club,
            fund,
            offset,
            limit,
        } => {
            let page = state.transaction_service.list_transactions(
                TransactionFilter {
                    club_id: club,
                    fund_id: fund,
                    ..TransactionFilter::default()
                },
                Page { offset, limit },
            )?;
            print_json(&page)?;
        }
        Commands::Holdings { club, fund } => {
            let holdings = state.position_service.get_fund_holdings(&club, &fund)?;
            print_json(&holdings)?;
        }
        Commands::Nav {
            club,
            date,
            preview,
        } => {
            if preview {
                let calculation = state.nav_service.preview_nav(&club, date).await?;
                print_json(&calculation)?;
            } else {
                let snapshot = state.nav_service.calculate_and_store_nav(&club, date).await?;
                print_json(&snapshot)?;
            }
        }
        Commands::Equity { club, member } => {
            let equity = state.member_service.get_member_equity(&club, &member)?;
            print_json(&equity)?;
        }
    }

    Ok(())
}
