//! Cobro CLI
//!
//! Command-line surface over the debt ledger. Every subcommand maps to
//! one engine command; the engine validates, the CLI only parses and
//! prints.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cobro_core::advisor::{
    NoopAdvisor, collection_message_or_fallback, portfolio_review_or_fallback,
};
use cobro_core::currency::{Currency, RateTable};
use cobro_core::debt::{NewClient, PaymentInput};
use cobro_core::ledger::{Ledger, Persistence, Snapshot};
use cobro_shared::{AppConfig, ClientId, DebtId, ProductId};
use cobro_store::JsonStore;

/// Track client debts and the payments that reduce them.
#[derive(Parser, Debug)]
#[command(name = "cobro")]
#[command(about = "Track client debts and the payments that reduce them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage clients
    Client {
        #[command(subcommand)]
        action: ClientAction,
    },
    /// Manage the product catalog
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage debts
    Debt {
        #[command(subcommand)]
        action: DebtAction,
    },
    /// Pay one specific debt
    Pay {
        /// Client that owes the debt
        client_id: ClientId,
        /// Debt to pay
        debt_id: DebtId,
        /// Amount tendered, in --currency
        amount: Decimal,
        /// Currency tendered
        #[arg(long, value_parser = parse_currency, default_value = "CUP")]
        currency: Currency,
        /// Exchange rate override (CUP per unit); defaults to the
        /// configured rate for the currency
        #[arg(long)]
        rate: Option<Decimal>,
        /// Unit price in the tendered currency (required for box debts)
        #[arg(long)]
        price_per_unit: Option<Decimal>,
        /// Free-text note on the payment
        #[arg(long)]
        note: Option<String>,
    },
    /// Spread one lump payment across a client's money debts, oldest first
    PayLump {
        /// Client to credit
        client_id: ClientId,
        /// Amount tendered, in --currency
        amount: Decimal,
        /// Currency tendered
        #[arg(long, value_parser = parse_currency, default_value = "CUP")]
        currency: Currency,
        /// Exchange rate override (CUP per unit)
        #[arg(long)]
        rate: Option<Decimal>,
    },
    /// Show portfolio totals
    Summary,
    /// Draft a payment reminder for a client
    Message {
        /// Client to remind
        client_id: ClientId,
    },
    /// Review the health of the whole portfolio
    Review,
    /// Export a backup file
    Export {
        /// Directory to write into; defaults to the configured backup dir
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Restore a backup file, replacing ALL current data
    Restore {
        /// Backup file to restore
        file: PathBuf,
    },
    /// Factory reset: delete every client, debt, and product
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ClientAction {
    /// Register a new client
    Add {
        /// Client name
        name: String,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a client and all their history
    Rm {
        /// Client to delete
        client_id: ClientId,
    },
    /// List clients with their balances
    List,
}

#[derive(Subcommand, Debug)]
enum ProductAction {
    /// Add a product to the catalog
    Add {
        /// Product name
        name: String,
    },
    /// Remove a product (existing debts keep their name snapshot)
    Rm {
        /// Product to remove
        product_id: ProductId,
    },
    /// List the catalog
    List,
}

#[derive(Subcommand, Debug)]
enum DebtAction {
    /// Record a money debt
    Money {
        /// Client that owes
        client_id: ClientId,
        /// Amount owed, in --currency
        amount: Decimal,
        /// Currency of the debt
        #[arg(long, value_parser = parse_currency, default_value = "CUP")]
        currency: Currency,
        /// Exchange rate override (CUP per unit)
        #[arg(long)]
        rate: Option<Decimal>,
        /// Description of the debt
        #[arg(long)]
        description: Option<String>,
    },
    /// Record a box debt (merges into the open debt for the product)
    Boxes {
        /// Client that owes
        client_id: ClientId,
        /// Product owed
        product_id: ProductId,
        /// Number of boxes
        quantity: Decimal,
    },
    /// Delete a debt and its payment history
    Rm {
        /// Client that owes the debt
        client_id: ClientId,
        /// Debt to delete
        debt_id: DebtId,
    },
}

fn parse_currency(s: &str) -> Result<Currency, String> {
    Currency::from_str(s)
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cobro=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;
    let rates = RateTable::from_config(&config.rates);

    let store = JsonStore::new(&config.storage.snapshot_path);
    let mut ledger = Ledger::open(store).context("failed to load the ledger snapshot")?;

    match cli.command {
        Command::Client { action } => run_client(&mut ledger, action)?,
        Command::Product { action } => run_product(&mut ledger, action)?,
        Command::Debt { action } => run_debt(&mut ledger, &rates, action)?,
        Command::Pay {
            client_id,
            debt_id,
            amount,
            currency,
            rate,
            price_per_unit,
            note,
        } => {
            let input = PaymentInput {
                amount,
                currency,
                exchange_rate: rate.unwrap_or_else(|| rates.default_rate(currency)),
                price_per_unit,
                note,
            };
            let outcome = ledger.pay_debt(client_id, debt_id, &input)?;
            let payment = &outcome.payment;
            match payment.quantity_paid {
                Some(quantity) => println!(
                    "Recorded {} {} -> {} boxes settled",
                    payment.amount_paid_original, payment.currency, quantity
                ),
                None => println!(
                    "Recorded {} {} ({} CUP)",
                    payment.amount_paid_original, payment.currency, payment.amount_paid_cup
                ),
            }
            report_persistence(&outcome.persistence);
        }
        Command::PayLump {
            client_id,
            amount,
            currency,
            rate,
        } => {
            let rate = rate.unwrap_or_else(|| rates.default_rate(currency));
            let receipt = ledger.pay_cascading(client_id, amount, currency, rate)?;
            println!(
                "Distributed {} CUP across {} debt(s)",
                receipt.cascade.distributed_cup,
                receipt.cascade.payments.len()
            );
            if receipt.cascade.unallocated_cup > Decimal::ZERO {
                println!(
                    "Unallocated remainder: {} CUP (all money debts are settled)",
                    receipt.cascade.unallocated_cup
                );
            }
            report_persistence(&receipt.persistence);
        }
        Command::Summary => print_summary(ledger.snapshot()),
        Command::Message { client_id } => {
            let client = ledger
                .snapshot()
                .client(client_id)
                .with_context(|| format!("client not found: {client_id}"))?;
            println!("{}", collection_message_or_fallback(&NoopAdvisor, client));
        }
        Command::Review => {
            println!(
                "{}",
                portfolio_review_or_fallback(&NoopAdvisor, ledger.snapshot())
            );
        }
        Command::Export { dir } => {
            let backup = ledger.export_backup();
            let dir = dir.unwrap_or_else(|| config.storage.backup_dir.clone());
            let path = cobro_store::export_to_dir(&backup, &dir)?;
            println!("Backup written to {}", path.display());
        }
        Command::Restore { file } => {
            let backup = cobro_store::import_from_file(&file)?;
            let outcome = ledger.restore_backup(backup);
            println!(
                "Restored {} client(s) and {} product(s)",
                outcome.snapshot.clients.len(),
                outcome.snapshot.products.len()
            );
            report_persistence(&outcome.persistence);
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("refusing to reset without --yes: this permanently deletes all data");
            }
            let outcome = ledger.reset();
            println!("Ledger reset");
            report_persistence(&outcome.persistence);
        }
    }

    Ok(())
}

fn run_client(ledger: &mut Ledger<JsonStore>, action: ClientAction) -> anyhow::Result<()> {
    match action {
        ClientAction::Add {
            name,
            phone,
            email,
            notes,
        } => {
            let outcome = ledger.create_client(NewClient {
                name,
                phone,
                email,
                notes,
            });
            let client = outcome
                .snapshot
                .clients
                .last()
                .context("client was not created")?;
            println!("Created client {} ({})", client.name, client.id);
            report_persistence(&outcome.persistence);
        }
        ClientAction::Rm { client_id } => {
            let outcome = ledger.delete_client(client_id)?;
            println!("Deleted client {client_id}");
            report_persistence(&outcome.persistence);
        }
        ClientAction::List => {
            let snapshot = ledger.snapshot();
            if snapshot.clients.is_empty() {
                println!("No clients registered");
            }
            for client in &snapshot.clients {
                let boxes = client.pending_boxes();
                let boxes_note = if boxes > Decimal::ZERO {
                    format!(" + {boxes} boxes")
                } else {
                    String::new()
                };
                println!(
                    "{}  {}  owes {} CUP{}",
                    client.id,
                    client.name,
                    client.total_remaining_cup(),
                    boxes_note
                );
            }
        }
    }
    Ok(())
}

fn run_product(ledger: &mut Ledger<JsonStore>, action: ProductAction) -> anyhow::Result<()> {
    match action {
        ProductAction::Add { name } => {
            let outcome = ledger.create_product(name);
            let product = outcome
                .snapshot
                .products
                .last()
                .context("product was not created")?;
            println!("Created product {} ({})", product.name, product.id);
            report_persistence(&outcome.persistence);
        }
        ProductAction::Rm { product_id } => {
            let outcome = ledger.delete_product(product_id)?;
            println!("Deleted product {product_id}");
            report_persistence(&outcome.persistence);
        }
        ProductAction::List => {
            let snapshot = ledger.snapshot();
            if snapshot.products.is_empty() {
                println!("Catalog is empty");
            }
            for product in &snapshot.products {
                println!("{}  {}", product.id, product.name);
            }
        }
    }
    Ok(())
}

fn run_debt(
    ledger: &mut Ledger<JsonStore>,
    rates: &RateTable,
    action: DebtAction,
) -> anyhow::Result<()> {
    match action {
        DebtAction::Money {
            client_id,
            amount,
            currency,
            rate,
            description,
        } => {
            let rate = rate.unwrap_or_else(|| rates.default_rate(currency));
            let outcome =
                ledger.create_monetary_debt(client_id, amount, currency, rate, description)?;
            println!("Recorded money debt {}", outcome.debt_id);
            report_persistence(&outcome.persistence);
        }
        DebtAction::Boxes {
            client_id,
            product_id,
            quantity,
        } => {
            let outcome = ledger.create_inventory_debt(client_id, product_id, quantity)?;
            println!("Recorded {quantity} box(es) on debt {}", outcome.debt_id);
            report_persistence(&outcome.persistence);
        }
        DebtAction::Rm {
            client_id,
            debt_id,
        } => {
            let outcome = ledger.delete_debt(client_id, debt_id)?;
            println!("Deleted debt {debt_id} and its payment history");
            report_persistence(&outcome.persistence);
        }
    }
    Ok(())
}

fn print_summary(snapshot: &Snapshot) {
    println!("Total receivable: {} CUP", snapshot.total_receivable_cup());
    let boxes = snapshot.pending_boxes();
    if boxes > Decimal::ZERO {
        println!("Pending boxes:    {boxes}");
    }
    println!(
        "Active clients:   {} / {}",
        snapshot.active_clients(),
        snapshot.clients.len()
    );
}

fn report_persistence(persistence: &Persistence) {
    if let Persistence::Degraded(err) = persistence {
        warn!(%err, "snapshot was NOT persisted; changes live in memory only");
        eprintln!("warning: could not persist the snapshot: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pay_parses_with_defaults() {
        let cli = Cli::try_parse_from([
            "cobro",
            "pay",
            "a3bb189e-8bf9-3888-9912-ace4e6543002",
            "b4cc289e-8bf9-3888-9912-ace4e6543003",
            "450",
            "--price-per-unit",
            "50",
        ])
        .unwrap();

        match cli.command {
            Command::Pay {
                amount,
                currency,
                rate,
                price_per_unit,
                ..
            } => {
                assert_eq!(amount, Decimal::from(450));
                assert_eq!(currency, Currency::Cup);
                assert_eq!(rate, None);
                assert_eq!(price_per_unit, Some(Decimal::from(50)));
            }
            _ => panic!("expected pay command"),
        }
    }

    #[test]
    fn test_currency_is_validated() {
        let result = Cli::try_parse_from([
            "cobro",
            "pay-lump",
            "a3bb189e-8bf9-3888-9912-ace4e6543002",
            "100",
            "--currency",
            "DOGE",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_reset_requires_flag_to_be_present() {
        let cli = Cli::try_parse_from(["cobro", "reset"]).unwrap();
        match cli.command {
            Command::Reset { yes } => assert!(!yes),
            _ => panic!("expected reset command"),
        }
    }
}
