//! Load Suggest - interactive type-ahead demo
//!
//! Runs the suggestion service over an in-memory store and answers search
//! commands read from stdin.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use load_suggest::{Address, Config, DataSource, InMemoryDataSource, SuggestService};

const SEARCH_LIMIT: usize = 10;

const HELP: &str = "\
commands:
  c <query>                            search customers
  a <customer> | <query>               search a customer's addresses
  add <name>                           add a customer
  addr <customer> | <street> | <city>  add an address
  flush                                invalidate all cached suggestions
  stats                                print cache metrics
  quit                                 shut down";

#[derive(Debug, PartialEq)]
enum Command {
    Customers(String),
    Addresses { customer: String, query: String },
    AddCustomer(String),
    AddAddress {
        customer: String,
        street: String,
        city: String,
    },
    Flush,
    Stats,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let fields: Vec<String> = rest.split('|').map(|f| f.trim().to_string()).collect();

    match (verb, fields.as_slice()) {
        ("c", [query]) => Some(Command::Customers(query.clone())),
        ("a", [customer, query]) => Some(Command::Addresses {
            customer: customer.clone(),
            query: query.clone(),
        }),
        ("add", [name]) if !name.is_empty() => Some(Command::AddCustomer(name.clone())),
        ("addr", [customer, street, city]) => Some(Command::AddAddress {
            customer: customer.clone(),
            street: street.clone(),
            city: city.clone(),
        }),
        ("flush", _) => Some(Command::Flush),
        ("stats", _) => Some(Command::Stats),
        ("help", _) | ("?", _) => Some(Command::Help),
        ("quit", _) | ("exit", _) => Some(Command::Quit),
        _ => None,
    }
}

fn seed_source() -> anyhow::Result<InMemoryDataSource> {
    let source = InMemoryDataSource::with_customers([
        "ACME Freight",
        "Acme Produce Co",
        "Blue Line Logistics",
        "Coastal Cold Storage",
        "Northwind Traders",
        "Zeta Manufacturing",
    ]);
    let addresses = [
        ("ACME Freight", Address::new("Main Warehouse", "100 Main St", "Springfield", "IL", "62701")),
        ("ACME Freight", Address::new("Dock 4", "4 Harbor Rd", "Chicago", "IL", "60601")),
        ("Coastal Cold Storage", Address::new("Plant", "77 Bay Ave", "Savannah", "GA", "31401")),
        ("Northwind Traders", Address::new("", "12 Main St", "Columbus", "OH", "43004")),
    ];
    for (customer, address) in addresses {
        source
            .insert_address(customer, &address)
            .with_context(|| format!("seeding address for {}", customer))?;
    }
    Ok(source)
}

/// Main entry point for the suggestion demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Seed the in-memory store and start the service
/// 4. Answer stdin commands until quit, EOF or Ctrl+C
/// 5. Shut the service down within its grace period
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "load_suggest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Load Suggest");

    let config = Config::from_env();
    info!(
        "Configuration loaded: customer_cache={}, address_cache={}, ttl={}ms, incremental_pass={}ms",
        config.max_entries_customer_cache,
        config.max_entries_address_cache,
        config.ttl_millis,
        config.incremental_pass_interval_millis
    );

    let source = Arc::new(seed_source()?);
    let service = SuggestService::start(config, source).context("starting suggestion service")?;

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, initiating shutdown...");
                None
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Some(Command::Customers(query)) => {
                for name in service.search_customers(&query, SEARCH_LIMIT).await {
                    println!("  {}", name);
                }
            }
            Some(Command::Addresses { customer, query }) => {
                for address in service.search_addresses(&query, &customer, SEARCH_LIMIT).await {
                    println!("  {}", address.display_line());
                }
            }
            Some(Command::AddCustomer(name)) => match service.record_customer_added(&name).await {
                Ok(()) => println!("  added {} (visible after the next incremental pass)", name),
                Err(err) => println!("  error: {}", err),
            },
            Some(Command::AddAddress {
                customer,
                street,
                city,
            }) => {
                let address = Address::new("", street, city, "", "");
                match service.record_address_added(&customer, address).await {
                    Ok(id) => println!("  added address #{}", id),
                    Err(err) => println!("  error: {}", err),
                }
            }
            Some(Command::Flush) => println!("  dropped {} entries", service.invalidate_all()),
            Some(Command::Stats) => {
                println!("{}", serde_json::to_string_pretty(&service.metrics_snapshot())?);
            }
            Some(Command::Help) => println!("{}", HELP),
            Some(Command::Quit) => break,
            None => println!("  unrecognized command, try `help`"),
        }
    }

    service.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}
