//! medsource: MedSource edge CLI
//!
//! Drives the fetch interceptor against real URLs and prints permission
//! tables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use medsource::permissions::{
    CustomerPermissions, Grants, OrderPermissions, OrderStatus, ProviderPermissions,
    QuotePermissions, QuoteStatus, Role, RolePermissions,
};
use medsource::{Config, Destination, Request, WorkerBuilder};
use tracing::info;

/// MedSource edge CLI
#[derive(Parser)]
#[command(name = "medsource")]
#[command(version = medsource::PKG_VERSION)]
#[command(about = "MedSource fetch interceptor and permission tool")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "MEDSOURCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch URLs through the interceptor
    Fetch {
        /// URLs to fetch, in order
        #[arg(required = true)]
        urls: Vec<String>,
        /// Fetch destination (image, script, style, document, ...)
        #[arg(short, long, value_parser = parse_destination)]
        destination: Option<Destination>,
        /// Fetch every URL this many times
        #[arg(short, long, default_value_t = 1)]
        repeat: u32,
        /// Print per-cache entry counts at the end
        #[arg(long)]
        stats: bool,
        /// Origin precache paths resolve against (overrides config)
        #[arg(long)]
        origin: Option<String>,
        /// Skip precaching at install
        #[arg(long)]
        no_precache: bool,
    },

    /// Print the capabilities of one role, or of every role side by side
    Permissions {
        /// Role name or level (e.g. "sales_rep", "2")
        #[arg(short, long)]
        role: Option<Role>,
        /// Evaluate record-level checks as the record's owner
        #[arg(long)]
        owner: bool,
        /// Order status for the order checks
        #[arg(long, value_parser = parse_order_status, default_value = "pending")]
        order_status: OrderStatus,
        /// Quote status for the quote checks
        #[arg(long, value_parser = parse_quote_status, default_value = "draft")]
        quote_status: QuoteStatus,
    },
}

fn parse_destination(s: &str) -> Result<Destination, String> {
    Destination::parse(s).ok_or_else(|| format!("unknown destination {s:?}"))
}

fn parse_order_status(s: &str) -> Result<OrderStatus, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown order status {s:?}"))
}

fn parse_quote_status(s: &str) -> Result<QuoteStatus, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown quote status {s:?}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Fetch {
            urls,
            destination,
            repeat,
            stats,
            origin,
            no_precache,
        } => {
            let config = Config::load(args.config.as_deref())?;
            let mut builder = WorkerBuilder::from_config(&config);
            if let Some(origin) = origin {
                builder = builder.origin(origin);
            }
            if no_precache {
                builder = builder.precache(Vec::<String>::new());
            }
            let worker = builder.build()?;

            info!(version = medsource::version_string(), "medsource starting");
            worker.start().await?;

            for round in 1..=repeat {
                for url in &urls {
                    let mut request = Request::get(url)?;
                    if let Some(destination) = destination {
                        request = request.destination(destination);
                    }
                    let class = worker.classify(&request);
                    match worker.handle_fetch(&request).await {
                        Ok(response) => println!(
                            "[{round}] {} {:<13} {:<14} {:>8}B {url}",
                            response.status.as_u16(),
                            class.as_str(),
                            response.source.as_str(),
                            response.body.len(),
                        ),
                        Err(e) => println!("[{round}] ERR {:<13} {e} {url}", class.as_str()),
                    }
                }
            }

            if stats {
                println!();
                for stat in worker.cache_stats().await {
                    println!("{:<32} {}", stat.cache_name, stat.item_count);
                }
            }
        }

        Command::Permissions {
            role,
            owner,
            order_status,
            quote_status,
        } => {
            let roles: Vec<Role> = match role {
                Some(role) => vec![role],
                None => Role::ALL.to_vec(),
            };

            print_table("role", &roles, |r| {
                RolePermissions::derive(Some(r)).entries()
            });
            print_table(
                &format!("order ({}, owner: {owner})", humanize(order_status)),
                &roles,
                |r| OrderPermissions::derive(Some(r), owner, order_status).entries(),
            );
            print_table(
                &format!("quote ({}, owner: {owner})", humanize(quote_status)),
                &roles,
                |r| QuotePermissions::derive(Some(r), owner, quote_status).entries(),
            );
            print_table(&format!("customer (self: {owner})"), &roles, |r| {
                CustomerPermissions::derive(Some(r), owner).entries()
            });
            print_table("provider", &roles, |r| {
                ProviderPermissions::derive(Some(r)).entries()
            });
        }
    }

    Ok(())
}

fn humanize<T: serde::Serialize>(status: T) -> String {
    let raw = serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    medsource::format::humanize_status(&raw)
}

/// Print one row per capability, one column per role.
fn print_table<F>(title: &str, roles: &[Role], grants: F)
where
    F: Fn(Role) -> Vec<(&'static str, bool)>,
{
    let columns: Vec<Vec<(&'static str, bool)>> = roles.iter().map(|r| grants(*r)).collect();
    let Some(first) = columns.first() else {
        return;
    };

    println!("{title}");
    print!("  {:<22}", "");
    for role in roles {
        print!(" {:>23}", role.as_str());
    }
    println!();

    for (row, (name, _)) in first.iter().enumerate() {
        print!("  {name:<22}");
        for column in &columns {
            let mark = if column[row].1 { "yes" } else { "-" };
            print!(" {mark:>23}");
        }
        println!();
    }
    println!();
}
