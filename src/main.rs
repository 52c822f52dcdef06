//! Yemeksepeti CLI - Browse restaurants and menus from the terminal
//!
//! Loads credentials from the environment (or `.env`), runs one command
//! against the API and prints the result. Progress messages from the fetch
//! layer (cooldown waits, retries, cache hits) go to stderr as they happen.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use yemeksepeti::api::{with_printer, ApiClient, ApiContext, ApiError};
use yemeksepeti::cli::{pick_address, Cli, Command};
use yemeksepeti::config::Credentials;
use yemeksepeti::data::joker_restaurants;
use yemeksepeti::report;

/// Sets up logging to stderr, filtered by `RUST_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Turns an error into the message shown to the user
fn describe_error(err: &(dyn std::error::Error + 'static), context: &str) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) if api_err.is_challenge() => format!(
            "CAPTCHA protection could not be bypassed ({}). Wait a few minutes and try again.",
            context
        ),
        _ => format!("{}: {}", context, err),
    }
}

/// Resolves the delivery coordinates for a command
async fn resolve_coordinates(
    client: &ApiClient,
    command: &Command,
) -> Result<(f64, f64), Box<dyn std::error::Error>> {
    let Some(location) = command.location() else {
        return Ok((0.0, 0.0));
    };
    if let Some(coords) = location.coordinates()? {
        return Ok(coords);
    }

    let addresses = client.get_addresses().await?;
    let address = pick_address(&addresses, location.address)?;
    eprintln!("Delivering to {}", address.display_name());
    Ok((address.latitude, address.longitude))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Validate flags before touching credentials or the network
    if let Some(location) = cli.command.location() {
        location.coordinates()?;
    }

    let credentials = Credentials::from_env()?;

    with_printer(
        |message| eprintln!("{}", message),
        |status| async move {
            let context = ApiContext::new(status);
            let result = execute(&cli.command, credentials, &context).await;
            result
        },
    )
    .await
}

/// Runs one command against the API and prints its output
async fn execute(
    command: &Command,
    credentials: Credentials,
    context: &ApiContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(credentials, context)?;
    let (lat, lng) = resolve_coordinates(&client, command).await?;

    match command {
        Command::Addresses => {
            let addresses = client.get_addresses().await?;
            for address in &addresses {
                println!("{}", report::address_line(address));
            }
            eprintln!("{} addresses", addresses.len());
        }
        Command::Restaurants { .. } | Command::Joker { .. } => {
            let query = command.restaurant_query().unwrap_or_default();
            let mut restaurants = client.get_restaurants(lat, lng, &query).await?;
            if matches!(command, Command::Joker { .. }) {
                restaurants = joker_restaurants(&restaurants);
            }
            for restaurant in &restaurants {
                println!("{}", report::restaurant_lines(restaurant));
            }
            eprintln!("{} restaurants", restaurants.len());
        }
        Command::Menu { code, .. } => {
            let vendor = client.get_vendor_detail(code, lat, lng).await?;
            print!("{}", report::vendor_menu(&vendor));
        }
        Command::Search { query, .. } => {
            let hits = client.search_menu(lat, lng, query, &[]).await?;
            if hits.is_empty() {
                eprintln!("No results for \"{}\"", query);
            }
            for hit in &hits {
                println!("{}", report::search_hit_line(hit));
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let context = match &cli.command {
        Command::Addresses => "Addresses",
        Command::Restaurants { .. } => "Restaurants",
        Command::Joker { .. } => "Joker",
        Command::Menu { .. } => "Menu",
        Command::Search { .. } => "Search",
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", describe_error(err.as_ref(), context));
            ExitCode::FAILURE
        }
    }
}
