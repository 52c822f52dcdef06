//! Command-line interface parsing for the Yemeksepeti CLI
//!
//! This module handles parsing of CLI arguments using clap: which listing to
//! show and where to deliver to (explicit coordinates or a saved address).

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::api::RestaurantQuery;
use crate::data::{Address, JOKER_CAMPAIGN_ID};

/// Page size for the Joker listing, matching the home screen of the app
pub const JOKER_LISTING_LIMIT: u32 = 100;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// Only one half of a coordinate pair was given
    #[error("--lat and --lng must be given together")]
    IncompleteCoordinates,

    /// The requested saved address does not exist
    #[error("No saved address with id {0}")]
    UnknownAddress(i64),

    /// The account has no saved addresses to fall back on
    #[error("No saved addresses on this account; pass --lat and --lng")]
    NoAddresses,
}

/// Yemeksepeti CLI - Browse restaurants and menus from the terminal
#[derive(Parser, Debug)]
#[command(name = "yemeksepeti")]
#[command(about = "Browse Yemeksepeti restaurants, deals and menus")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the delivery addresses saved on the account
    Addresses,

    /// List restaurants delivering to a location
    Restaurants {
        #[command(flatten)]
        location: Location,

        /// Cuisine filter
        #[arg(long)]
        cuisine: Option<String>,

        /// Sort order (e.g. rating_desc)
        #[arg(long)]
        sort: Option<String>,

        /// Number of restaurants per page
        #[arg(long)]
        limit: Option<u32>,

        /// Pagination offset
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Include Joker campaign discounts in the listing
        #[arg(long)]
        joker: bool,
    },

    /// List restaurants with a Joker discount, biggest discount first
    Joker {
        #[command(flatten)]
        location: Location,
    },

    /// Show a restaurant's menu and deals
    Menu {
        /// Vendor code (shown in the restaurant listing)
        code: String,

        #[command(flatten)]
        location: Location,
    },

    /// Search nearby menus for a dish
    Search {
        /// Text to look for in item names and descriptions
        query: String,

        #[command(flatten)]
        location: Location,
    },
}

// Where to deliver to:
//   yemeksepeti restaurants --lat 41.0082 --lng 28.9784
//   yemeksepeti restaurants --address 123456
//   yemeksepeti restaurants            # first saved address
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct Location {
    /// Latitude of the delivery location
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the delivery location
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Id of a saved address to deliver to
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub address: Option<i64>,
}

impl Location {
    /// Explicit coordinates, if both were given
    ///
    /// # Returns
    /// * `Ok(Some((lat, lng)))` when both flags are present
    /// * `Ok(None)` when neither is, so a saved address should be used
    /// * `Err(CliError::IncompleteCoordinates)` when only one is
    pub fn coordinates(&self) -> Result<Option<(f64, f64)>, CliError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(Some((lat, lng))),
            (None, None) => Ok(None),
            _ => Err(CliError::IncompleteCoordinates),
        }
    }
}

/// Picks the saved address to deliver to
///
/// # Arguments
/// * `addresses` - Addresses saved on the account
/// * `id` - Requested address id, or `None` for the first one
pub fn pick_address(addresses: &[Address], id: Option<i64>) -> Result<&Address, CliError> {
    match id {
        Some(id) => addresses
            .iter()
            .find(|a| a.id == id)
            .ok_or(CliError::UnknownAddress(id)),
        None => addresses.first().ok_or(CliError::NoAddresses),
    }
}

impl Command {
    /// Delivery location for commands that need one
    pub fn location(&self) -> Option<&Location> {
        match self {
            Command::Addresses => None,
            Command::Restaurants { location, .. }
            | Command::Joker { location }
            | Command::Menu { location, .. }
            | Command::Search { location, .. } => Some(location),
        }
    }

    /// Listing query for the `restaurants` and `joker` commands
    pub fn restaurant_query(&self) -> Option<RestaurantQuery> {
        match self {
            Command::Restaurants {
                cuisine,
                sort,
                limit,
                offset,
                joker,
                ..
            } => {
                let mut query = RestaurantQuery::new().offset(*offset);
                query.cuisine = cuisine.clone();
                query.sort = sort.clone();
                query.limit = *limit;
                if *joker {
                    query = query.joker(JOKER_CAMPAIGN_ID);
                }
                Some(query)
            }
            Command::Joker { .. } => Some(
                RestaurantQuery::new()
                    .limit(JOKER_LISTING_LIMIT)
                    .joker(JOKER_CAMPAIGN_ID),
            ),
            _ => None,
        }
    }
}
