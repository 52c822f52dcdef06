//! Core data models for the Yemeksepeti client
//!
//! This module contains the typed records produced from upstream responses
//! (addresses, restaurant listings, vendor menus, deals) along with small
//! formatting helpers used when presenting them.

pub mod parse;

pub use parse::{parse_addresses, parse_restaurants, parse_vendor_detail};

use serde::{Deserialize, Serialize};

/// Campaign identifier that unlocks "Joker" discount data on listings
pub const JOKER_CAMPAIGN_ID: &str = "300916482767";

/// A delivery address saved on the customer's account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Upstream address identifier
    pub id: i64,
    /// City name
    pub city: String,
    /// Optional user-given title
    pub title: Option<String>,
    /// Optional label such as "Home" or "Work"
    pub label: Option<String>,
    /// Full single-line address
    pub formatted_customer_address: String,
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
}

impl Address {
    /// Short name for the address: label, then title, then city
    pub fn display_name(&self) -> &str {
        [self.label.as_deref(), self.title.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(self.city.as_str())
    }
}

/// A promotional deal offered by a vendor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub value: f64,
    pub offer_type: String,
    /// Upstream deal type (e.g. "percentage")
    pub deal_type: String,
    pub minimum_order_value: f64,
    pub maximum_discount_amount: f64,
}

impl Deal {
    /// Title when present, otherwise the description
    pub fn headline(&self) -> &str {
        if self.title.is_empty() {
            &self.description
        } else {
            &self.title
        }
    }
}

/// A campaign discount attached to a listing (e.g. a Joker percentage)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountInfo {
    pub id: String,
    pub value: f64,
}

/// A restaurant as it appears in a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Vendor code used to fetch the full menu
    pub code: String,
    pub name: String,
    /// Average rating out of 5
    pub rating: f64,
    pub review_number: u32,
    pub minimum_delivery_fee: f64,
    pub minimum_order_amount: f64,
    /// Estimated delivery time as displayed upstream (e.g. "25-35")
    pub delivery_time: String,
    pub cuisines: Vec<String>,
    pub is_open: bool,
    /// Price level, 1 (cheap) to 3 (expensive)
    pub budget: u32,
    pub deals: Vec<Deal>,
    /// "Free", a formatted fee, or empty when unknown
    pub delivery_fee_label: String,
    pub has_discount: bool,
    pub discounts_info: Vec<DiscountInfo>,
    pub is_voucher_enabled: bool,
}

impl Restaurant {
    /// Value of the first campaign discount, if the listing carries one
    pub fn joker_discount(&self) -> Option<f64> {
        self.discounts_info.first().map(|d| d.value)
    }
}

/// A single purchasable product on a vendor's menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Current price of the first variation
    pub price: f64,
    /// Price before discount, only set when it differs from `price`
    pub discounted_price: Option<f64>,
    /// Name of the menu category the item belongs to
    pub category: String,
    pub variation_id: String,
}

/// A named group of menu items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// Full vendor information including menu and deals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorDetail {
    pub code: String,
    pub name: String,
    pub rating: f64,
    pub review_number: u32,
    pub deals: Vec<Deal>,
    /// Categories with at least one item
    pub menus: Vec<MenuCategory>,
    pub delivery_fee: f64,
    pub minimum_order_amount: f64,
}

impl VendorDetail {
    /// Iterates every item across all categories
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.menus.iter().flat_map(|c| c.items.iter())
    }
}

/// Restaurants carrying a campaign discount, highest discount first
pub fn joker_restaurants(restaurants: &[Restaurant]) -> Vec<Restaurant> {
    let mut joker: Vec<Restaurant> = restaurants
        .iter()
        .filter(|r| !r.discounts_info.is_empty())
        .cloned()
        .collect();

    joker.sort_by(|a, b| {
        let a = a.joker_discount().unwrap_or(0.0);
        let b = b.joker_discount().unwrap_or(0.0);
        b.total_cmp(&a)
    });

    joker
}

/// Formats a lira amount with Turkish digit grouping and no decimals
///
/// `1234.6` becomes `"1.235 ₺"`.
pub fn format_price(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}{} ₺", sign, grouped)
}

/// Renders a rating as a five-slot star bar with an optional half star
pub fn stars(rating: f64) -> String {
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.floor() as usize;
    let half = usize::from(rating - rating.floor() >= 0.5);

    format!(
        "{}{}{}",
        "★".repeat(full),
        "½".repeat(half),
        "☆".repeat(5 - full - half)
    )
}

/// Price level shown as one to three lira signs
pub fn budget_label(budget: u32) -> &'static str {
    match budget {
        0 | 1 => "₺",
        2 => "₺₺",
        _ => "₺₺₺",
    }
}
