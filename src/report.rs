//! Plain-text rendering of API results for the command line

use crate::api::SearchHit;
use crate::data::{budget_label, format_price, stars, Address, Restaurant, VendorDetail};

/// One line per address: `[id] name - full address`
pub fn address_line(address: &Address) -> String {
    format!(
        "[{}] {} - {}",
        address.id,
        address.display_name(),
        address.formatted_customer_address
    )
}

/// Two-line summary of a restaurant listing entry
pub fn restaurant_lines(restaurant: &Restaurant) -> String {
    let status = if restaurant.is_open { "open" } else { "closed" };

    let mut headline = format!(
        "{} ({}) [{}]  {} {}  {}",
        restaurant.name,
        restaurant.code,
        status,
        stars(restaurant.rating),
        restaurant.rating,
        budget_label(restaurant.budget)
    );
    if let Some(discount) = restaurant.joker_discount() {
        headline.push_str(&format!("  Joker %{}", discount));
    }
    if let Some(deal) = restaurant.deals.first() {
        headline.push_str(&format!("  Deal: {}", deal.headline()));
    }

    let mut detail = format!(
        "    {}  |  Min: {}",
        restaurant.cuisines.join(", "),
        format_price(restaurant.minimum_order_amount)
    );
    if !restaurant.delivery_fee_label.is_empty() {
        detail.push_str(&format!("  Delivery: {}", restaurant.delivery_fee_label));
    }
    if !restaurant.delivery_time.is_empty() {
        detail.push_str(&format!("  |  {} min", restaurant.delivery_time));
    }

    format!("{}\n{}", headline, detail)
}

/// Full menu of a vendor grouped by category
pub fn vendor_menu(vendor: &VendorDetail) -> String {
    let mut out = format!(
        "{}  {} {} ({} reviews)\nDelivery: {}  |  Min order: {}\n",
        vendor.name,
        stars(vendor.rating),
        vendor.rating,
        vendor.review_number,
        format_price(vendor.delivery_fee),
        format_price(vendor.minimum_order_amount)
    );

    for deal in &vendor.deals {
        out.push_str(&format!("  Deal: {}\n", deal.headline()));
    }

    for category in &vendor.menus {
        out.push_str(&format!("\n== {} ==\n", category.name));
        for item in &category.items {
            let price = match item.discounted_price {
                Some(before) => format!(
                    "{} (was {})",
                    format_price(item.price),
                    format_price(before)
                ),
                None => format_price(item.price),
            };
            out.push_str(&format!("  {}  {}\n", item.name, price));
        }
    }

    out
}

/// One line per search hit: item, price and where it is sold
pub fn search_hit_line(hit: &SearchHit) -> String {
    format!(
        "{}  {}  @ {} ({})",
        hit.item.name,
        format_price(hit.item.price),
        hit.restaurant.name,
        hit.item.category
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Deal, DiscountInfo, MenuCategory, MenuItem};

    fn restaurant() -> Restaurant {
        Restaurant {
            code: "k9zz".to_string(),
            name: "Dürümcü".to_string(),
            rating: 4.5,
            review_number: 10,
            minimum_delivery_fee: 0.0,
            minimum_order_amount: 150.0,
            delivery_time: "25-35".to_string(),
            cuisines: vec!["Dürüm".to_string(), "Kebap".to_string()],
            is_open: true,
            budget: 2,
            deals: Vec::new(),
            delivery_fee_label: "Free".to_string(),
            has_discount: true,
            discounts_info: vec![DiscountInfo {
                id: "1".to_string(),
                value: 30.0,
            }],
            is_voucher_enabled: false,
        }
    }

    fn menu_item(name: &str, price: f64, before: Option<f64>) -> MenuItem {
        MenuItem {
            id: 1,
            name: name.to_string(),
            description: String::new(),
            price,
            discounted_price: before,
            category: "Dürümler".to_string(),
            variation_id: String::new(),
        }
    }

    #[test]
    fn test_restaurant_lines() {
        let text = restaurant_lines(&restaurant());

        assert!(text.contains("Dürümcü (k9zz) [open]"));
        assert!(text.contains("★★★★½"));
        assert!(text.contains("₺₺"));
        assert!(text.contains("Joker %30"));
        assert!(text.contains("Dürüm, Kebap"));
        assert!(text.contains("Min: 150 ₺"));
        assert!(text.contains("Delivery: Free"));
        assert!(text.contains("25-35 min"));
    }

    #[test]
    fn test_closed_restaurant_without_extras() {
        let mut r = restaurant();
        r.is_open = false;
        r.discounts_info.clear();
        r.delivery_fee_label.clear();

        let text = restaurant_lines(&r);

        assert!(text.contains("[closed]"));
        assert!(!text.contains("Joker"));
        assert!(!text.contains("Delivery:"));
    }

    #[test]
    fn test_vendor_menu_shows_discounts() {
        let vendor = VendorDetail {
            code: "v1".to_string(),
            name: "Pideci".to_string(),
            rating: 4.0,
            review_number: 12,
            deals: vec![Deal {
                id: 1,
                title: String::new(),
                description: "Free drink".to_string(),
                value: 0.0,
                offer_type: String::new(),
                deal_type: String::new(),
                minimum_order_value: 0.0,
                maximum_discount_amount: 0.0,
            }],
            menus: vec![MenuCategory {
                id: "1".to_string(),
                name: "Pideler".to_string(),
                items: vec![
                    menu_item("Kıymalı", 180.0, Some(220.0)),
                    menu_item("Kaşarlı", 160.0, None),
                ],
            }],
            delivery_fee: 0.0,
            minimum_order_amount: 1000.0,
        };

        let text = vendor_menu(&vendor);

        assert!(text.contains("Deal: Free drink"));
        assert!(text.contains("== Pideler =="));
        assert!(text.contains("Kıymalı  180 ₺ (was 220 ₺)"));
        assert!(text.contains("Kaşarlı  160 ₺\n"));
        assert!(text.contains("Min order: 1.000 ₺"));
    }

    #[test]
    fn test_search_hit_line() {
        let hit = SearchHit {
            restaurant: restaurant(),
            item: menu_item("Adana Dürüm", 210.0, None),
        };

        assert_eq!(
            search_hit_line(&hit),
            "Adana Dürüm  210 ₺  @ Dürümcü (Dürümler)"
        );
    }

    #[test]
    fn test_address_line() {
        let address = Address {
            id: 7,
            city: "Ankara".to_string(),
            title: None,
            label: Some("Ev".to_string()),
            formatted_customer_address: "Kızılay".to_string(),
            latitude: 39.9,
            longitude: 32.8,
        };

        assert_eq!(address_line(&address), "[7] Ev - Kızılay");
    }
}
