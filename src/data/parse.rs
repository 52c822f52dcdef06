//! Response parsers for the Yemeksepeti API
//!
//! Maps raw upstream JSON shapes onto the typed records in [`crate::data`].
//! Every optional field is read as `Option` and given a safe default so that
//! missing, `null` or wrongly typed values never fail a parse; only required
//! identifiers (a vendor `code`) are allowed to reject a response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{Address, Deal, DiscountInfo, MenuCategory, MenuItem, Restaurant, VendorDetail};

/// Label used when the upstream marks delivery as free
pub const FREE_DELIVERY_LABEL: &str = "Free";

/// Envelope for list endpoints: `{ "data": { "items": [...] } }`
#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    data: Option<ListData<T>>,
}

#[derive(Debug, Deserialize)]
struct ListData<T> {
    items: Option<Vec<T>>,
}

impl<T> ListEnvelope<T> {
    fn into_items(self) -> Vec<T> {
        self.data.and_then(|d| d.items).unwrap_or_default()
    }
}

/// Envelope for single-object endpoints: `{ "data": {...} }`
#[derive(Debug, Deserialize)]
struct ObjectEnvelope<T> {
    data: T,
}

/// Reads an optional field, treating a value of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| T::deserialize(v).ok()))
}

/// Numeric types the upstream may send as integers, floats or strings
trait Numeric: Sized {
    fn from_json(value: &Value) -> Option<Self>;
}

impl Numeric for f64 {
    fn from_json(value: &Value) -> Option<Self> {
        let n = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }
}

impl Numeric for i64 {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| whole(n.as_f64()?)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Numeric for u32 {
    fn from_json(value: &Value) -> Option<Self> {
        i64::from_json(value).and_then(|n| u32::try_from(n).ok())
    }
}

/// Integral floats such as `2.0`
fn whole(n: f64) -> Option<i64> {
    let in_range = n >= i64::MIN as f64 && n <= i64::MAX as f64;
    (n.fract() == 0.0 && in_range).then_some(n as i64)
}

/// Like [`lenient`], but also accepts numbers sent as strings or floats
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Numeric,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(T::from_json))
}

#[derive(Debug, Deserialize)]
struct RawAddress {
    #[serde(default, deserialize_with = "lenient_number")]
    id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    formatted_customer_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDeal {
    #[serde(default, deserialize_with = "lenient_number")]
    id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    value: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    offer_type: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    deal_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    minimum_order_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    maximum_discount_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDiscount {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<Value>,
    #[serde(default, deserialize_with = "lenient_number")]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawNamed {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default, deserialize_with = "lenient")]
    has_discount: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawRestaurant {
    code: String,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    review_number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    minimum_delivery_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    minimum_order_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    delivery_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    cuisines: Option<Vec<RawNamed>>,
    #[serde(default, deserialize_with = "lenient")]
    is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_number")]
    budget: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    deals: Option<Vec<RawDeal>>,
    #[serde(default, deserialize_with = "lenient")]
    delivery_fee_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    metadata: Option<RawMetadata>,
    #[serde(default, deserialize_with = "lenient")]
    discounts_info: Option<Vec<RawDiscount>>,
    #[serde(default, deserialize_with = "lenient")]
    is_voucher_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawVariation {
    #[serde(default, deserialize_with = "lenient")]
    code: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    price_before_discount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(default, deserialize_with = "lenient_number")]
    id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    product_variations: Option<Vec<RawVariation>>,
}

#[derive(Debug, Deserialize)]
struct RawMenuCategory {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    products: Option<Vec<RawProduct>>,
}

#[derive(Debug, Deserialize)]
struct RawMenu {
    #[serde(default, deserialize_with = "lenient")]
    menu_categories: Option<Vec<RawMenuCategory>>,
}

#[derive(Debug, Deserialize)]
struct RawRating {
    #[serde(default, deserialize_with = "lenient_number")]
    score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    total_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawFee {
    #[serde(default, deserialize_with = "lenient_number")]
    total: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDynamicPricing {
    #[serde(default, deserialize_with = "lenient")]
    delivery_fee: Option<RawFee>,
}

#[derive(Debug, Deserialize)]
struct RawVendor {
    code: String,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    rating: Option<RawRating>,
    #[serde(default, deserialize_with = "lenient")]
    deals: Option<Vec<RawDeal>>,
    #[serde(default, deserialize_with = "lenient")]
    menus: Option<Vec<RawMenu>>,
    #[serde(default, deserialize_with = "lenient")]
    dynamic_pricing: Option<RawDynamicPricing>,
    #[serde(default, deserialize_with = "lenient_number")]
    minimum_delivery_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    minimum_order_amount: Option<f64>,
}

/// Parses the address list response
pub fn parse_addresses(body: &Value) -> Result<Vec<Address>, serde_json::Error> {
    let envelope = ListEnvelope::<RawAddress>::deserialize(body)?;
    Ok(envelope
        .into_items()
        .into_iter()
        .map(Address::from)
        .collect())
}

/// Parses a restaurant listing response
pub fn parse_restaurants(body: &Value) -> Result<Vec<Restaurant>, serde_json::Error> {
    let envelope = ListEnvelope::<RawRestaurant>::deserialize(body)?;
    Ok(envelope
        .into_items()
        .into_iter()
        .map(Restaurant::from)
        .collect())
}

/// Parses a single-vendor response that includes menus and deals
pub fn parse_vendor_detail(body: &Value) -> Result<VendorDetail, serde_json::Error> {
    let envelope = ObjectEnvelope::<RawVendor>::deserialize(body)?;
    Ok(VendorDetail::from(envelope.data))
}

/// Renders a string-or-number identifier as a string
fn id_to_string(id: Option<Value>) -> String {
    match id {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_deals(deals: Option<Vec<RawDeal>>) -> Vec<Deal> {
    deals
        .unwrap_or_default()
        .into_iter()
        .map(Deal::from)
        .collect()
}

impl From<RawAddress> for Address {
    fn from(raw: RawAddress) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            city: raw.city.unwrap_or_default(),
            title: raw.title,
            label: raw.label,
            formatted_customer_address: raw.formatted_customer_address.unwrap_or_default(),
            latitude: raw.latitude.unwrap_or_default(),
            longitude: raw.longitude.unwrap_or_default(),
        }
    }
}

impl From<RawDeal> for Deal {
    fn from(raw: RawDeal) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            value: raw.value.unwrap_or_default(),
            offer_type: raw.offer_type.unwrap_or_default(),
            deal_type: raw.deal_type.unwrap_or_default(),
            minimum_order_value: raw.minimum_order_value.unwrap_or_default(),
            maximum_discount_amount: raw.maximum_discount_amount.unwrap_or_default(),
        }
    }
}

impl From<RawRestaurant> for Restaurant {
    fn from(raw: RawRestaurant) -> Self {
        let minimum_delivery_fee = raw.minimum_delivery_fee.unwrap_or_default();

        let delivery_fee_label = if raw.delivery_fee_type.as_deref() == Some("free") {
            FREE_DELIVERY_LABEL.to_string()
        } else if minimum_delivery_fee != 0.0 {
            super::format_price(minimum_delivery_fee)
        } else {
            String::new()
        };

        Self {
            code: raw.code,
            name: raw.name.unwrap_or_default(),
            rating: raw.rating.unwrap_or_default(),
            review_number: raw.review_number.unwrap_or_default(),
            minimum_delivery_fee,
            minimum_order_amount: raw.minimum_order_amount.unwrap_or_default(),
            delivery_time: raw.delivery_time.unwrap_or_default(),
            cuisines: raw
                .cuisines
                .unwrap_or_default()
                .into_iter()
                .filter_map(|c| c.name)
                .collect(),
            is_open: raw.is_active != Some(false),
            budget: raw.budget.unwrap_or_default(),
            deals: parse_deals(raw.deals),
            delivery_fee_label,
            has_discount: raw.metadata.and_then(|m| m.has_discount) == Some(true),
            discounts_info: raw
                .discounts_info
                .unwrap_or_default()
                .into_iter()
                .map(|d| DiscountInfo {
                    id: id_to_string(d.id),
                    value: d.value.unwrap_or_default(),
                })
                .collect(),
            is_voucher_enabled: raw.is_voucher_enabled == Some(true),
        }
    }
}

/// Builds a menu item from its first variation
fn parse_menu_item(product: RawProduct, category: &str) -> MenuItem {
    let variation = product
        .product_variations
        .and_then(|v| v.into_iter().next());

    let (price, price_before, variation_id) = match variation {
        Some(v) => (
            v.price.unwrap_or_default(),
            v.price_before_discount,
            v.code.unwrap_or_default(),
        ),
        None => (0.0, None, String::new()),
    };

    MenuItem {
        id: product.id.unwrap_or_default(),
        name: product.name.unwrap_or_default(),
        description: product.description.unwrap_or_default(),
        price,
        discounted_price: price_before.filter(|before| *before != 0.0 && *before != price),
        category: category.to_string(),
        variation_id,
    }
}

impl From<RawVendor> for VendorDetail {
    fn from(raw: RawVendor) -> Self {
        let menus = raw
            .menus
            .unwrap_or_default()
            .into_iter()
            .flat_map(|menu| menu.menu_categories.unwrap_or_default())
            .filter_map(|category| {
                let name = category.name.unwrap_or_default();
                let items: Vec<MenuItem> = category
                    .products
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| parse_menu_item(p, &name))
                    .collect();

                // Categories with nothing purchasable are dropped
                if items.is_empty() {
                    return None;
                }

                Some(MenuCategory {
                    id: id_to_string(category.id),
                    name,
                    items,
                })
            })
            .collect();

        let (rating, review_number) = raw
            .rating
            .map(|r| {
                (
                    r.score.unwrap_or_default(),
                    r.total_count.unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        let dynamic_fee = raw
            .dynamic_pricing
            .and_then(|p| p.delivery_fee)
            .and_then(|f| f.total);

        Self {
            code: raw.code,
            name: raw.name.unwrap_or_default(),
            rating,
            review_number,
            deals: parse_deals(raw.deals),
            menus,
            delivery_fee: dynamic_fee
                .or(raw.minimum_delivery_fee)
                .unwrap_or_default(),
            minimum_order_amount: raw.minimum_order_amount.unwrap_or_default(),
        }
    }
}
