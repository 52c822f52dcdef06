//! Typed access to the Yemeksepeti API
//!
//! `ApiClient` builds request URLs, routes them through the
//! [`ResilientFetcher`], memoizes listing and vendor responses in a
//! [`TtlCache`] and hands back parsed domain records.

use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::stream::{self, StreamExt};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::context::ApiContext;
use super::error::ApiError;
use super::fetcher::ResilientFetcher;
use crate::cache::TtlCache;
use crate::config::Credentials;
use crate::data::{self, Address, MenuItem, Restaurant, VendorDetail};

/// Base URL of the upstream API
pub const API_BASE_URL: &str = "https://tr.fd-api.com";

/// Page size used when the caller does not set one
pub const DEFAULT_RESTAURANT_LIMIT: u32 = 48;

/// Page size used to seed a menu search when no listing is at hand
pub const SEARCH_SEED_LIMIT: u32 = 30;

/// Number of restaurants whose menus a search scans
pub const SEARCH_VENDOR_LIMIT: usize = 10;

/// Shortest query a menu search will run
pub const MIN_SEARCH_QUERY_CHARS: usize = 2;

const LANGUAGE_ID: &str = "2";
const COUNTRY: &str = "tr";
const PARTNER_API_KEY: &str = "volo";
const CLIENT_ID: &str = "web";
const BROWSER_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
);

/// Optional parameters for a restaurant listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantQuery {
    /// Cuisine filter (upstream cuisine id)
    pub cuisine: Option<String>,
    /// Pagination offset
    pub offset: u32,
    /// Page size, [`DEFAULT_RESTAURANT_LIMIT`] when unset
    pub limit: Option<u32>,
    /// Upstream sort key (e.g. "rating_desc")
    pub sort: Option<String>,
    /// Promotional campaign code (see [`data::JOKER_CAMPAIGN_ID`])
    pub joker_id: Option<String>,
}

impl RestaurantQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn joker(mut self, joker_id: impl Into<String>) -> Self {
        self.joker_id = Some(joker_id.into());
        self
    }
}

/// A menu item matched by a search, with the restaurant that sells it
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub restaurant: Restaurant,
    pub item: MenuItem,
}

/// Client for the Yemeksepeti API
///
/// Each client owns its credentials and its response cache. The cooldown,
/// transport and status sink come from the shared [`ApiContext`].
#[derive(Debug)]
pub struct ApiClient {
    credentials: Credentials,
    fetcher: ResilientFetcher,
    cache: Mutex<TtlCache<Value>>,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for the production API
    pub fn new(credentials: Credentials, context: &ApiContext) -> Result<Self, ApiError> {
        let base_url = Url::parse(API_BASE_URL)?;
        Self::with_base_url(credentials, context, base_url)
    }

    /// Creates a client against a custom base URL (for testing)
    pub fn with_base_url(
        credentials: Credentials,
        context: &ApiContext,
        base_url: Url,
    ) -> Result<Self, ApiError> {
        let headers = build_headers(&credentials)?;
        let fetcher = ResilientFetcher::new(
            context.transport.clone(),
            headers,
            context.cooldown.clone(),
            context.status.clone(),
        );

        Ok(Self {
            credentials,
            fetcher,
            cache: Mutex::new(TtlCache::new()),
            base_url,
        })
    }

    /// Credentials this client authenticates with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Empties the response cache; the shared cooldown is left alone
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// Fetches the addresses saved on the account (never cached)
    pub async fn get_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let url = self.endpoint(&["api", "v5", "customers", "addresses"])?;
        let body = self.fetcher.fetch_json(url.as_str()).await?;
        Ok(data::parse_addresses(&body)?)
    }

    /// Fetches a page of restaurants delivering to the given coordinates
    ///
    /// Results are cached by coordinates, campaign code and offset.
    pub async fn get_restaurants(
        &self,
        lat: f64,
        lng: f64,
        query: &RestaurantQuery,
    ) -> Result<Vec<Restaurant>, ApiError> {
        let url = self.restaurants_url(lat, lng, query)?;
        let key = restaurants_cache_key(lat, lng, query);
        let body = self.fetch_cached(&key, &url).await?;
        Ok(data::parse_restaurants(&body)?)
    }

    /// Fetches a vendor with its menu and deals
    pub async fn get_vendor_detail(
        &self,
        code: &str,
        lat: f64,
        lng: f64,
    ) -> Result<VendorDetail, ApiError> {
        let mut url = self.endpoint(&["api", "v5", "vendors", code])?;
        url.query_pairs_mut()
            .append_pair("include", "menus,deals")
            .append_pair("language_id", LANGUAGE_ID)
            .append_pair("latitude", &lat.to_string())
            .append_pair("longitude", &lng.to_string());

        let key = vendor_cache_key(code, lat, lng);
        let body = self.fetch_cached(&key, &url).await?;
        Ok(data::parse_vendor_detail(&body)?)
    }

    /// Searches the menus of nearby restaurants for a dish
    ///
    /// Scans the first [`SEARCH_VENDOR_LIMIT`] restaurants of `restaurants`
    /// (or of a fresh listing when it is empty) and matches the query against
    /// item names and descriptions, case-insensitively. Vendors that fail to
    /// load are skipped. Hits are sorted by price, cheapest first.
    pub async fn search_menu(
        &self,
        lat: f64,
        lng: f64,
        query: &str,
        restaurants: &[Restaurant],
    ) -> Result<Vec<SearchHit>, ApiError> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < MIN_SEARCH_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let seeded;
        let restaurants = if restaurants.is_empty() {
            seeded = self
                .get_restaurants(lat, lng, &RestaurantQuery::new().limit(SEARCH_SEED_LIMIT))
                .await?;
            seeded.as_slice()
        } else {
            restaurants
        };

        // One vendor at a time to stay gentle on the anti-bot layer
        let vendors: Vec<(&Restaurant, Result<VendorDetail, ApiError>)> =
            stream::iter(restaurants.iter().take(SEARCH_VENDOR_LIMIT))
                .then(|r| async move {
                    (r, self.get_vendor_detail(&r.code, lat, lng).await)
                })
                .collect()
                .await;

        let mut hits = Vec::new();
        for (restaurant, detail) in vendors {
            let vendor = match detail {
                Ok(vendor) => vendor,
                Err(e) => {
                    warn!(
                        vendor = %restaurant.code,
                        error = %e,
                        "Skipping vendor in search"
                    );
                    continue;
                }
            };

            hits.extend(
                vendor
                    .items()
                    .filter(|item| {
                        item.name.to_lowercase().contains(&needle)
                            || item.description.to_lowercase().contains(&needle)
                    })
                    .map(|item| SearchHit {
                        restaurant: restaurant.clone(),
                        item: item.clone(),
                    }),
            );
        }

        hits.sort_by(|a, b| a.item.price.total_cmp(&b.item.price));
        Ok(hits)
    }

    /// Returns a cached body or fetches and caches it
    async fn fetch_cached(&self, key: &str, url: &Url) -> Result<Value, ApiError> {
        let cached = self.cache().get(key);
        if let Some(hit) = cached {
            debug!(key, "Cache hit");
            self.fetcher.notify("Loaded from cache");
            return Ok(hit);
        }

        let body = self.fetcher.fetch_json(url.as_str()).await?;
        self.cache().set(key, body.clone());
        Ok(body)
    }

    fn cache(&self) -> MutexGuard<'_, TtlCache<Value>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn restaurants_url(
        &self,
        lat: f64,
        lng: f64,
        query: &RestaurantQuery,
    ) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&["vendors-gateway", "api", "v1", "pandora", "vendors"])?;
        let customer_hash = self.credentials.customer_hash.as_deref().unwrap_or_default();
        let limit = query.limit.unwrap_or(DEFAULT_RESTAURANT_LIMIT).to_string();
        let offset = query.offset.to_string();

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("latitude", &lat.to_string())
                .append_pair("longitude", &lng.to_string())
                .append_pair("language_id", LANGUAGE_ID)
                .append_pair("include", "characteristics")
                .append_pair("configuration", "Original")
                .append_pair("country", COUNTRY)
                .append_pair("customer_id", &self.credentials.user_id)
                .append_pair("customer_hash", customer_hash)
                .append_pair("customer_type", "regular")
                .append_pair("use_free_delivery_label", "true")
                .append_pair("limit", &limit)
                .append_pair("offset", &offset)
                .append_pair("vertical", "restaurants");

            if let Some(cuisine) = &query.cuisine {
                pairs.append_pair("cuisine", cuisine);
            }
            if let Some(sort) = &query.sort {
                pairs.append_pair("sort", sort);
            }
            if let Some(joker_id) = &query.joker_id {
                pairs.append_pair("joker_id", joker_id);
            }
        }

        Ok(url)
    }
}

/// Cache key for a restaurant listing page
///
/// Raw coordinates are used as-is; nearby but unequal points do not share
/// entries.
pub fn restaurants_cache_key(lat: f64, lng: f64, query: &RestaurantQuery) -> String {
    format!(
        "restaurants:{}:{}:{}:{}",
        lat,
        lng,
        query.joker_id.as_deref().unwrap_or_default(),
        query.offset
    )
}

/// Cache key for a vendor detail lookup
pub fn vendor_cache_key(code: &str, lat: f64, lng: f64) -> String {
    format!("vendor:{}:{}:{}", code, lat, lng)
}

/// Headers sent with every request
fn build_headers(credentials: &Credentials) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", credentials.auth_token))?,
    );
    headers.insert(
        HeaderName::from_static("x-fp-api-key"),
        HeaderValue::from_static(PARTNER_API_KEY),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("x-pd-language-id"),
        HeaderValue::from_static(LANGUAGE_ID),
    );
    headers.insert(
        HeaderName::from_static("x-disco-client-id"),
        HeaderValue::from_static(CLIENT_ID),
    );
    headers.insert(
        HeaderName::from_static("perseus-client-id"),
        HeaderValue::from_str(&credentials.perseus_client_id)?,
    );
    headers.insert(
        HeaderName::from_static("perseus-session-id"),
        HeaderValue::from_str(&credentials.perseus_session_id)?,
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            auth_token: "tok".to_string(),
            user_id: "TR_1".to_string(),
            customer_hash: None,
            perseus_client_id: "pc".to_string(),
            perseus_session_id: "ps".to_string(),
        }
    }

    fn client() -> ApiClient {
        let context = ApiContext::new(crate::api::StatusSink::silent());
        ApiClient::new(credentials(), &context).unwrap()
    }

    fn query_value(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_build_headers() {
        let headers = build_headers(&credentials()).unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert_eq!(headers["x-fp-api-key"], "volo");
        assert_eq!(headers["x-disco-client-id"], "web");
        assert_eq!(headers["x-pd-language-id"], "2");
        assert_eq!(headers["perseus-client-id"], "pc");
        assert_eq!(headers["perseus-session-id"], "ps");
        assert!(headers.contains_key(USER_AGENT));
    }

    #[test]
    fn test_build_headers_rejects_control_characters() {
        let mut creds = credentials();
        creds.auth_token = "bad\ntoken".to_string();

        assert!(build_headers(&creds).is_err());
    }

    #[test]
    fn test_restaurants_url_required_params() {
        let url = client()
            .restaurants_url(41.0082, 28.9784, &RestaurantQuery::new())
            .unwrap();

        assert_eq!(url.path(), "/vendors-gateway/api/v1/pandora/vendors");
        assert_eq!(query_value(&url, "latitude").as_deref(), Some("41.0082"));
        assert_eq!(query_value(&url, "longitude").as_deref(), Some("28.9784"));
        assert_eq!(query_value(&url, "country").as_deref(), Some("tr"));
        assert_eq!(query_value(&url, "customer_id").as_deref(), Some("TR_1"));
        assert_eq!(query_value(&url, "customer_hash").as_deref(), Some(""));
        assert_eq!(
            query_value(&url, "vertical").as_deref(),
            Some("restaurants")
        );
        assert_eq!(query_value(&url, "limit").as_deref(), Some("48"));
        assert_eq!(query_value(&url, "offset").as_deref(), Some("0"));
        assert!(query_value(&url, "cuisine").is_none());
        assert!(query_value(&url, "sort").is_none());
        assert!(query_value(&url, "joker_id").is_none());
    }

    #[test]
    fn test_restaurants_url_optional_params() {
        let query = RestaurantQuery::new()
            .cuisine("pizza")
            .sort("rating_desc")
            .joker(data::JOKER_CAMPAIGN_ID)
            .limit(100)
            .offset(48);

        let url = client().restaurants_url(41.0, 29.0, &query).unwrap();

        assert_eq!(query_value(&url, "cuisine").as_deref(), Some("pizza"));
        assert_eq!(query_value(&url, "sort").as_deref(), Some("rating_desc"));
        assert_eq!(
            query_value(&url, "joker_id").as_deref(),
            Some("300916482767")
        );
        assert_eq!(query_value(&url, "limit").as_deref(), Some("100"));
        assert_eq!(query_value(&url, "offset").as_deref(), Some("48"));
    }

    #[test]
    fn test_endpoint_encodes_vendor_code() {
        let url = client().endpoint(&["api", "v5", "vendors", "a b/c"]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://tr.fd-api.com/api/v5/vendors/a%20b%2Fc"
        );
    }

    #[test]
    fn test_cache_keys() {
        let query = RestaurantQuery::new().joker("J").offset(96);

        assert_eq!(
            restaurants_cache_key(41.5, 29.25, &query),
            "restaurants:41.5:29.25:J:96"
        );
        assert_eq!(
            restaurants_cache_key(41.5, 29.25, &RestaurantQuery::new()),
            "restaurants:41.5:29.25::0"
        );
        assert_eq!(vendor_cache_key("x1ab", 41.0, 29.0), "vendor:x1ab:41:29");
    }

    #[test]
    fn test_cache_key_ignores_limit_and_sort() {
        let a = RestaurantQuery::new().limit(10).sort("a");
        let b = RestaurantQuery::new().limit(99).sort("b");

        assert_eq!(
            restaurants_cache_key(1.0, 2.0, &a),
            restaurants_cache_key(1.0, 2.0, &b)
        );
    }
}
