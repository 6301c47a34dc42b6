//! Domain model types for the persistence abstraction layer
//!
//! These types are used as arguments and return values of the persistence
//! traits, decoupled from specific storage backends. Timestamps are epoch
//! milliseconds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use roost_common::{BookingStatus, StayRange, UserRole};

/// Stored user account. The password is a bcrypt hash and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub created_time: i64,
    pub modified_time: i64,
}

/// Host account owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub created_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Rentable listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub id: String,
    pub business_id: String,
    pub owner: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: Location,
    pub price: f64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub beds: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub average_rating: f64,
    pub review_count: i32,
    pub created_time: i64,
    pub modified_time: i64,
}

/// Reservation of a listing for `[check_in, check_out)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub nights: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_time: i64,
}

impl BookingInfo {
    pub fn stay(&self) -> StayRange {
        StayRange {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInfo {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub rating: i32,
    pub comment: String,
    pub created_time: i64,
}

/// Listing search filters
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub city: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub guests: Option<i32>,
}

impl ProductQuery {
    /// In-process evaluation of the filters, shared by backends that
    /// cannot push them down to a query engine.
    pub fn matches(&self, product: &ProductInfo) -> bool {
        if let Some(city) = &self.city
            && !product.location.city.eq_ignore_ascii_case(city)
        {
            return false;
        }
        if let Some(category) = &self.category
            && !product.category.eq_ignore_ascii_case(category)
        {
            return false;
        }
        if let Some(min) = self.min_price
            && product.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && product.price > max
        {
            return false;
        }
        if let Some(guests) = self.guests
            && product.max_guests < guests
        {
            return false;
        }
        true
    }
}

/// Generic paginated result
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total_count: u64, page_number: u64, page_size: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number,
            pages_available: if page_size > 0 {
                total_count.div_ceil(page_size)
            } else {
                0
            },
            page_items,
        }
    }

    pub fn empty() -> Self {
        Self {
            total_count: 0,
            page_number: 0,
            pages_available: 0,
            page_items: Vec::new(),
        }
    }

    /// Rows to skip for a 1-based page; saturates instead of overflowing
    pub fn offset(page_no: u64, page_size: u64) -> u64 {
        page_no.max(1).saturating_sub(1).saturating_mul(page_size)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_count: self.total_count,
            page_number: self.page_number,
            pages_available: self.pages_available,
            page_items: self.page_items.into_iter().map(f).collect(),
        }
    }
}

/// Result of an insert that is only applied when nothing conflicts with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// An overlapping stay or an earlier review by the same user
    Conflict,
    /// The listing the row belongs to no longer exists
    ListingMissing,
}

/// Storage mode for the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// External database (MySQL/PostgreSQL via SeaORM)
    ExternalDb,
    /// Process-local maps, lost on restart
    Memory,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::ExternalDb => write!(f, "external_db"),
            StorageMode::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "external_db" => Ok(StorageMode::ExternalDb),
            "memory" => Ok(StorageMode::Memory),
            _ => Err(format!("Invalid storage mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset_saturates() {
        assert_eq!(Page::<()>::offset(0, 20), 0);
        assert_eq!(Page::<()>::offset(1, 20), 0);
        assert_eq!(Page::<()>::offset(3, 20), 40);
        assert_eq!(Page::<()>::offset(u64::MAX, 100), u64::MAX);
    }

    fn product(city: &str, price: f64, max_guests: i32) -> ProductInfo {
        ProductInfo {
            id: "p1".to_string(),
            business_id: "b1".to_string(),
            owner: "u1".to_string(),
            title: "Cabin".to_string(),
            description: String::new(),
            category: "cabin".to_string(),
            location: Location {
                city: city.to_string(),
                ..Default::default()
            },
            price,
            max_guests,
            bedrooms: 1,
            beds: 1,
            bathrooms: 1,
            amenities: vec![],
            images: vec![],
            average_rating: 0.0,
            review_count: 0,
            created_time: 0,
            modified_time: 0,
        }
    }

    #[test]
    fn test_page_new() {
        let page = Page::new(41, 1, 20, vec![1, 2, 3]);
        assert_eq!(page.pages_available, 3);

        let page: Page<i32> = Page::new(0, 1, 0, vec![]);
        assert_eq!(page.pages_available, 0);
    }

    #[test]
    fn test_storage_mode_round_trip() {
        assert_eq!("memory".parse::<StorageMode>().unwrap(), StorageMode::Memory);
        assert_eq!(StorageMode::ExternalDb.to_string(), "external_db");
        assert!("rocksdb".parse::<StorageMode>().is_err());
    }

    #[test]
    fn test_product_query_matches() {
        let p = product("Lisbon", 120.0, 4);

        assert!(ProductQuery::default().matches(&p));
        assert!(ProductQuery {
            city: Some("lisbon".to_string()),
            ..Default::default()
        }
        .matches(&p));
        assert!(!ProductQuery {
            max_price: Some(100.0),
            ..Default::default()
        }
        .matches(&p));
        assert!(!ProductQuery {
            guests: Some(5),
            ..Default::default()
        }
        .matches(&p));
    }

    #[test]
    fn test_user_password_not_serialized() {
        let user = UserInfo {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "$2b$hash".to_string(),
            role: UserRole::User,
            phone: None,
            avatar: None,
            created_time: 0,
            modified_time: 0,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "user");
    }
}
