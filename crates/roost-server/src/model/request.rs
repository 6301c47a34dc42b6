//! Request bodies and query parameters
//!
//! Field rules are declared with `validator` and checked by the handlers
//! before anything reaches a service.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use roost_persistence::{Location, ProductQuery};

/// Accepts `2024-06-01` as well as a full RFC 3339 timestamp, keeping the
/// calendar date of the latter.
fn calendar_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

// ============================================================================
// Auth and users
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    // bcrypt ignores input past 72 bytes
    #[validate(length(min = 6, max = 72))]
    pub password: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(url)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBusinessRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(length(min = 3, max = 30))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 200))]
    pub address: String,
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
}

impl From<LocationRequest> for Location {
    fn from(value: LocationRequest) -> Self {
        Location {
            address: value.address,
            city: value.city,
            country: value.country,
            lat: value.lat,
            lng: value.lng,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 3, max = 100))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(nested)]
    pub location: LocationRequest,
    #[validate(range(exclusive_min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1, max = 100))]
    pub max_guests: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub bedrooms: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub beds: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub bathrooms: i32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub images: Vec<String>,
}

/// Partial listing update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 3, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(nested)]
    pub location: Option<LocationRequest>,
    #[validate(range(exclusive_min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 1, max = 100))]
    pub max_guests: Option<i32>,
    #[validate(range(min = 0))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0))]
    pub beds: Option<i32>,
    #[validate(range(min = 0))]
    pub bathrooms: Option<i32>,
    pub amenities: Option<Vec<String>>,
    #[validate(length(max = 20))]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchParam {
    pub page_no: Option<u64>,
    pub page_size: Option<u64>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub guests: Option<i32>,
}

impl ProductSearchParam {
    pub fn query(&self) -> ProductQuery {
        let non_blank = |v: &Option<String>| {
            v.as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        ProductQuery {
            city: non_blank(&self.city),
            category: non_blank(&self.category),
            min_price: self.min_price,
            max_price: self.max_price,
            guests: self.guests,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParam {
    pub page_no: Option<u64>,
    pub page_size: Option<u64>,
}

// ============================================================================
// Bookings and reviews
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[serde(deserialize_with = "calendar_date")]
    pub check_in: NaiveDate,
    #[serde(deserialize_with = "calendar_date")]
    pub check_out: NaiveDate,
    #[serde(default = "default_guests")]
    #[validate(range(min = 1))]
    pub guests: i32,
}

fn default_guests() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 1000))]
    pub comment: String,
}

// ============================================================================
// Uploads
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub file_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_dates_accept_both_formats() {
        let req: CreateBookingRequest = serde_json::from_str(
            r#"{"productId":"p1","checkIn":"2024-06-01","checkOut":"2024-06-05T00:00:00.000Z"}"#,
        )
        .unwrap();

        assert_eq!(req.check_in, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(req.check_out, NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());
        assert_eq!(req.guests, 1);
    }

    #[test]
    fn test_booking_rejects_garbage_date() {
        let result = serde_json::from_str::<CreateBookingRequest>(
            r#"{"productId":"p1","checkIn":"June 1st","checkOut":"2024-06-05"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            phone: None,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_product_price_must_be_positive() {
        let req: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "title": "Sea view loft",
            "category": "apartment",
            "location": {"address": "1 Rua", "city": "Lisbon", "country": "PT"},
            "price": 0.0,
            "maxGuests": 2
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_search_param_drops_blank_filters() {
        let param = ProductSearchParam {
            city: Some("  ".to_string()),
            category: Some(" cabin ".to_string()),
            ..Default::default()
        };
        let query = param.query();
        assert!(query.city.is_none());
        assert_eq!(query.category.as_deref(), Some("cabin"));
    }
}
