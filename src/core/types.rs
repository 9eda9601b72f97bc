//! core::types
//!
//! Core strong types used throughout marketseed.
//!
//! # Types
//!
//! - Entity identifiers ([`SalesChannelId`], [`RegionId`], [`SellerId`], ...)
//!   are opaque strings issued by the backend module that owns the entity.
//! - [`CountryCode`] - ISO 3166-1 alpha-2, lowercase
//! - [`CurrencyCode`] - ISO 4217, lowercase
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so requests built from them never carry an
//! empty ID or a malformed country code to the backend.
//!
//! # Examples
//!
//! ```
//! use marketseed::core::types::{CountryCode, SellerId};
//!
//! let seller = SellerId::new("sel_01H").unwrap();
//! assert_eq!(seller.as_str(), "sel_01H");
//!
//! assert!(SellerId::new("").is_err());
//! assert!(CountryCode::new("DEU").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid {kind} id: {reason}")]
    InvalidId { kind: &'static str, reason: String },

    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    #[error("invalid currency code: {0}")]
    InvalidCurrencyCode(String),
}

/// Validate an opaque backend identifier.
///
/// IDs are issued by the backend, so the only rules are that they are
/// non-empty and free of whitespace and control characters.
fn validate_id(kind: &'static str, id: &str) -> Result<(), TypeError> {
    if id.is_empty() {
        return Err(TypeError::InvalidId {
            kind,
            reason: "id cannot be empty".into(),
        });
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TypeError::InvalidId {
            kind,
            reason: format!("'{}' contains whitespace or control characters", id),
        });
    }
    Ok(())
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns `TypeError::InvalidId` if the id is empty or contains whitespace.
            pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
                let id = id.into();
                validate_id($kind, &id)?;
                Ok(Self(id))
            }

            /// Get the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Sales channel id (sales channel module).
    SalesChannelId,
    "sales channel"
);
entity_id!(
    /// Region id (region module).
    RegionId,
    "region"
);
entity_id!(
    /// Tax region id (tax module).
    TaxRegionId,
    "tax region"
);
entity_id!(
    /// Store id (store module).
    StoreId,
    "store"
);
entity_id!(
    /// API key id (api key module).
    ApiKeyId,
    "api key"
);
entity_id!(
    /// Product category id (product module).
    CategoryId,
    "product category"
);
entity_id!(
    /// Product collection id (product module).
    CollectionId,
    "product collection"
);
entity_id!(
    /// Product id (product module).
    ProductId,
    "product"
);
entity_id!(
    /// Auth identity id (auth module).
    AuthIdentityId,
    "auth identity"
);
entity_id!(
    /// Seller id (seller module).
    SellerId,
    "seller"
);
entity_id!(
    /// Stock location id (stock location module).
    StockLocationId,
    "stock location"
);
entity_id!(
    /// Fulfillment set id (fulfillment module).
    FulfillmentSetId,
    "fulfillment set"
);
entity_id!(
    /// Service zone id (fulfillment module).
    ServiceZoneId,
    "service zone"
);
entity_id!(
    /// Shipping profile id (fulfillment module).
    ShippingProfileId,
    "shipping profile"
);
entity_id!(
    /// Shipping option id (fulfillment module).
    ShippingOptionId,
    "shipping option"
);
entity_id!(
    /// Inventory item id (inventory module).
    InventoryItemId,
    "inventory item"
);
entity_id!(
    /// Inventory level id (inventory module).
    InventoryLevelId,
    "inventory level"
);
entity_id!(
    /// Commission rule id (commission module).
    CommissionRuleId,
    "commission rule"
);
entity_id!(
    /// Configuration rule id (seller module).
    ConfigurationRuleId,
    "configuration rule"
);

/// A lowercase ISO 3166-1 alpha-2 country code.
///
/// # Example
///
/// ```
/// use marketseed::core::types::CountryCode;
///
/// let de = CountryCode::new("de").unwrap();
/// assert_eq!(de.as_str(), "de");
///
/// assert!(CountryCode::new("DE").is_err());
/// assert!(CountryCode::new("deu").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Create a validated country code.
    pub fn new(code: impl Into<String>) -> Result<Self, TypeError> {
        let code = code.into();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(TypeError::InvalidCountryCode(code));
        }
        Ok(Self(code))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lowercase ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a validated currency code.
    pub fn new(code: impl Into<String>) -> Result<Self, TypeError> {
        let code = code.into();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(TypeError::InvalidCurrencyCode(code));
        }
        Ok(Self(code))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp.
///
/// Serialized as RFC3339.
///
/// # Example
///
/// ```
/// use marketseed::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// assert!(now.to_string().contains('T'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
