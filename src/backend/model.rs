//! backend::model
//!
//! Entities returned by the commerce backend.
//!
//! Only the fields the seed pipeline reads (or reports) are modelled.
//! Unknown fields in backend responses are ignored.

use serde::{Deserialize, Serialize};

use crate::core::fixtures::ConfigurationRuleType;
use crate::core::types::{
    ApiKeyId, AuthIdentityId, CategoryId, CollectionId, CommissionRuleId, ConfigurationRuleId,
    CountryCode, CurrencyCode, FulfillmentSetId, InventoryItemId, InventoryLevelId, ProductId,
    RegionId, SalesChannelId, SellerId, ServiceZoneId, ShippingOptionId, ShippingProfileId,
    StockLocationId, StoreId, TaxRegionId,
};

/// A `{ "id": ... }` reference embedded in another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef<T> {
    pub id: T,
}

impl<T> IdRef<T> {
    pub fn new(id: T) -> Self {
        Self { id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesChannel {
    pub id: SalesChannelId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub default_sales_channel_id: Option<SalesChannelId>,
    #[serde(default)]
    pub default_region_id: Option<RegionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub currency_code: CurrencyCode,
    #[serde(default)]
    pub countries: Vec<CountryCode>,
    #[serde(default)]
    pub payment_providers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRegion {
    pub id: TaxRegionId,
    pub country_code: CountryCode,
    #[serde(default)]
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub title: String,
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCollection {
    pub id: CollectionId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub id: AuthIdentityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    #[serde(default)]
    pub handle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address_1: String,
    pub city: String,
    pub country_code: CountryCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocation {
    pub id: StockLocationId,
    pub name: String,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub fulfillment_sets: Vec<FulfillmentSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentSet {
    pub id: FulfillmentSetId,
    pub name: String,
    #[serde(rename = "type")]
    pub set_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoZone {
    #[serde(rename = "type")]
    pub zone_type: String,
    pub country_code: CountryCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceZone {
    pub id: ServiceZoneId,
    pub name: String,
    #[serde(default)]
    pub fulfillment_set_id: Option<FulfillmentSetId>,
    #[serde(default)]
    pub geo_zones: Vec<GeoZone>,
}

/// Row of the seller↔shipping-profile link table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerShippingProfile {
    pub seller_id: SellerId,
    pub shipping_profile_id: ShippingProfileId,
}

/// How a shipping option is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    Flat,
    Calculated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOptionRule {
    pub attribute: String,
    pub operator: String,
    pub value: String,
}

/// A shipping option price: either in a currency or in a region's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOptionPrice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<RegionId>,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub id: ShippingOptionId,
    pub name: String,
    pub service_zone_id: ServiceZoneId,
    pub shipping_profile_id: ShippingProfileId,
    pub provider_id: String,
    pub price_type: PriceType,
    #[serde(default)]
    pub rules: Vec<ShippingOptionRule>,
    #[serde(default)]
    pub prices: Vec<ShippingOptionPrice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub title: String,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub collection_id: Option<CollectionId>,
    #[serde(default)]
    pub categories: Vec<IdRef<CategoryId>>,
    #[serde(default)]
    pub sales_channels: Vec<IdRef<SalesChannelId>>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub id: InventoryLevelId,
    pub inventory_item_id: InventoryItemId,
    pub location_id: StockLocationId,
    pub stocked_quantity: u32,
}

/// Commission rate definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate {
    pub include_tax: bool,
    #[serde(rename = "type")]
    pub rate_type: String,
    pub percentage_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRule {
    pub id: CommissionRuleId,
    pub name: String,
    pub reference: String,
    #[serde(default)]
    pub reference_id: String,
    pub is_active: bool,
    pub rate: CommissionRate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRule {
    pub id: ConfigurationRuleId,
    pub rule_type: ConfigurationRuleType,
    pub is_enabled: bool,
}
