//! backend::requests
//!
//! Typed inputs for every module read and workflow call the pipeline makes.
//!
//! # Validation
//!
//! Every request implements [`Validate`]. Seed steps validate a request
//! before handing it to the [`Backend`](super::Backend), so malformed
//! payloads fail locally with a [`ValidationError`] naming the request and
//! field instead of surfacing as an opaque backend rejection.
//!
//! # Example
//!
//! ```
//! use marketseed::backend::requests::{CreateSalesChannel, CreateSalesChannelsRequest, Validate};
//!
//! let request = CreateSalesChannelsRequest {
//!     sales_channels_data: vec![CreateSalesChannel {
//!         name: "Default Sales Channel".to_string(),
//!         description: None,
//!     }],
//! };
//! assert!(request.validate().is_ok());
//!
//! let empty = CreateSalesChannelsRequest { sales_channels_data: vec![] };
//! assert!(empty.validate().is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::links::LinkDefinition;
use super::model::{Address, CommissionRate, PriceType, ShippingOptionPrice, ShippingOptionRule};
use crate::core::fixtures::ConfigurationRuleType;
use crate::core::types::{
    ApiKeyId, AuthIdentityId, CategoryId, CollectionId, CountryCode, CurrencyCode,
    FulfillmentSetId, InventoryItemId, RegionId, SalesChannelId, SellerId, ServiceZoneId,
    ShippingProfileId, StockLocationId, StoreId, TaxRegionId,
};

/// A request failed local validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {request}: {field} {reason}")]
pub struct ValidationError {
    /// Request type name.
    pub request: &'static str,
    /// Offending field (dotted path).
    pub field: String,
    /// What is wrong with it.
    pub reason: String,
}

impl ValidationError {
    pub fn new(request: &'static str, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            request,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Local validation of a request before submission.
pub trait Validate {
    /// # Errors
    ///
    /// Returns the first violated constraint.
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require_non_empty_str(
    request: &'static str,
    field: impl Into<String>,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(request, field, "must not be empty"));
    }
    Ok(())
}

fn require_non_empty<T>(
    request: &'static str,
    field: &str,
    items: &[T],
) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::new(request, field, "must contain at least one entry"));
    }
    Ok(())
}

// =============================================================================
// Sales channels, stores, regions, tax
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesChannelFilter {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSalesChannel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSalesChannelsRequest {
    #[serde(rename = "salesChannelsData")]
    pub sales_channels_data: Vec<CreateSalesChannel>,
}

impl Validate for CreateSalesChannelsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create sales channels request";
        require_non_empty(REQ, "sales_channels_data", &self.sales_channels_data)?;
        for (i, channel) in self.sales_channels_data.iter().enumerate() {
            require_non_empty_str(REQ, format!("sales_channels_data[{}].name", i), &channel.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSelector {
    pub id: StoreId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreUpdate {
    pub default_sales_channel_id: SalesChannelId,
    pub default_region_id: RegionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStoresRequest {
    pub selector: StoreSelector,
    pub update: StoreUpdate,
}

impl Validate for UpdateStoresRequest {
    // Every field is a validated id; nothing further to check.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRegion {
    pub name: String,
    pub currency_code: CurrencyCode,
    pub countries: Vec<CountryCode>,
    pub payment_providers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRegionsRequest {
    pub regions: Vec<CreateRegion>,
}

impl Validate for CreateRegionsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create regions request";
        require_non_empty(REQ, "regions", &self.regions)?;
        for (i, region) in self.regions.iter().enumerate() {
            require_non_empty_str(REQ, format!("regions[{}].name", i), &region.name)?;
            require_non_empty(REQ, "regions.countries", &region.countries)?;
            let mut seen = std::collections::HashSet::new();
            for country in &region.countries {
                if !seen.insert(country) {
                    return Err(ValidationError::new(
                        REQ,
                        format!("regions[{}].countries", i),
                        format!("lists '{}' more than once", country),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaxRegion {
    pub country_code: CountryCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaxRegionsRequest {
    pub tax_regions: Vec<CreateTaxRegion>,
}

impl Validate for CreateTaxRegionsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("create tax regions request", "tax_regions", &self.tax_regions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaxRegion {
    pub id: TaxRegionId,
    pub provider_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaxRegionsRequest {
    pub tax_regions: Vec<UpdateTaxRegion>,
}

impl Validate for UpdateTaxRegionsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "update tax regions request";
        require_non_empty(REQ, "tax_regions", &self.tax_regions)?;
        for (i, update) in self.tax_regions.iter().enumerate() {
            require_non_empty_str(REQ, format!("tax_regions[{}].provider_id", i), &update.provider_id)?;
        }
        Ok(())
    }
}

// =============================================================================
// API keys
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyFilter {
    #[serde(rename = "type")]
    pub key_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApiKey {
    pub title: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApiKeysRequest {
    pub api_keys: Vec<CreateApiKey>,
}

impl Validate for CreateApiKeysRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create api keys request";
        require_non_empty(REQ, "api_keys", &self.api_keys)?;
        for (i, key) in self.api_keys.iter().enumerate() {
            require_non_empty_str(REQ, format!("api_keys[{}].title", i), &key.title)?;
            if key.key_type != "publishable" && key.key_type != "secret" {
                return Err(ValidationError::new(
                    REQ,
                    format!("api_keys[{}].type", i),
                    format!("must be 'publishable' or 'secret', got '{}'", key.key_type),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSalesChannelsToApiKeyRequest {
    pub id: ApiKeyId,
    #[serde(default)]
    pub add: Vec<SalesChannelId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<SalesChannelId>,
}

impl Validate for LinkSalesChannelsToApiKeyRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.add.is_empty() && self.remove.is_empty() {
            return Err(ValidationError::new(
                "link sales channels to api key request",
                "add",
                "nothing to add or remove",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProductCategory {
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProductCategoriesRequest {
    pub product_categories: Vec<CreateProductCategory>,
}

impl Validate for CreateProductCategoriesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create product categories request";
        require_non_empty(REQ, "product_categories", &self.product_categories)?;
        for (i, category) in self.product_categories.iter().enumerate() {
            require_non_empty_str(REQ, format!("product_categories[{}].name", i), &category.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollection {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCollectionsRequest {
    pub collections: Vec<CreateCollection>,
}

impl Validate for CreateCollectionsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create collections request";
        require_non_empty(REQ, "collections", &self.collections)?;
        for (i, collection) in self.collections.iter().enumerate() {
            require_non_empty_str(REQ, format!("collections[{}].title", i), &collection.title)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProductOption {
    pub title: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVariantPrice {
    pub currency_code: CurrencyCode,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProductVariant {
    pub title: String,
    pub sku: String,
    pub manage_inventory: bool,
    pub options: std::collections::BTreeMap<String, String>,
    pub prices: Vec<CreateVariantPrice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub title: String,
    pub handle: String,
    pub description: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub options: Vec<CreateProductOption>,
    pub variants: Vec<CreateProductVariant>,
    pub categories: Vec<super::model::IdRef<CategoryId>>,
    pub collection_id: CollectionId,
    pub sales_channels: Vec<super::model::IdRef<SalesChannelId>>,
}

/// Auxiliary data consumed by workflow hooks (seller ownership).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAdditionalData {
    pub seller_id: SellerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProductsRequest {
    pub products: Vec<CreateProduct>,
    pub additional_data: ProductAdditionalData,
}

impl Validate for CreateProductsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create products request";
        require_non_empty(REQ, "products", &self.products)?;
        for (i, product) in self.products.iter().enumerate() {
            require_non_empty_str(REQ, format!("products[{}].title", i), &product.title)?;
            require_non_empty_str(REQ, format!("products[{}].handle", i), &product.handle)?;
            require_non_empty(REQ, "products.variants", &product.variants)?;
            for variant in &product.variants {
                if variant.prices.is_empty() {
                    return Err(ValidationError::new(
                        REQ,
                        format!("products[{}].variants[{}].prices", i, variant.sku),
                        "must contain at least one entry",
                    ));
                }
                for (title, value) in &variant.options {
                    let declared = product
                        .options
                        .iter()
                        .find(|o| &o.title == title)
                        .is_some_and(|o| o.values.contains(value));
                    if !declared {
                        return Err(ValidationError::new(
                            REQ,
                            format!("products[{}].variants[{}].options", i, variant.sku),
                            format!("'{}={}' is not a declared option value", title, value),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Identity and seller
// =============================================================================

/// Registration of an auth identity with an auth provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterIdentityRequest {
    #[serde(skip)]
    pub provider: String,
    pub email: String,
    pub password: String,
}

// Custom Debug to avoid exposing the password
impl std::fmt::Debug for RegisterIdentityRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterIdentityRequest")
            .field("provider", &self.provider)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Validate for RegisterIdentityRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "register identity request";
        require_non_empty_str(REQ, "provider", &self.provider)?;
        validate_email(REQ, "email", &self.email)?;
        require_non_empty_str(REQ, "password", &self.password)
    }
}

fn validate_email(request: &'static str, field: &str, email: &str) -> Result<(), ValidationError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::new(
            request,
            field,
            format!("'{}' is not an email address", email),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMember {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSellerData {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSellerRequest {
    pub auth_identity_id: AuthIdentityId,
    pub member: CreateMember,
    pub seller: CreateSellerData,
}

impl Validate for CreateSellerRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create seller request";
        require_non_empty_str(REQ, "member.name", &self.member.name)?;
        validate_email(REQ, "member.email", &self.member.email)?;
        require_non_empty_str(REQ, "seller.name", &self.seller.name)
    }
}

// =============================================================================
// Stock locations and fulfillment
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStockLocation {
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStockLocationsRequest {
    pub locations: Vec<CreateStockLocation>,
}

impl Validate for CreateStockLocationsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create stock locations request";
        require_non_empty(REQ, "locations", &self.locations)?;
        for (i, location) in self.locations.iter().enumerate() {
            require_non_empty_str(REQ, format!("locations[{}].name", i), &location.name)?;
            require_non_empty_str(
                REQ,
                format!("locations[{}].address.address_1", i),
                &location.address.address_1,
            )?;
            require_non_empty_str(REQ, format!("locations[{}].address.city", i), &location.address.city)?;
        }
        Ok(())
    }
}

/// A batch of cross-module links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLinksRequest {
    pub links: Vec<LinkDefinition>,
}

impl Validate for CreateLinksRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create links request";
        require_non_empty(REQ, "links", &self.links)?;
        for (i, link) in self.links.iter().enumerate() {
            if link.from.module() == link.to.module() {
                return Err(ValidationError::new(
                    REQ,
                    format!("links[{}]", i),
                    format!("links two entities of the same module ({})", link.from.module()),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentSetData {
    pub name: String,
    #[serde(rename = "type")]
    pub set_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLocationFulfillmentSetRequest {
    pub fulfillment_set_data: FulfillmentSetData,
    pub location_id: StockLocationId,
    pub seller_id: SellerId,
}

impl Validate for CreateLocationFulfillmentSetRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create location fulfillment set request";
        require_non_empty_str(REQ, "fulfillment_set_data.name", &self.fulfillment_set_data.name)?;
        require_non_empty_str(REQ, "fulfillment_set_data.type", &self.fulfillment_set_data.set_type)
    }
}

/// Graph query for a stock location with its fulfillment sets expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocationQuery {
    pub id: StockLocationId,
}

/// Graph query over the seller↔shipping-profile link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerShippingProfileQuery {
    pub seller_id: SellerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGeoZone {
    #[serde(rename = "type")]
    pub zone_type: String,
    pub country_code: CountryCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateServiceZone {
    pub fulfillment_set_id: FulfillmentSetId,
    pub name: String,
    pub geo_zones: Vec<CreateGeoZone>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateServiceZonesRequest {
    pub data: Vec<CreateServiceZone>,
}

impl Validate for CreateServiceZonesRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create service zones request";
        require_non_empty(REQ, "data", &self.data)?;
        for (i, zone) in self.data.iter().enumerate() {
            require_non_empty_str(REQ, format!("data[{}].name", i), &zone.name)?;
            require_non_empty(REQ, "data.geo_zones", &zone.geo_zones)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceZoneFilter {
    pub fulfillment_set_id: FulfillmentSetId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOptionType {
    pub label: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShippingOption {
    pub name: String,
    pub shipping_profile_id: ShippingProfileId,
    pub service_zone_id: ServiceZoneId,
    pub provider_id: String,
    #[serde(rename = "type")]
    pub option_type: ShippingOptionType,
    pub rules: Vec<ShippingOptionRule>,
    pub prices: Vec<ShippingOptionPrice>,
    pub price_type: PriceType,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateShippingOptionsRequest {
    pub options: Vec<CreateShippingOption>,
}

impl Validate for CreateShippingOptionsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create shipping options request";
        require_non_empty(REQ, "options", &self.options)?;
        for (i, option) in self.options.iter().enumerate() {
            require_non_empty_str(REQ, format!("options[{}].name", i), &option.name)?;
            require_non_empty_str(REQ, format!("options[{}].provider_id", i), &option.provider_id)?;
            require_non_empty(REQ, "options.prices", &option.prices)?;
            for (j, price) in option.prices.iter().enumerate() {
                if price.currency_code.is_some() == price.region_id.is_some() {
                    return Err(ValidationError::new(
                        REQ,
                        format!("options[{}].prices[{}]", i, j),
                        "must set exactly one of currency_code or region_id",
                    ));
                }
            }
            for (j, rule) in option.rules.iter().enumerate() {
                require_non_empty_str(REQ, format!("options[{}].rules[{}].attribute", i, j), &rule.attribute)?;
                require_non_empty_str(REQ, format!("options[{}].rules[{}].operator", i, j), &rule.operator)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInventoryLevel {
    pub inventory_item_id: InventoryItemId,
    pub location_id: StockLocationId,
    pub stocked_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInventoryLevelsRequest {
    pub inventory_levels: Vec<CreateInventoryLevel>,
}

impl Validate for CreateInventoryLevelsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create inventory levels request";
        let mut seen = std::collections::HashSet::new();
        for level in &self.inventory_levels {
            if !seen.insert((&level.inventory_item_id, &level.location_id)) {
                return Err(ValidationError::new(
                    REQ,
                    "inventory_levels",
                    format!(
                        "item '{}' appears twice for location '{}'",
                        level.inventory_item_id, level.location_id
                    ),
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Policies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommissionRuleRequest {
    pub name: String,
    pub is_active: bool,
    pub reference: String,
    pub reference_id: String,
    pub rate: CommissionRate,
}

impl Validate for CreateCommissionRuleRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        const REQ: &str = "create commission rule request";
        require_non_empty_str(REQ, "name", &self.name)?;
        require_non_empty_str(REQ, "reference", &self.reference)?;
        if self.rate.rate_type == "percentage" && self.rate.percentage_rate > 100 {
            return Err(ValidationError::new(
                REQ,
                "rate.percentage_rate",
                format!("{} exceeds 100", self.rate.percentage_rate),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConfigurationRuleRequest {
    pub rule_type: ConfigurationRuleType,
    pub is_enabled: bool,
}

impl Validate for CreateConfigurationRuleRequest {
    // The rule type is a closed enum; any pair is well-formed.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
