//! seed
//!
//! The seed steps: entity creators, the linker, composite provisioners,
//! the catalog populator and the policy seeders.
//!
//! # Architecture
//!
//! Every step is an async function taking an explicit `&dyn Backend` plus
//! the outputs of the steps it depends on. Steps never read global state.
//! Their results are collected into [`SeedOutputs`], which the engine
//! journals after each step and hands to dependent steps.
//!
//! # Modules
//!
//! - [`entities`]: sales channel, region, store, publishable key, catalog
//!   taxonomies, seller
//! - [`link`]: cross-module links
//! - [`provision`]: stock location, service zone, shipping option
//! - [`catalog`]: products and inventory levels
//! - [`policy`]: commission and configuration rules

pub mod catalog;
pub mod entities;
pub mod link;
pub mod policy;
pub mod provision;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::model::{
    ApiKey, CommissionRule, ConfigurationRule, InventoryLevel, Product, ProductCategory,
    ProductCollection, Region, SalesChannel, Seller, ServiceZone, ShippingOption, StockLocation,
    Store, TaxRegion,
};
use crate::backend::requests::ValidationError;
use crate::backend::BackendError;
use crate::core::fixtures;
use crate::core::types::FulfillmentSetId;

/// Errors from seed steps.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A backend call failed. The error is passed through unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A random pick was requested from an empty pool.
    #[error("no {0} available to choose from")]
    EmptyPool(&'static str),

    /// A step ran without an output it depends on.
    #[error("missing output of an earlier step: {0}")]
    MissingOutput(&'static str),

    /// The backend returned nothing where an entity was just created.
    #[error("not found after create: {0}")]
    NotFound(String),

    /// A request failed validation before submission.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Credentials and names for the marketplace seller.
#[derive(Clone, PartialEq, Eq)]
pub struct SellerProfile {
    pub name: String,
    pub email: String,
    pub password: String,
    pub member_name: String,
}

impl Default for SellerProfile {
    fn default() -> Self {
        Self {
            name: fixtures::SELLER_NAME.to_string(),
            email: fixtures::SELLER_EMAIL.to_string(),
            password: fixtures::SELLER_PASSWORD.to_string(),
            member_name: fixtures::SELLER_MEMBER_NAME.to_string(),
        }
    }
}

// Custom Debug to avoid exposing the password
impl std::fmt::Debug for SellerProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SellerProfile")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("member_name", &self.member_name)
            .finish()
    }
}

/// Everything the pipeline has created so far.
///
/// Serialized into the run journal so a resumed run can restore the
/// outputs of completed steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOutputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_channel: Option<SalesChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tax_regions: Vec<TaxRegion>,
    /// The updated store; `None` if there was no store to update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<Store>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishable_key: Option<ApiKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<ProductCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<ProductCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<Seller>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_location: Option<StockLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_zone: Option<ServiceZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option: Option<ShippingOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inventory_levels: Vec<InventoryLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_rule: Option<CommissionRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configuration_rules: Vec<ConfigurationRule>,
}

impl SeedOutputs {
    pub fn require_sales_channel(&self) -> Result<&SalesChannel, SeedError> {
        self.sales_channel
            .as_ref()
            .ok_or(SeedError::MissingOutput("sales channel"))
    }

    pub fn require_region(&self) -> Result<&Region, SeedError> {
        self.region.as_ref().ok_or(SeedError::MissingOutput("region"))
    }

    pub fn require_seller(&self) -> Result<&Seller, SeedError> {
        self.seller.as_ref().ok_or(SeedError::MissingOutput("seller"))
    }

    pub fn require_stock_location(&self) -> Result<&StockLocation, SeedError> {
        self.stock_location
            .as_ref()
            .ok_or(SeedError::MissingOutput("stock location"))
    }

    /// The fulfillment set created for the seller's stock location.
    pub fn require_fulfillment_set_id(&self) -> Result<&FulfillmentSetId, SeedError> {
        self.require_stock_location()?
            .fulfillment_sets
            .first()
            .map(|set| &set.id)
            .ok_or(SeedError::MissingOutput("fulfillment set"))
    }

    pub fn require_service_zone(&self) -> Result<&ServiceZone, SeedError> {
        self.service_zone
            .as_ref()
            .ok_or(SeedError::MissingOutput("service zone"))
    }
}
