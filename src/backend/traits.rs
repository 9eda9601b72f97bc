//! backend::traits
//!
//! Backend trait definition for the commerce platform the pipeline seeds.
//!
//! # Design
//!
//! The `Backend` trait is async because every call crosses a process
//! boundary (module service, graph query, link store or workflow engine).
//! There is one typed method per call the seed steps make; each returns
//! `Result<_, BackendError>` and the pipeline never retries.
//!
//! Contracts every implementation honours:
//! - `create_links` is idempotent: re-creating an existing link is a no-op.
//! - `link_sales_channels_to_api_key` is idempotent for already-linked channels.
//! - `create_seller` also creates the seller's shipping profile and its link.
//! - `create_products` creates one inventory item per managed variant.
//!
//! # Example
//!
//! ```
//! use marketseed::backend::{Backend, InMemoryBackend};
//! use marketseed::backend::requests::SalesChannelFilter;
//!
//! # tokio_test::block_on(async {
//! let backend = InMemoryBackend::new();
//! let channels = backend
//!     .list_sales_channels(SalesChannelFilter { name: "Default Sales Channel".into() })
//!     .await
//!     .unwrap();
//! assert!(channels.is_empty());
//! # });
//! ```

use async_trait::async_trait;
use thiserror::Error;

use super::model::{
    ApiKey, AuthIdentity, CommissionRule, ConfigurationRule, InventoryItem, InventoryLevel,
    Product, ProductCategory, ProductCollection, Region, SalesChannel, Seller,
    SellerShippingProfile, ServiceZone, ShippingOption, StockLocation, Store, TaxRegion,
};
use super::requests::{
    ApiKeyFilter, CreateApiKeysRequest, CreateCollectionsRequest, CreateCommissionRuleRequest,
    CreateConfigurationRuleRequest, CreateInventoryLevelsRequest,
    CreateLocationFulfillmentSetRequest, CreateLinksRequest, CreateProductCategoriesRequest,
    CreateProductsRequest, CreateRegionsRequest, CreateSalesChannelsRequest,
    CreateSellerRequest, CreateServiceZonesRequest, CreateShippingOptionsRequest,
    CreateStockLocationsRequest, CreateTaxRegionsRequest, LinkSalesChannelsToApiKeyRequest,
    RegisterIdentityRequest, SalesChannelFilter, SellerShippingProfileQuery, ServiceZoneFilter,
    StockLocationQuery, UpdateStoresRequest, UpdateTaxRegionsRequest,
};

/// Errors from backend calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// No credentials configured for a backend that requires them.
    #[error("authentication required")]
    AuthRequired,

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend refused the request (conflict or validation).
    #[error("rejected ({status}): {message}")]
    Rejected {
        /// HTTP-style status code
        status: u16,
        /// Message from the backend
        message: String,
    },

    /// The backend failed while handling the request.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP-style status code
        status: u16,
        /// Message from the backend
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Every call on the [`Backend`] trait, named after its method.
///
/// Used for failure injection and operation logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    ListSalesChannels,
    CreateSalesChannels,
    ListStores,
    UpdateStores,
    CreateRegions,
    CreateTaxRegions,
    UpdateTaxRegions,
    ListApiKeys,
    CreateApiKeys,
    LinkSalesChannelsToApiKey,
    ListProductCategories,
    CreateProductCategories,
    ListCollections,
    CreateCollections,
    RegisterIdentity,
    CreateSeller,
    CreateStockLocations,
    CreateLinks,
    CreateLocationFulfillmentSet,
    QueryStockLocations,
    CreateServiceZones,
    ListServiceZones,
    QuerySellerShippingProfiles,
    CreateShippingOptions,
    CreateProducts,
    ListInventoryItems,
    CreateInventoryLevels,
    CreateCommissionRule,
    CreateConfigurationRule,
}

impl BackendOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendOp::ListSalesChannels => "list_sales_channels",
            BackendOp::CreateSalesChannels => "create_sales_channels",
            BackendOp::ListStores => "list_stores",
            BackendOp::UpdateStores => "update_stores",
            BackendOp::CreateRegions => "create_regions",
            BackendOp::CreateTaxRegions => "create_tax_regions",
            BackendOp::UpdateTaxRegions => "update_tax_regions",
            BackendOp::ListApiKeys => "list_api_keys",
            BackendOp::CreateApiKeys => "create_api_keys",
            BackendOp::LinkSalesChannelsToApiKey => "link_sales_channels_to_api_key",
            BackendOp::ListProductCategories => "list_product_categories",
            BackendOp::CreateProductCategories => "create_product_categories",
            BackendOp::ListCollections => "list_collections",
            BackendOp::CreateCollections => "create_collections",
            BackendOp::RegisterIdentity => "register_identity",
            BackendOp::CreateSeller => "create_seller",
            BackendOp::CreateStockLocations => "create_stock_locations",
            BackendOp::CreateLinks => "create_links",
            BackendOp::CreateLocationFulfillmentSet => "create_location_fulfillment_set",
            BackendOp::QueryStockLocations => "query_stock_locations",
            BackendOp::CreateServiceZones => "create_service_zones",
            BackendOp::ListServiceZones => "list_service_zones",
            BackendOp::QuerySellerShippingProfiles => "query_seller_shipping_profiles",
            BackendOp::CreateShippingOptions => "create_shipping_options",
            BackendOp::CreateProducts => "create_products",
            BackendOp::ListInventoryItems => "list_inventory_items",
            BackendOp::CreateInventoryLevels => "create_inventory_levels",
            BackendOp::CreateCommissionRule => "create_commission_rule",
            BackendOp::CreateConfigurationRule => "create_configuration_rule",
        }
    }
}

impl std::fmt::Display for BackendOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The commerce backend: module reads, graph queries, links and workflows.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the executor shares one backend
/// across concurrently running steps.
///
/// # Error Handling
///
/// Errors are returned unchanged to the calling step, which aborts the run:
/// - `AuthRequired` / `AuthFailed`: fix credentials and `resume`
/// - `NotFound`: a referenced entity is missing
/// - `Rejected`: the backend refused the payload (often a duplicate)
/// - `Api` / `Network` / `Decode`: backend or transport failure
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name (e.g., "http", "memory").
    fn name(&self) -> &'static str;

    // --- sales channels and store -------------------------------------------

    /// List sales channels matching `filter`.
    async fn list_sales_channels(
        &self,
        filter: SalesChannelFilter,
    ) -> Result<Vec<SalesChannel>, BackendError>;

    /// Run the create-sales-channels workflow.
    async fn create_sales_channels(
        &self,
        request: CreateSalesChannelsRequest,
    ) -> Result<Vec<SalesChannel>, BackendError>;

    /// List stores. Platforms have at most one.
    async fn list_stores(&self) -> Result<Vec<Store>, BackendError>;

    /// Run the update-stores workflow.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the selected store doesn't exist
    async fn update_stores(&self, request: UpdateStoresRequest) -> Result<Vec<Store>, BackendError>;

    // --- regions and tax ----------------------------------------------------

    async fn create_regions(
        &self,
        request: CreateRegionsRequest,
    ) -> Result<Vec<Region>, BackendError>;

    async fn create_tax_regions(
        &self,
        request: CreateTaxRegionsRequest,
    ) -> Result<Vec<TaxRegion>, BackendError>;

    /// # Errors
    ///
    /// - `NotFound` if any tax region doesn't exist
    async fn update_tax_regions(
        &self,
        request: UpdateTaxRegionsRequest,
    ) -> Result<Vec<TaxRegion>, BackendError>;

    // --- api keys -----------------------------------------------------------

    async fn list_api_keys(&self, filter: ApiKeyFilter) -> Result<Vec<ApiKey>, BackendError>;

    async fn create_api_keys(
        &self,
        request: CreateApiKeysRequest,
    ) -> Result<Vec<ApiKey>, BackendError>;

    /// Associate sales channels with a publishable key.
    ///
    /// Linking an already-linked channel is a no-op.
    async fn link_sales_channels_to_api_key(
        &self,
        request: LinkSalesChannelsToApiKeyRequest,
    ) -> Result<(), BackendError>;

    // --- catalog ------------------------------------------------------------

    async fn list_product_categories(&self) -> Result<Vec<ProductCategory>, BackendError>;

    async fn create_product_categories(
        &self,
        request: CreateProductCategoriesRequest,
    ) -> Result<Vec<ProductCategory>, BackendError>;

    async fn list_collections(&self) -> Result<Vec<ProductCollection>, BackendError>;

    async fn create_collections(
        &self,
        request: CreateCollectionsRequest,
    ) -> Result<Vec<ProductCollection>, BackendError>;

    /// Run the create-products workflow.
    ///
    /// Managed variants get one inventory item each.
    async fn create_products(
        &self,
        request: CreateProductsRequest,
    ) -> Result<Vec<Product>, BackendError>;

    /// List every inventory item on the platform.
    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>, BackendError>;

    async fn create_inventory_levels(
        &self,
        request: CreateInventoryLevelsRequest,
    ) -> Result<Vec<InventoryLevel>, BackendError>;

    // --- identity and seller ------------------------------------------------

    /// Register an auth identity with the request's provider.
    ///
    /// # Errors
    ///
    /// - `Rejected` if the identity already exists
    async fn register_identity(
        &self,
        request: RegisterIdentityRequest,
    ) -> Result<AuthIdentity, BackendError>;

    /// Run the create-seller workflow.
    ///
    /// Also creates the seller's shipping profile and links it to the seller.
    async fn create_seller(&self, request: CreateSellerRequest) -> Result<Seller, BackendError>;

    // --- stock locations and fulfillment -------------------------------------

    async fn create_stock_locations(
        &self,
        request: CreateStockLocationsRequest,
    ) -> Result<Vec<StockLocation>, BackendError>;

    /// Create a batch of links. Existing links are left untouched.
    async fn create_links(&self, request: CreateLinksRequest) -> Result<(), BackendError>;

    /// Create a fulfillment set on a location and associate it with a seller.
    async fn create_location_fulfillment_set(
        &self,
        request: CreateLocationFulfillmentSetRequest,
    ) -> Result<(), BackendError>;

    /// Graph query for stock locations with fulfillment sets expanded.
    async fn query_stock_locations(
        &self,
        query: StockLocationQuery,
    ) -> Result<Vec<StockLocation>, BackendError>;

    /// The workflow output does not carry the zone IDs; callers list the
    /// zones of the fulfillment set afterwards.
    async fn create_service_zones(
        &self,
        request: CreateServiceZonesRequest,
    ) -> Result<(), BackendError>;

    async fn list_service_zones(
        &self,
        filter: ServiceZoneFilter,
    ) -> Result<Vec<ServiceZone>, BackendError>;

    /// Graph query over the seller↔shipping-profile link.
    async fn query_seller_shipping_profiles(
        &self,
        query: SellerShippingProfileQuery,
    ) -> Result<Vec<SellerShippingProfile>, BackendError>;

    async fn create_shipping_options(
        &self,
        request: CreateShippingOptionsRequest,
    ) -> Result<Vec<ShippingOption>, BackendError>;

    // --- policies -----------------------------------------------------------

    async fn create_commission_rule(
        &self,
        request: CreateCommissionRuleRequest,
    ) -> Result<CommissionRule, BackendError>;

    async fn create_configuration_rule(
        &self,
        request: CreateConfigurationRuleRequest,
    ) -> Result<ConfigurationRule, BackendError>;
}
