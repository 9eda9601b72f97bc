//! backend::memory
//!
//! In-process backend for deterministic tests and dry runs.
//!
//! # Design
//!
//! `InMemoryBackend` keeps every module's entities in memory and honours
//! the same contracts as a real platform: link creation and API-key
//! channel linking are idempotent, seller creation also creates the
//! seller's shipping profile, and product creation creates one inventory
//! item per managed variant. Referenced entities must exist, so a step
//! that passes a stale or foreign ID fails with `NotFound` just as it
//! would against a live server.
//!
//! Every call is recorded as a [`MockOperation`], and any call can be made
//! to fail through [`FailOn`].
//!
//! # Example
//!
//! ```
//! use marketseed::backend::memory::{FailOn, InMemoryBackend};
//! use marketseed::backend::{Backend, BackendError, BackendOp};
//!
//! # tokio_test::block_on(async {
//! let backend = InMemoryBackend::with_default_store()
//!     .fail_on(FailOn::Op(BackendOp::ListStores, BackendError::Network("down".into())));
//!
//! assert!(backend.list_stores().await.is_err());
//! backend.clear_fail_on();
//! assert_eq!(backend.list_stores().await.unwrap().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::links::{LinkDefinition, ModuleRef};
use super::model::{
    ApiKey, AuthIdentity, CommissionRule, ConfigurationRule, FulfillmentSet, GeoZone,
    InventoryItem, InventoryLevel, Product, ProductCategory, ProductCollection, ProductVariant,
    Region, SalesChannel, Seller, SellerShippingProfile, ServiceZone, ShippingOption,
    StockLocation, Store, TaxRegion,
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
use super::traits::{Backend, BackendError, BackendOp};
use crate::core::types::{ApiKeyId, SalesChannelId, StoreId, TypeError};

/// In-memory backend.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    sales_channels: Vec<SalesChannel>,
    stores: Vec<Store>,
    regions: Vec<Region>,
    tax_regions: Vec<TaxRegion>,
    api_keys: Vec<ApiKey>,
    api_key_channels: HashMap<ApiKeyId, BTreeSet<SalesChannelId>>,
    categories: Vec<ProductCategory>,
    collections: Vec<ProductCollection>,
    /// Registered identities as (provider, email, identity).
    identities: Vec<(String, String, AuthIdentity)>,
    sellers: Vec<Seller>,
    seller_shipping_profiles: Vec<SellerShippingProfile>,
    stock_locations: Vec<StockLocation>,
    links: BTreeSet<LinkDefinition>,
    service_zones: Vec<ServiceZone>,
    shipping_options: Vec<ShippingOption>,
    products: Vec<Product>,
    inventory_items: Vec<InventoryItem>,
    inventory_levels: Vec<InventoryLevel>,
    commission_rules: Vec<CommissionRule>,
    configuration_rules: Vec<ConfigurationRule>,
    fail_on: Option<FailOn>,
    call_counts: HashMap<BackendOp, usize>,
    operations: Vec<MockOperation>,
}

impl MemoryState {
    /// Issue a fresh ID with a module-style prefix.
    fn mint<T>(&mut self, prefix: &str) -> Result<T, BackendError>
    where
        T: TryFrom<String, Error = TypeError>,
    {
        self.next_id += 1;
        T::try_from(format!("{}_{:04}", prefix, self.next_id))
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// Configuration for which call should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every call to the operation.
    Op(BackendOp, BackendError),
    /// Fail only the n-th call (1-based) to the operation.
    NthCall(BackendOp, usize, BackendError),
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq)]
pub struct MockOperation {
    pub op: BackendOp,
    /// The request as it would go over the wire (secrets omitted).
    pub payload: serde_json::Value,
}

impl InMemoryBackend {
    /// Create an empty backend with no store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    /// Create a backend holding the platform's singleton store.
    pub fn with_default_store() -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state();
            if let Ok(id) = state.mint::<StoreId>("store") {
                state.stores.push(Store {
                    id,
                    name: "Default Store".to_string(),
                    default_sales_channel_id: None,
                    default_region_id: None,
                });
            }
        }
        backend
    }

    /// Configure the backend to fail on a specific call.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.state().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.state().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    /// Operations recorded for one call type, in order.
    pub fn operations_of(&self, op: BackendOp) -> Vec<MockOperation> {
        self.state()
            .operations
            .iter()
            .filter(|o| o.op == op)
            .cloned()
            .collect()
    }

    pub fn clear_operations(&self) {
        self.state().operations.clear();
    }

    // --- inspection -----------------------------------------------------------

    pub fn sales_channels(&self) -> Vec<SalesChannel> {
        self.state().sales_channels.clone()
    }

    pub fn stores(&self) -> Vec<Store> {
        self.state().stores.clone()
    }

    pub fn regions(&self) -> Vec<Region> {
        self.state().regions.clone()
    }

    pub fn tax_regions(&self) -> Vec<TaxRegion> {
        self.state().tax_regions.clone()
    }

    pub fn api_keys(&self) -> Vec<ApiKey> {
        self.state().api_keys.clone()
    }

    /// Sales channels linked to an API key.
    pub fn api_key_channels(&self, key: &ApiKeyId) -> Vec<SalesChannelId> {
        self.state()
            .api_key_channels
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn categories(&self) -> Vec<ProductCategory> {
        self.state().categories.clone()
    }

    pub fn collections(&self) -> Vec<ProductCollection> {
        self.state().collections.clone()
    }

    pub fn sellers(&self) -> Vec<Seller> {
        self.state().sellers.clone()
    }

    pub fn stock_locations(&self) -> Vec<StockLocation> {
        self.state().stock_locations.clone()
    }

    pub fn links(&self) -> Vec<LinkDefinition> {
        self.state().links.iter().cloned().collect()
    }

    /// Links with `entity` on either side.
    pub fn links_touching(&self, entity: &ModuleRef) -> Vec<LinkDefinition> {
        self.state()
            .links
            .iter()
            .filter(|l| l.touches(entity))
            .cloned()
            .collect()
    }

    pub fn service_zones(&self) -> Vec<ServiceZone> {
        self.state().service_zones.clone()
    }

    pub fn shipping_options(&self) -> Vec<ShippingOption> {
        self.state().shipping_options.clone()
    }

    pub fn products(&self) -> Vec<Product> {
        self.state().products.clone()
    }

    pub fn inventory_items(&self) -> Vec<InventoryItem> {
        self.state().inventory_items.clone()
    }

    pub fn inventory_levels(&self) -> Vec<InventoryLevel> {
        self.state().inventory_levels.clone()
    }

    pub fn commission_rules(&self) -> Vec<CommissionRule> {
        self.state().commission_rules.clone()
    }

    pub fn configuration_rules(&self) -> Vec<ConfigurationRule> {
        self.state().configuration_rules.clone()
    }

    /// Seed inventory items that exist independently of any product.
    pub fn insert_inventory_items(&self, skus: &[&str]) -> Result<(), BackendError> {
        let mut state = self.state();
        for sku in skus {
            let id = state.mint("iitem")?;
            state.inventory_items.push(InventoryItem {
                id,
                sku: Some(sku.to_string()),
            });
        }
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call, then return the configured failure, if any.
    fn enter(&self, op: BackendOp, payload: serde_json::Value) -> Result<(), BackendError> {
        let mut state = self.state();
        state.operations.push(MockOperation { op, payload });
        let count = {
            let count = state.call_counts.entry(op).or_insert(0);
            *count += 1;
            *count
        };
        match &state.fail_on {
            Some(FailOn::Op(target, e)) if *target == op => Err(e.clone()),
            Some(FailOn::NthCall(target, n, e)) if *target == op && *n == count => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn payload<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

fn not_found(what: impl std::fmt::Display) -> BackendError {
    BackendError::NotFound(what.to_string())
}

fn conflict(message: impl Into<String>) -> BackendError {
    BackendError::Rejected {
        status: 409,
        message: message.into(),
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_sales_channels(
        &self,
        filter: SalesChannelFilter,
    ) -> Result<Vec<SalesChannel>, BackendError> {
        self.enter(BackendOp::ListSalesChannels, payload(&filter))?;
        let state = self.state();
        Ok(state
            .sales_channels
            .iter()
            .filter(|c| c.name == filter.name)
            .cloned()
            .collect())
    }

    async fn create_sales_channels(
        &self,
        request: CreateSalesChannelsRequest,
    ) -> Result<Vec<SalesChannel>, BackendError> {
        self.enter(BackendOp::CreateSalesChannels, payload(&request))?;
        let mut state = self.state();
        let mut created = Vec::new();
        for data in request.sales_channels_data {
            let channel = SalesChannel {
                id: state.mint("sc")?,
                name: data.name,
                description: data.description,
                is_disabled: false,
            };
            state.sales_channels.push(channel.clone());
            created.push(channel);
        }
        Ok(created)
    }

    async fn list_stores(&self) -> Result<Vec<Store>, BackendError> {
        self.enter(BackendOp::ListStores, serde_json::Value::Null)?;
        Ok(self.state().stores.clone())
    }

    async fn update_stores(&self, request: UpdateStoresRequest) -> Result<Vec<Store>, BackendError> {
        self.enter(BackendOp::UpdateStores, payload(&request))?;
        let mut state = self.state();
        if !state
            .sales_channels
            .iter()
            .any(|c| c.id == request.update.default_sales_channel_id)
        {
            return Err(not_found(format!(
                "sales channel {}",
                request.update.default_sales_channel_id
            )));
        }
        if !state
            .regions
            .iter()
            .any(|r| r.id == request.update.default_region_id)
        {
            return Err(not_found(format!("region {}", request.update.default_region_id)));
        }
        let store = state
            .stores
            .iter_mut()
            .find(|s| s.id == request.selector.id)
            .ok_or_else(|| not_found(format!("store {}", request.selector.id)))?;
        store.default_sales_channel_id = Some(request.update.default_sales_channel_id);
        store.default_region_id = Some(request.update.default_region_id);
        Ok(vec![store.clone()])
    }

    async fn create_regions(
        &self,
        request: CreateRegionsRequest,
    ) -> Result<Vec<Region>, BackendError> {
        self.enter(BackendOp::CreateRegions, payload(&request))?;
        let mut state = self.state();
        let mut created = Vec::new();
        for data in request.regions {
            // A country belongs to at most one region.
            if let Some(country) = data
                .countries
                .iter()
                .find(|c| state.regions.iter().any(|r| r.countries.contains(c)))
            {
                return Err(conflict(format!(
                    "country {} is already assigned to a region",
                    country
                )));
            }
            let region = Region {
                id: state.mint("reg")?,
                name: data.name,
                currency_code: data.currency_code,
                countries: data.countries,
                payment_providers: data.payment_providers,
            };
            state.regions.push(region.clone());
            created.push(region);
        }
        Ok(created)
    }

    async fn create_tax_regions(
        &self,
        request: CreateTaxRegionsRequest,
    ) -> Result<Vec<TaxRegion>, BackendError> {
        self.enter(BackendOp::CreateTaxRegions, payload(&request))?;
        let mut state = self.state();
        let mut created = Vec::new();
        for data in request.tax_regions {
            if state
                .tax_regions
                .iter()
                .any(|t| t.country_code == data.country_code)
            {
                return Err(conflict(format!(
                    "tax region for {} already exists",
                    data.country_code
                )));
            }
            let tax_region = TaxRegion {
                id: state.mint("txreg")?,
                country_code: data.country_code,
                provider_id: None,
            };
            state.tax_regions.push(tax_region.clone());
            created.push(tax_region);
        }
        Ok(created)
    }

    async fn update_tax_regions(
        &self,
        request: UpdateTaxRegionsRequest,
    ) -> Result<Vec<TaxRegion>, BackendError> {
        self.enter(BackendOp::UpdateTaxRegions, payload(&request))?;
        let mut state = self.state();
        if let Some(missing) = request
            .tax_regions
            .iter()
            .find(|u| !state.tax_regions.iter().any(|t| t.id == u.id))
        {
            return Err(not_found(format!("tax region {}", missing.id)));
        }
        let mut updated = Vec::new();
        for update in request.tax_regions {
            if let Some(tax_region) = state.tax_regions.iter_mut().find(|t| t.id == update.id) {
                tax_region.provider_id = Some(update.provider_id);
                updated.push(tax_region.clone());
            }
        }
        Ok(updated)
    }

    async fn list_api_keys(&self, filter: ApiKeyFilter) -> Result<Vec<ApiKey>, BackendError> {
        self.enter(BackendOp::ListApiKeys, payload(&filter))?;
        Ok(self
            .state()
            .api_keys
            .iter()
            .filter(|k| k.key_type == filter.key_type)
            .cloned()
            .collect())
    }

    async fn create_api_keys(
        &self,
        request: CreateApiKeysRequest,
    ) -> Result<Vec<ApiKey>, BackendError> {
        self.enter(BackendOp::CreateApiKeys, payload(&request))?;
        let mut state = self.state();
        let mut created = Vec::new();
        for data in request.api_keys {
            let prefix = if data.key_type == "publishable" { "apk" } else { "sk" };
            let key = ApiKey {
                id: state.mint(prefix)?,
                title: data.title,
                key_type: data.key_type,
                created_by: data.created_by,
            };
            state.api_keys.push(key.clone());
            created.push(key);
        }
        Ok(created)
    }

    async fn link_sales_channels_to_api_key(
        &self,
        request: LinkSalesChannelsToApiKeyRequest,
    ) -> Result<(), BackendError> {
        self.enter(BackendOp::LinkSalesChannelsToApiKey, payload(&request))?;
        let mut state = self.state();
        let key = state
            .api_keys
            .iter()
            .find(|k| k.id == request.id)
            .ok_or_else(|| not_found(format!("api key {}", request.id)))?;
        if key.key_type != "publishable" {
            return Err(BackendError::Rejected {
                status: 422,
                message: format!("api key {} is not publishable", key.id),
            });
        }
        if let Some(missing) = request
            .add
            .iter()
            .find(|id| !state.sales_channels.iter().any(|c| &c.id == *id))
        {
            return Err(not_found(format!("sales channel {}", missing)));
        }
        let linked = state.api_key_channels.entry(request.id).or_default();
        linked.extend(request.add);
        for id in &request.remove {
            linked.remove(id);
        }
        Ok(())
    }

    async fn list_product_categories(&self) -> Result<Vec<ProductCategory>, BackendError> {
        self.enter(BackendOp::ListProductCategories, serde_json::Value::Null)?;
        Ok(self.state().categories.clone())
    }

    async fn create_product_categories(
        &self,
        request: CreateProductCategoriesRequest,
    ) -> Result<Vec<ProductCategory>, BackendError> {
        self.enter(BackendOp::CreateProductCategories, payload(&request))?;
        let mut state = self.state();
        let mut created = Vec::new();
        for data in request.product_categories {
            let category = ProductCategory {
                id: state.mint("pcat")?,
                name: data.name,
                is_active: data.is_active,
            };
            state.categories.push(category.clone());
            created.push(category);
        }
        Ok(created)
    }

    async fn list_collections(&self) -> Result<Vec<ProductCollection>, BackendError> {
        self.enter(BackendOp::ListCollections, serde_json::Value::Null)?;
        Ok(self.state().collections.clone())
    }

    async fn create_collections(
        &self,
        request: CreateCollectionsRequest,
    ) -> Result<Vec<ProductCollection>, BackendError> {
        self.enter(BackendOp::CreateCollections, payload(&request))?;
        let mut state = self.state();
        let mut created = Vec::new();
        for data in request.collections {
            let collection = ProductCollection {
                id: state.mint("pcol")?,
                title: data.title,
            };
            state.collections.push(collection.clone());
            created.push(collection);
        }
        Ok(created)
    }

    async fn create_products(
        &self,
        request: CreateProductsRequest,
    ) -> Result<Vec<Product>, BackendError> {
        self.enter(BackendOp::CreateProducts, payload(&request))?;
        let mut state = self.state();
        if !state
            .sellers
            .iter()
            .any(|s| s.id == request.additional_data.seller_id)
        {
            return Err(not_found(format!("seller {}", request.additional_data.seller_id)));
        }
        for data in &request.products {
            if state
                .products
                .iter()
                .any(|p| p.handle.as_deref() == Some(data.handle.as_str()))
            {
                return Err(conflict(format!(
                    "product with handle '{}' already exists",
                    data.handle
                )));
            }
            if !state.collections.iter().any(|c| c.id == data.collection_id) {
                return Err(not_found(format!("collection {}", data.collection_id)));
            }
            for category in &data.categories {
                if !state.categories.iter().any(|c| c.id == category.id) {
                    return Err(not_found(format!("category {}", category.id)));
                }
            }
            for channel in &data.sales_channels {
                if !state.sales_channels.iter().any(|c| c.id == channel.id) {
                    return Err(not_found(format!("sales channel {}", channel.id)));
                }
            }
        }

        let mut created = Vec::new();
        for data in request.products {
            let mut variants = Vec::new();
            for variant in data.variants {
                if variant.manage_inventory {
                    let id = state.mint("iitem")?;
                    state.inventory_items.push(InventoryItem {
                        id,
                        sku: Some(variant.sku.clone()),
                    });
                }
                variants.push(ProductVariant {
                    title: variant.title,
                    sku: Some(variant.sku),
                });
            }
            let product = Product {
                id: state.mint("prod")?,
                title: data.title,
                handle: Some(data.handle),
                collection_id: Some(data.collection_id),
                categories: data.categories,
                sales_channels: data.sales_channels,
                variants,
            };
            state.products.push(product.clone());
            created.push(product);
        }
        Ok(created)
    }

    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>, BackendError> {
        self.enter(BackendOp::ListInventoryItems, serde_json::Value::Null)?;
        Ok(self.state().inventory_items.clone())
    }

    async fn create_inventory_levels(
        &self,
        request: CreateInventoryLevelsRequest,
    ) -> Result<Vec<InventoryLevel>, BackendError> {
        self.enter(BackendOp::CreateInventoryLevels, payload(&request))?;
        let mut state = self.state();
        for data in &request.inventory_levels {
            if !state
                .inventory_items
                .iter()
                .any(|i| i.id == data.inventory_item_id)
            {
                return Err(not_found(format!("inventory item {}", data.inventory_item_id)));
            }
            if !state.stock_locations.iter().any(|l| l.id == data.location_id) {
                return Err(not_found(format!("stock location {}", data.location_id)));
            }
            if state.inventory_levels.iter().any(|l| {
                l.inventory_item_id == data.inventory_item_id && l.location_id == data.location_id
            }) {
                return Err(conflict(format!(
                    "inventory item {} is already stocked at location {}",
                    data.inventory_item_id, data.location_id
                )));
            }
        }
        let mut created = Vec::new();
        for data in request.inventory_levels {
            let level = InventoryLevel {
                id: state.mint("ilev")?,
                inventory_item_id: data.inventory_item_id,
                location_id: data.location_id,
                stocked_quantity: data.stocked_quantity,
            };
            state.inventory_levels.push(level.clone());
            created.push(level);
        }
        Ok(created)
    }

    async fn register_identity(
        &self,
        request: RegisterIdentityRequest,
    ) -> Result<AuthIdentity, BackendError> {
        self.enter(
            BackendOp::RegisterIdentity,
            serde_json::json!({ "provider": request.provider, "email": request.email }),
        )?;
        let mut state = self.state();
        if state
            .identities
            .iter()
            .any(|(provider, email, _)| provider == &request.provider && email == &request.email)
        {
            return Err(BackendError::Rejected {
                status: 409,
                message: "Identity with email already exists".to_string(),
            });
        }
        let identity = AuthIdentity {
            id: state.mint("authid")?,
        };
        state
            .identities
            .push((request.provider, request.email, identity.clone()));
        Ok(identity)
    }

    async fn create_seller(&self, request: CreateSellerRequest) -> Result<Seller, BackendError> {
        self.enter(BackendOp::CreateSeller, payload(&request))?;
        let mut state = self.state();
        if !state
            .identities
            .iter()
            .any(|(_, _, identity)| identity.id == request.auth_identity_id)
        {
            return Err(not_found(format!("auth identity {}", request.auth_identity_id)));
        }
        let handle = request.seller.name.to_lowercase().replace(' ', "-");
        if state
            .sellers
            .iter()
            .any(|s| s.handle.as_deref() == Some(handle.as_str()))
        {
            return Err(conflict(format!("seller with handle '{}' already exists", handle)));
        }
        let seller = Seller {
            id: state.mint("sel")?,
            name: request.seller.name,
            handle: Some(handle),
        };
        let shipping_profile_id = state.mint("sp")?;
        state.seller_shipping_profiles.push(SellerShippingProfile {
            seller_id: seller.id.clone(),
            shipping_profile_id,
        });
        state.sellers.push(seller.clone());
        Ok(seller)
    }

    async fn create_stock_locations(
        &self,
        request: CreateStockLocationsRequest,
    ) -> Result<Vec<StockLocation>, BackendError> {
        self.enter(BackendOp::CreateStockLocations, payload(&request))?;
        let mut state = self.state();
        let mut created = Vec::new();
        for data in request.locations {
            let location = StockLocation {
                id: state.mint("sloc")?,
                name: data.name,
                address: Some(data.address),
                fulfillment_sets: Vec::new(),
            };
            state.stock_locations.push(location.clone());
            created.push(location);
        }
        Ok(created)
    }

    async fn create_links(&self, request: CreateLinksRequest) -> Result<(), BackendError> {
        self.enter(BackendOp::CreateLinks, payload(&request.links))?;
        let mut state = self.state();
        state.links.extend(request.links);
        Ok(())
    }

    async fn create_location_fulfillment_set(
        &self,
        request: CreateLocationFulfillmentSetRequest,
    ) -> Result<(), BackendError> {
        self.enter(BackendOp::CreateLocationFulfillmentSet, payload(&request))?;
        let mut state = self.state();
        if !state.sellers.iter().any(|s| s.id == request.seller_id) {
            return Err(not_found(format!("seller {}", request.seller_id)));
        }
        let id = state.mint("fuset")?;
        let location = state
            .stock_locations
            .iter_mut()
            .find(|l| l.id == request.location_id)
            .ok_or_else(|| not_found(format!("stock location {}", request.location_id)))?;
        location.fulfillment_sets.push(FulfillmentSet {
            id,
            name: request.fulfillment_set_data.name,
            set_type: request.fulfillment_set_data.set_type,
        });
        Ok(())
    }

    async fn query_stock_locations(
        &self,
        query: StockLocationQuery,
    ) -> Result<Vec<StockLocation>, BackendError> {
        self.enter(BackendOp::QueryStockLocations, payload(&query))?;
        Ok(self
            .state()
            .stock_locations
            .iter()
            .filter(|l| l.id == query.id)
            .cloned()
            .collect())
    }

    async fn create_service_zones(
        &self,
        request: CreateServiceZonesRequest,
    ) -> Result<(), BackendError> {
        self.enter(BackendOp::CreateServiceZones, payload(&request))?;
        let mut state = self.state();
        for data in request.data {
            let set_exists = state
                .stock_locations
                .iter()
                .flat_map(|l| l.fulfillment_sets.iter())
                .any(|s| s.id == data.fulfillment_set_id);
            if !set_exists {
                return Err(not_found(format!("fulfillment set {}", data.fulfillment_set_id)));
            }
            let zone = ServiceZone {
                id: state.mint("serzo")?,
                name: data.name,
                fulfillment_set_id: Some(data.fulfillment_set_id),
                geo_zones: data
                    .geo_zones
                    .into_iter()
                    .map(|g| GeoZone {
                        zone_type: g.zone_type,
                        country_code: g.country_code,
                    })
                    .collect(),
            };
            state.service_zones.push(zone);
        }
        Ok(())
    }

    async fn list_service_zones(
        &self,
        filter: ServiceZoneFilter,
    ) -> Result<Vec<ServiceZone>, BackendError> {
        self.enter(BackendOp::ListServiceZones, payload(&filter))?;
        Ok(self
            .state()
            .service_zones
            .iter()
            .filter(|z| z.fulfillment_set_id.as_ref() == Some(&filter.fulfillment_set_id))
            .cloned()
            .collect())
    }

    async fn query_seller_shipping_profiles(
        &self,
        query: SellerShippingProfileQuery,
    ) -> Result<Vec<SellerShippingProfile>, BackendError> {
        self.enter(BackendOp::QuerySellerShippingProfiles, payload(&query))?;
        Ok(self
            .state()
            .seller_shipping_profiles
            .iter()
            .filter(|p| p.seller_id == query.seller_id)
            .cloned()
            .collect())
    }

    async fn create_shipping_options(
        &self,
        request: CreateShippingOptionsRequest,
    ) -> Result<Vec<ShippingOption>, BackendError> {
        self.enter(BackendOp::CreateShippingOptions, payload(&request))?;
        let mut state = self.state();
        let mut created = Vec::new();
        for data in request.options {
            if !state.service_zones.iter().any(|z| z.id == data.service_zone_id) {
                return Err(not_found(format!("service zone {}", data.service_zone_id)));
            }
            if !state
                .seller_shipping_profiles
                .iter()
                .any(|p| p.shipping_profile_id == data.shipping_profile_id)
            {
                return Err(not_found(format!(
                    "shipping profile {}",
                    data.shipping_profile_id
                )));
            }
            for price in &data.prices {
                if let Some(region_id) = &price.region_id {
                    if !state.regions.iter().any(|r| &r.id == region_id) {
                        return Err(not_found(format!("region {}", region_id)));
                    }
                }
            }
            let option = ShippingOption {
                id: state.mint("so")?,
                name: data.name,
                service_zone_id: data.service_zone_id,
                shipping_profile_id: data.shipping_profile_id,
                provider_id: data.provider_id,
                price_type: data.price_type,
                rules: data.rules,
                prices: data.prices,
            };
            state.shipping_options.push(option.clone());
            created.push(option);
        }
        Ok(created)
    }

    async fn create_commission_rule(
        &self,
        request: CreateCommissionRuleRequest,
    ) -> Result<CommissionRule, BackendError> {
        self.enter(BackendOp::CreateCommissionRule, payload(&request))?;
        let mut state = self.state();
        let rule = CommissionRule {
            id: state.mint("comrule")?,
            name: request.name,
            reference: request.reference,
            reference_id: request.reference_id,
            is_active: request.is_active,
            rate: request.rate,
        };
        state.commission_rules.push(rule.clone());
        Ok(rule)
    }

    async fn create_configuration_rule(
        &self,
        request: CreateConfigurationRuleRequest,
    ) -> Result<ConfigurationRule, BackendError> {
        self.enter(BackendOp::CreateConfigurationRule, payload(&request))?;
        let mut state = self.state();
        let rule = ConfigurationRule {
            id: state.mint("conf")?,
            rule_type: request.rule_type,
            is_enabled: request.is_enabled,
        };
        state.configuration_rules.push(rule.clone());
        Ok(rule)
    }
}
