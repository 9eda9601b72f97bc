//! backend::http
//!
//! HTTP backend talking to the commerce server's bootstrap bridge.
//!
//! # Design
//!
//! The bridge exposes the server's module services, graph query, link
//! store and workflow engine over five POST endpoints:
//!
//! | Endpoint                           | Body                          | Response              |
//! |------------------------------------|-------------------------------|-----------------------|
//! | `{base}/modules/{module}/list`     | `{entity, filters, select}`   | `{data: [...]}`       |
//! | `{base}/query/graph`               | `{entity, fields, filters}`   | `{data: [...]}`       |
//! | `{base}/links`                     | `[{module: {key: id}}, ...]`  | any                   |
//! | `{base}/workflows/{id}/run`        | `{input}`                     | `{result}`            |
//! | `{base}/auth/{provider}/register`  | `{email, password}`           | `{auth_identity}`     |
//!
//! # Authentication
//!
//! Every request carries `Authorization: Bearer <token>`. A backend built
//! without a token fails each call with `BackendError::AuthRequired`.
//!
//! # Errors
//!
//! HTTP status maps onto [`BackendError`]: 401/403 → `AuthFailed`,
//! 404 → `NotFound`, 409/422 → `Rejected`, anything else → `Api`.
//! Transport failures are `Network`; unparseable bodies are `Decode`.
//! No call is retried.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

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
use super::traits::{Backend, BackendError, BackendOp};

/// User-Agent header value for bridge requests.
const USER_AGENT_VALUE: &str = concat!("mseed/", env!("CARGO_PKG_VERSION"));

/// Workflow identifiers registered with the server's workflow engine.
pub mod workflows {
    pub const CREATE_SALES_CHANNELS: &str = "create-sales-channels";
    pub const UPDATE_STORES: &str = "update-stores";
    pub const CREATE_REGIONS: &str = "create-regions";
    pub const CREATE_TAX_REGIONS: &str = "create-tax-regions";
    pub const UPDATE_TAX_REGIONS: &str = "update-tax-regions";
    pub const CREATE_API_KEYS: &str = "create-api-keys";
    pub const LINK_SALES_CHANNELS_TO_API_KEY: &str = "link-sales-channels-to-api-key";
    pub const CREATE_PRODUCT_CATEGORIES: &str = "create-product-categories";
    pub const CREATE_COLLECTIONS: &str = "create-collections";
    pub const CREATE_PRODUCTS: &str = "create-products";
    pub const CREATE_INVENTORY_LEVELS: &str = "create-inventory-levels-workflow";
    pub const CREATE_SELLER: &str = "create-seller";
    pub const CREATE_STOCK_LOCATIONS: &str = "create-stock-locations-workflow";
    pub const CREATE_LOCATION_FULFILLMENT_SET: &str =
        "create-location-fulfillment-set-and-associate-with-seller";
    pub const CREATE_SERVICE_ZONES: &str = "create-service-zones";
    pub const CREATE_SHIPPING_OPTIONS: &str = "create-shipping-options-workflow";
    pub const CREATE_COMMISSION_RULE: &str = "create-commission-rule";
    pub const CREATE_CONFIGURATION_RULE: &str = "create-configuration-rule";
}

/// HTTP implementation of [`Backend`].
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

#[derive(Serialize)]
struct ListBody<'a, F: Serialize> {
    entity: &'a str,
    filters: F,
    select: &'a [&'a str],
}

#[derive(Serialize)]
struct GraphBody<'a, F: Serialize> {
    entity: &'a str,
    fields: &'a [&'a str],
    filters: F,
}

#[derive(Serialize)]
struct WorkflowBody<'a, I: Serialize> {
    input: &'a I,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct ResultEnvelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct RegisterEnvelope {
    auth_identity: AuthIdentity,
}

#[derive(Deserialize)]
struct BridgeErrorResponse {
    message: String,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// An empty filter object.
#[derive(Serialize)]
struct NoFilters {}

impl HttpBackend {
    /// Create a backend for the bridge rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Network` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Result<HeaderMap, BackendError> {
        let token = self.token.as_deref().ok_or(BackendError::AuthRequired)?;
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| BackendError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        op: BackendOp,
        path: &str,
        body: &B,
    ) -> Result<Response, BackendError> {
        let url = self.url(path);
        tracing::debug!(op = %op, url = %url, "backend call");
        self.client
            .post(&url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))
    }

    /// Handle a response, mapping errors appropriately.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| BackendError::Decode(format!("failed to parse response: {}", e)))
        } else {
            Err(Self::error_for(response, status).await)
        }
    }

    /// Handle a response whose body is not needed.
    async fn handle_empty(response: Response) -> Result<(), BackendError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::error_for(response, status).await)
        }
    }

    async fn error_for(response: Response, status: StatusCode) -> BackendError {
        let message = match response.json::<BridgeErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        map_status(status, message)
    }

    async fn list<T: DeserializeOwned, F: Serialize>(
        &self,
        op: BackendOp,
        module: &str,
        entity: &str,
        filters: F,
        select: &[&str],
    ) -> Result<Vec<T>, BackendError> {
        let body = ListBody {
            entity,
            filters,
            select,
        };
        let response = self
            .send(op, &format!("modules/{}/list", module), &body)
            .await?;
        let envelope: DataEnvelope<T> = Self::handle_response(response).await?;
        Ok(envelope.data)
    }

    async fn graph<T: DeserializeOwned, F: Serialize>(
        &self,
        op: BackendOp,
        entity: &str,
        fields: &[&str],
        filters: F,
    ) -> Result<Vec<T>, BackendError> {
        let body = GraphBody {
            entity,
            fields,
            filters,
        };
        let response = self.send(op, "query/graph", &body).await?;
        let envelope: DataEnvelope<T> = Self::handle_response(response).await?;
        Ok(envelope.data)
    }

    async fn workflow<T: DeserializeOwned, I: Serialize>(
        &self,
        op: BackendOp,
        workflow_id: &str,
        input: &I,
    ) -> Result<T, BackendError> {
        let response = self
            .send(
                op,
                &format!("workflows/{}/run", workflow_id),
                &WorkflowBody { input },
            )
            .await?;
        let envelope: ResultEnvelope<T> = Self::handle_response(response).await?;
        Ok(envelope.result)
    }
}

/// Map a non-success bridge status to a backend error.
pub(crate) fn map_status(status: StatusCode, message: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::AuthFailed(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => BackendError::Rejected {
            status: status.as_u16(),
            message,
        },
        _ if status.is_server_error() => BackendError::Api {
            status: status.as_u16(),
            message: format!("server error: {}", message),
        },
        _ => BackendError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list_sales_channels(
        &self,
        filter: SalesChannelFilter,
    ) -> Result<Vec<SalesChannel>, BackendError> {
        self.list(
            BackendOp::ListSalesChannels,
            "sales_channel",
            "sales_channel",
            filter,
            &[],
        )
        .await
    }

    async fn create_sales_channels(
        &self,
        request: CreateSalesChannelsRequest,
    ) -> Result<Vec<SalesChannel>, BackendError> {
        self.workflow(
            BackendOp::CreateSalesChannels,
            workflows::CREATE_SALES_CHANNELS,
            &request,
        )
        .await
    }

    async fn list_stores(&self) -> Result<Vec<Store>, BackendError> {
        self.list(BackendOp::ListStores, "store", "store", NoFilters {}, &[])
            .await
    }

    async fn update_stores(&self, request: UpdateStoresRequest) -> Result<Vec<Store>, BackendError> {
        self.workflow(BackendOp::UpdateStores, workflows::UPDATE_STORES, &request)
            .await
    }

    async fn create_regions(
        &self,
        request: CreateRegionsRequest,
    ) -> Result<Vec<Region>, BackendError> {
        self.workflow(BackendOp::CreateRegions, workflows::CREATE_REGIONS, &request)
            .await
    }

    async fn create_tax_regions(
        &self,
        request: CreateTaxRegionsRequest,
    ) -> Result<Vec<TaxRegion>, BackendError> {
        self.workflow(
            BackendOp::CreateTaxRegions,
            workflows::CREATE_TAX_REGIONS,
            &request.tax_regions,
        )
        .await
    }

    async fn update_tax_regions(
        &self,
        request: UpdateTaxRegionsRequest,
    ) -> Result<Vec<TaxRegion>, BackendError> {
        self.workflow(
            BackendOp::UpdateTaxRegions,
            workflows::UPDATE_TAX_REGIONS,
            &request.tax_regions,
        )
        .await
    }

    async fn list_api_keys(&self, filter: ApiKeyFilter) -> Result<Vec<ApiKey>, BackendError> {
        self.list(BackendOp::ListApiKeys, "api_key", "api_key", filter, &[])
            .await
    }

    async fn create_api_keys(
        &self,
        request: CreateApiKeysRequest,
    ) -> Result<Vec<ApiKey>, BackendError> {
        self.workflow(BackendOp::CreateApiKeys, workflows::CREATE_API_KEYS, &request)
            .await
    }

    async fn link_sales_channels_to_api_key(
        &self,
        request: LinkSalesChannelsToApiKeyRequest,
    ) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .workflow(
                BackendOp::LinkSalesChannelsToApiKey,
                workflows::LINK_SALES_CHANNELS_TO_API_KEY,
                &request,
            )
            .await?;
        Ok(())
    }

    async fn list_product_categories(&self) -> Result<Vec<ProductCategory>, BackendError> {
        self.list(
            BackendOp::ListProductCategories,
            "product",
            "product_category",
            NoFilters {},
            &["id", "name"],
        )
        .await
    }

    async fn create_product_categories(
        &self,
        request: CreateProductCategoriesRequest,
    ) -> Result<Vec<ProductCategory>, BackendError> {
        self.workflow(
            BackendOp::CreateProductCategories,
            workflows::CREATE_PRODUCT_CATEGORIES,
            &request,
        )
        .await
    }

    async fn list_collections(&self) -> Result<Vec<ProductCollection>, BackendError> {
        self.list(
            BackendOp::ListCollections,
            "product",
            "product_collection",
            NoFilters {},
            &["id", "title"],
        )
        .await
    }

    async fn create_collections(
        &self,
        request: CreateCollectionsRequest,
    ) -> Result<Vec<ProductCollection>, BackendError> {
        self.workflow(
            BackendOp::CreateCollections,
            workflows::CREATE_COLLECTIONS,
            &request,
        )
        .await
    }

    async fn create_products(
        &self,
        request: CreateProductsRequest,
    ) -> Result<Vec<Product>, BackendError> {
        self.workflow(BackendOp::CreateProducts, workflows::CREATE_PRODUCTS, &request)
            .await
    }

    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>, BackendError> {
        self.list(
            BackendOp::ListInventoryItems,
            "inventory",
            "inventory_item",
            NoFilters {},
            &["id"],
        )
        .await
    }

    async fn create_inventory_levels(
        &self,
        request: CreateInventoryLevelsRequest,
    ) -> Result<Vec<InventoryLevel>, BackendError> {
        self.workflow(
            BackendOp::CreateInventoryLevels,
            workflows::CREATE_INVENTORY_LEVELS,
            &request,
        )
        .await
    }

    async fn register_identity(
        &self,
        request: RegisterIdentityRequest,
    ) -> Result<AuthIdentity, BackendError> {
        let body = RegisterBody {
            email: &request.email,
            password: &request.password,
        };
        let response = self
            .send(
                BackendOp::RegisterIdentity,
                &format!("auth/{}/register", request.provider),
                &body,
            )
            .await?;
        let envelope: RegisterEnvelope = Self::handle_response(response).await?;
        Ok(envelope.auth_identity)
    }

    async fn create_seller(&self, request: CreateSellerRequest) -> Result<Seller, BackendError> {
        self.workflow(BackendOp::CreateSeller, workflows::CREATE_SELLER, &request)
            .await
    }

    async fn create_stock_locations(
        &self,
        request: CreateStockLocationsRequest,
    ) -> Result<Vec<StockLocation>, BackendError> {
        self.workflow(
            BackendOp::CreateStockLocations,
            workflows::CREATE_STOCK_LOCATIONS,
            &request,
        )
        .await
    }

    async fn create_links(&self, request: CreateLinksRequest) -> Result<(), BackendError> {
        let response = self
            .send(BackendOp::CreateLinks, "links", &request.links)
            .await?;
        Self::handle_empty(response).await
    }

    async fn create_location_fulfillment_set(
        &self,
        request: CreateLocationFulfillmentSetRequest,
    ) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .workflow(
                BackendOp::CreateLocationFulfillmentSet,
                workflows::CREATE_LOCATION_FULFILLMENT_SET,
                &request,
            )
            .await?;
        Ok(())
    }

    async fn query_stock_locations(
        &self,
        query: StockLocationQuery,
    ) -> Result<Vec<StockLocation>, BackendError> {
        self.graph(
            BackendOp::QueryStockLocations,
            "stock_location",
            &["*", "fulfillment_sets.*"],
            query,
        )
        .await
    }

    async fn create_service_zones(
        &self,
        request: CreateServiceZonesRequest,
    ) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .workflow(
                BackendOp::CreateServiceZones,
                workflows::CREATE_SERVICE_ZONES,
                &request,
            )
            .await?;
        Ok(())
    }

    async fn list_service_zones(
        &self,
        filter: ServiceZoneFilter,
    ) -> Result<Vec<ServiceZone>, BackendError> {
        let filters = serde_json::json!({ "fulfillment_set": { "id": filter.fulfillment_set_id } });
        self.list(
            BackendOp::ListServiceZones,
            "fulfillment",
            "service_zone",
            filters,
            &[],
        )
        .await
    }

    async fn query_seller_shipping_profiles(
        &self,
        query: SellerShippingProfileQuery,
    ) -> Result<Vec<SellerShippingProfile>, BackendError> {
        self.graph(
            BackendOp::QuerySellerShippingProfiles,
            "seller_shipping_profile",
            &["seller_id", "shipping_profile_id"],
            query,
        )
        .await
    }

    async fn create_shipping_options(
        &self,
        request: CreateShippingOptionsRequest,
    ) -> Result<Vec<ShippingOption>, BackendError> {
        self.workflow(
            BackendOp::CreateShippingOptions,
            workflows::CREATE_SHIPPING_OPTIONS,
            &request.options,
        )
        .await
    }

    async fn create_commission_rule(
        &self,
        request: CreateCommissionRuleRequest,
    ) -> Result<CommissionRule, BackendError> {
        self.workflow(
            BackendOp::CreateCommissionRule,
            workflows::CREATE_COMMISSION_RULE,
            &request,
        )
        .await
    }

    async fn create_configuration_rule(
        &self,
        request: CreateConfigurationRuleRequest,
    ) -> Result<ConfigurationRule, BackendError> {
        self.workflow(
            BackendOp::CreateConfigurationRule,
            workflows::CREATE_CONFIGURATION_RULE,
            &request,
        )
        .await
    }
}
