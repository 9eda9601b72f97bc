//! seed::entities
//!
//! Entity creators for the platform's base records.
//!
//! Sales channel and publishable key are looked up by natural key first
//! and only created when absent; the store is updated only if one exists.
//! Regions, taxonomies and the seller are created unconditionally.

use tracing::{debug, info, warn};

use crate::backend::model::{
    ApiKey, ProductCategory, ProductCollection, Region, SalesChannel, Seller, Store, TaxRegion,
};
use crate::backend::requests::{
    ApiKeyFilter, CreateApiKey, CreateApiKeysRequest, CreateCollection, CreateCollectionsRequest,
    CreateMember, CreateProductCategoriesRequest, CreateProductCategory, CreateRegion,
    CreateRegionsRequest, CreateSalesChannel, CreateSalesChannelsRequest, CreateSellerData,
    CreateSellerRequest, CreateTaxRegion, CreateTaxRegionsRequest,
    LinkSalesChannelsToApiKeyRequest, RegisterIdentityRequest, SalesChannelFilter, StoreSelector,
    StoreUpdate, UpdateStoresRequest, UpdateTaxRegion, UpdateTaxRegionsRequest, Validate,
    ValidationError,
};
use crate::backend::Backend;
use crate::core::fixtures;
use crate::core::types::{CountryCode, CurrencyCode, RegionId, SalesChannelId};

use super::{SeedError, SellerProfile};

/// The default region and the tax regions created for its countries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRegion {
    pub region: Region,
    pub tax_regions: Vec<TaxRegion>,
}

fn fixture_error(field: &str, err: impl std::fmt::Display) -> SeedError {
    SeedError::Invalid(ValidationError::new("fixtures", field, err.to_string()))
}

/// The fixed country list as validated codes.
pub fn seed_countries() -> Result<Vec<CountryCode>, SeedError> {
    fixtures::COUNTRIES
        .iter()
        .map(|c| CountryCode::new(*c).map_err(|e| fixture_error("countries", e)))
        .collect()
}

fn region_currency() -> Result<CurrencyCode, SeedError> {
    CurrencyCode::new(fixtures::REGION_CURRENCY).map_err(|e| fixture_error("region currency", e))
}

/// Return the default sales channel, creating it if absent.
pub async fn ensure_sales_channel(backend: &dyn Backend) -> Result<SalesChannel, SeedError> {
    let existing = backend
        .list_sales_channels(SalesChannelFilter {
            name: fixtures::DEFAULT_SALES_CHANNEL_NAME.to_string(),
        })
        .await?;
    if let Some(channel) = existing.into_iter().next() {
        debug!(id = %channel.id, "default sales channel already exists");
        return Ok(channel);
    }

    let request = CreateSalesChannelsRequest {
        sales_channels_data: vec![CreateSalesChannel {
            name: fixtures::DEFAULT_SALES_CHANNEL_NAME.to_string(),
            description: None,
        }],
    };
    request.validate()?;
    let channel = backend
        .create_sales_channels(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SeedError::NotFound("created sales channel".into()))?;
    info!(id = %channel.id, "created default sales channel");
    Ok(channel)
}

/// Create the default region, one tax region per country, and bind every
/// tax region to the system tax provider.
pub async fn create_regions(backend: &dyn Backend) -> Result<SeededRegion, SeedError> {
    let countries = seed_countries()?;

    let request = CreateRegionsRequest {
        regions: vec![CreateRegion {
            name: fixtures::REGION_NAME.to_string(),
            currency_code: region_currency()?,
            countries: countries.clone(),
            payment_providers: vec![fixtures::REGION_PAYMENT_PROVIDER.to_string()],
        }],
    };
    request.validate()?;
    let region = backend
        .create_regions(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SeedError::NotFound("created region".into()))?;
    info!(id = %region.id, "created region {}", region.name);

    let request = CreateTaxRegionsRequest {
        tax_regions: countries
            .into_iter()
            .map(|country_code| CreateTaxRegion { country_code })
            .collect(),
    };
    request.validate()?;
    let created = backend.create_tax_regions(request).await?;

    let request = UpdateTaxRegionsRequest {
        tax_regions: created
            .iter()
            .map(|t| UpdateTaxRegion {
                id: t.id.clone(),
                provider_id: fixtures::TAX_PROVIDER_ID.to_string(),
            })
            .collect(),
    };
    request.validate()?;
    let tax_regions = backend.update_tax_regions(request).await?;
    info!(
        count = tax_regions.len(),
        provider = fixtures::TAX_PROVIDER_ID,
        "created tax regions"
    );

    Ok(SeededRegion {
        region,
        tax_regions,
    })
}

/// Point the platform's store at the default sales channel and region.
///
/// Returns `None` without touching the backend further when there is no
/// store.
pub async fn update_default_store(
    backend: &dyn Backend,
    sales_channel_id: &SalesChannelId,
    region_id: &RegionId,
) -> Result<Option<Store>, SeedError> {
    let Some(store) = backend.list_stores().await?.into_iter().next() else {
        warn!("no store found; skipping store update");
        return Ok(None);
    };

    let request = UpdateStoresRequest {
        selector: StoreSelector { id: store.id },
        update: StoreUpdate {
            default_sales_channel_id: sales_channel_id.clone(),
            default_region_id: region_id.clone(),
        },
    };
    request.validate()?;
    let updated = backend
        .update_stores(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SeedError::NotFound("updated store".into()))?;
    info!(id = %updated.id, "updated store defaults");
    Ok(Some(updated))
}

/// Return the publishable key, creating it if absent, and link it to the
/// sales channel.
///
/// The link is issued even for an existing key; the backend treats an
/// existing association as a no-op.
pub async fn ensure_publishable_key(
    backend: &dyn Backend,
    sales_channel_id: &SalesChannelId,
) -> Result<ApiKey, SeedError> {
    let existing = backend
        .list_api_keys(ApiKeyFilter {
            key_type: fixtures::PUBLISHABLE_KEY_TYPE.to_string(),
        })
        .await?;

    let key = match existing.into_iter().next() {
        Some(key) => {
            debug!(id = %key.id, "publishable key already exists");
            key
        }
        None => {
            let request = CreateApiKeysRequest {
                api_keys: vec![CreateApiKey {
                    title: fixtures::PUBLISHABLE_KEY_TITLE.to_string(),
                    key_type: fixtures::PUBLISHABLE_KEY_TYPE.to_string(),
                    created_by: String::new(),
                }],
            };
            request.validate()?;
            let key = backend
                .create_api_keys(request)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| SeedError::NotFound("created publishable key".into()))?;
            info!(id = %key.id, "created publishable key");
            key
        }
    };

    let request = LinkSalesChannelsToApiKeyRequest {
        id: key.id.clone(),
        add: vec![sales_channel_id.clone()],
        remove: vec![],
    };
    request.validate()?;
    backend.link_sales_channels_to_api_key(request).await?;
    Ok(key)
}

/// Create the fixed product categories, all active.
pub async fn create_product_categories(
    backend: &dyn Backend,
) -> Result<Vec<ProductCategory>, SeedError> {
    let request = CreateProductCategoriesRequest {
        product_categories: fixtures::CATEGORY_NAMES
            .iter()
            .map(|name| CreateProductCategory {
                name: name.to_string(),
                is_active: true,
            })
            .collect(),
    };
    request.validate()?;
    let categories = backend.create_product_categories(request).await?;
    info!(count = categories.len(), "created product categories");
    Ok(categories)
}

/// Create the fixed product collections.
pub async fn create_product_collections(
    backend: &dyn Backend,
) -> Result<Vec<ProductCollection>, SeedError> {
    let request = CreateCollectionsRequest {
        collections: fixtures::COLLECTION_TITLES
            .iter()
            .map(|title| CreateCollection {
                title: title.to_string(),
            })
            .collect(),
    };
    request.validate()?;
    let collections = backend.create_collections(request).await?;
    info!(count = collections.len(), "created product collections");
    Ok(collections)
}

/// Register the seller's auth identity, then create the seller with its
/// first member.
pub async fn create_seller(
    backend: &dyn Backend,
    profile: &SellerProfile,
) -> Result<Seller, SeedError> {
    let request = RegisterIdentityRequest {
        provider: fixtures::SELLER_AUTH_PROVIDER.to_string(),
        email: profile.email.clone(),
        password: profile.password.clone(),
    };
    request.validate()?;
    let identity = backend.register_identity(request).await?;
    debug!(id = %identity.id, "registered seller identity");

    let request = CreateSellerRequest {
        auth_identity_id: identity.id,
        member: CreateMember {
            name: profile.member_name.clone(),
            email: profile.email.clone(),
        },
        seller: CreateSellerData {
            name: profile.name.clone(),
        },
    };
    request.validate()?;
    let seller = backend.create_seller(request).await?;
    info!(id = %seller.id, name = %seller.name, "created seller");
    Ok(seller)
}
