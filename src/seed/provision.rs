//! seed::provision
//!
//! Composite provisioners: multi-call sequences that set up a seller's
//! stock location, service zone and shipping option.
//!
//! Each provisioner issues its calls strictly in order and stops at the
//! first failure. Nothing created before the failure is rolled back.

use tracing::info;

use crate::backend::links::{LinkDefinition, ModuleRef};
use crate::backend::model::{
    Address, PriceType, Seller, ServiceZone, ShippingOption, ShippingOptionPrice,
    ShippingOptionRule, StockLocation,
};
use crate::backend::requests::{
    CreateGeoZone, CreateLocationFulfillmentSetRequest, CreateServiceZone,
    CreateServiceZonesRequest, CreateShippingOption, CreateShippingOptionsRequest,
    CreateStockLocation, CreateStockLocationsRequest, FulfillmentSetData,
    SellerShippingProfileQuery, ServiceZoneFilter, ShippingOptionType, StockLocationQuery,
    Validate, ValidationError,
};
use crate::backend::Backend;
use crate::core::fixtures;
use crate::core::types::{
    CountryCode, CurrencyCode, FulfillmentSetId, RegionId, SalesChannelId, SellerId,
    ServiceZoneId,
};

use super::entities::seed_countries;
use super::link::{link, link_all};
use super::SeedError;

/// Name of the stock location created for a seller.
pub fn stock_location_name(seller_id: &SellerId) -> String {
    format!("Stock Location for seller {}", seller_id)
}

/// Name of the fulfillment set created for a seller.
pub fn fulfillment_set_name(seller_id: &SellerId) -> String {
    format!("{} fulfillment set", seller_id)
}

/// Name and label of a seller's shipping option.
pub fn shipping_option_name(seller_name: &str) -> String {
    format!("{} shipping", seller_name)
}

/// Create the seller's stock location and wire it up.
///
/// 1. create the location
/// 2. link it to the seller, the manual fulfillment provider and the sales
///    channel, as one batch
/// 3. create a shipping fulfillment set on it for the seller
/// 4. re-read the location with its fulfillment sets expanded
pub async fn create_seller_stock_location(
    backend: &dyn Backend,
    seller: &Seller,
    sales_channel_id: &SalesChannelId,
) -> Result<StockLocation, SeedError> {
    let country = CountryCode::new(fixtures::STOCK_LOCATION_COUNTRY).map_err(|e| {
        ValidationError::new("fixtures", "stock location country", e.to_string())
    })?;
    let request = CreateStockLocationsRequest {
        locations: vec![CreateStockLocation {
            name: stock_location_name(&seller.id),
            address: Address {
                address_1: fixtures::STOCK_LOCATION_ADDRESS_1.to_string(),
                city: fixtures::STOCK_LOCATION_CITY.to_string(),
                country_code: country,
            },
        }],
    };
    request.validate()?;
    let created = backend
        .create_stock_locations(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SeedError::NotFound("created stock location".into()))?;
    info!(id = %created.id, seller = %seller.id, "created stock location");

    let location_ref = ModuleRef::stock_location(&created.id);
    link_all(
        backend,
        vec![
            LinkDefinition::new(ModuleRef::seller(&seller.id), location_ref.clone()),
            LinkDefinition::new(
                location_ref.clone(),
                ModuleRef::fulfillment_provider(fixtures::FULFILLMENT_PROVIDER_ID),
            ),
            LinkDefinition::new(ModuleRef::sales_channel(sales_channel_id), location_ref),
        ],
    )
    .await?;

    let request = CreateLocationFulfillmentSetRequest {
        fulfillment_set_data: FulfillmentSetData {
            name: fulfillment_set_name(&seller.id),
            set_type: fixtures::FULFILLMENT_SET_TYPE.to_string(),
        },
        location_id: created.id.clone(),
        seller_id: seller.id.clone(),
    };
    request.validate()?;
    backend.create_location_fulfillment_set(request).await?;

    let location = backend
        .query_stock_locations(StockLocationQuery {
            id: created.id.clone(),
        })
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SeedError::NotFound(format!("stock location {}", created.id)))?;
    info!(
        id = %location.id,
        fulfillment_sets = location.fulfillment_sets.len(),
        "provisioned stock location"
    );
    Ok(location)
}

/// Create the seller's service zone on a fulfillment set and link it to
/// the seller.
///
/// The zone's ID is obtained by listing zones of the fulfillment set after
/// creation.
pub async fn create_service_zone_for_fulfillment_set(
    backend: &dyn Backend,
    seller_id: &SellerId,
    fulfillment_set_id: &FulfillmentSetId,
) -> Result<ServiceZone, SeedError> {
    let request = CreateServiceZonesRequest {
        data: vec![CreateServiceZone {
            fulfillment_set_id: fulfillment_set_id.clone(),
            name: fixtures::SERVICE_ZONE_NAME.to_string(),
            geo_zones: seed_countries()?
                .into_iter()
                .map(|country_code| CreateGeoZone {
                    zone_type: fixtures::GEO_ZONE_TYPE.to_string(),
                    country_code,
                })
                .collect(),
        }],
    };
    request.validate()?;
    backend.create_service_zones(request).await?;

    let zone = backend
        .list_service_zones(ServiceZoneFilter {
            fulfillment_set_id: fulfillment_set_id.clone(),
        })
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            SeedError::NotFound(format!(
                "service zone for fulfillment set {}",
                fulfillment_set_id
            ))
        })?;

    link(
        backend,
        ModuleRef::seller(seller_id),
        ModuleRef::service_zone(&zone.id),
    )
    .await?;
    info!(id = %zone.id, seller = %seller_id, "created service zone");
    Ok(zone)
}

/// Create the seller's flat-rate shipping option and link it to the seller.
pub async fn create_seller_shipping_option(
    backend: &dyn Backend,
    seller: &Seller,
    region_id: &RegionId,
    service_zone_id: &ServiceZoneId,
) -> Result<ShippingOption, SeedError> {
    let profile = backend
        .query_seller_shipping_profiles(SellerShippingProfileQuery {
            seller_id: seller.id.clone(),
        })
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SeedError::NotFound(format!("shipping profile of seller {}", seller.id)))?;

    let currency = CurrencyCode::new(fixtures::REGION_CURRENCY)
        .map_err(|e| ValidationError::new("fixtures", "region currency", e.to_string()))?;
    let name = shipping_option_name(&seller.name);
    let request = CreateShippingOptionsRequest {
        options: vec![CreateShippingOption {
            name: name.clone(),
            shipping_profile_id: profile.shipping_profile_id,
            service_zone_id: service_zone_id.clone(),
            provider_id: fixtures::FULFILLMENT_PROVIDER_ID.to_string(),
            option_type: ShippingOptionType {
                label: name,
                code: seller.name.clone(),
                description: fixtures::SHIPPING_OPTION_DESCRIPTION.to_string(),
            },
            rules: vec![
                ShippingOptionRule {
                    attribute: "enabled_in_store".to_string(),
                    operator: "eq".to_string(),
                    value: "true".to_string(),
                },
                ShippingOptionRule {
                    attribute: "is_return".to_string(),
                    operator: "eq".to_string(),
                    value: "false".to_string(),
                },
            ],
            prices: vec![
                ShippingOptionPrice {
                    currency_code: Some(currency),
                    region_id: None,
                    amount: fixtures::SHIPPING_AMOUNT,
                },
                ShippingOptionPrice {
                    currency_code: None,
                    region_id: Some(region_id.clone()),
                    amount: fixtures::SHIPPING_AMOUNT,
                },
            ],
            price_type: PriceType::Flat,
            data: serde_json::json!({ "id": fixtures::SHIPPING_OPTION_DATA_ID }),
        }],
    };
    request.validate()?;
    let option = backend
        .create_shipping_options(request)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SeedError::NotFound("created shipping option".into()))?;

    link(
        backend,
        ModuleRef::seller(&seller.id),
        ModuleRef::shipping_option(&option.id),
    )
    .await?;
    info!(id = %option.id, seller = %seller.id, "created shipping option");
    Ok(option)
}
