//! seed::catalog
//!
//! Catalog populator: seller products and their stock levels.
//!
//! Category and collection assignment and stocked quantities are drawn
//! from an injected [`RandomSource`], so a seeded source reproduces the
//! same catalog.

use std::collections::BTreeMap;

use tracing::info;

use crate::backend::model::{IdRef, InventoryLevel, Product, ProductCategory, ProductCollection};
use crate::backend::requests::{
    CreateInventoryLevel, CreateInventoryLevelsRequest, CreateProduct, CreateProductOption,
    CreateProductVariant, CreateProductsRequest, CreateVariantPrice, ProductAdditionalData,
    Validate, ValidationError,
};
use crate::backend::Backend;
use crate::core::fixtures::{self, ProductTemplate};
use crate::core::random::{pick, RandomSource};
use crate::core::types::{CurrencyCode, SalesChannelId, SellerId, StockLocationId};

use super::SeedError;

/// Build a product payload from a template and its assigned taxonomy.
pub fn build_product(
    template: &ProductTemplate,
    category: &ProductCategory,
    collection: &ProductCollection,
    sales_channel_id: &SalesChannelId,
) -> Result<CreateProduct, SeedError> {
    let variants = template
        .variants
        .iter()
        .map(|variant| -> Result<CreateProductVariant, ValidationError> {
            let prices = variant
                .prices
                .iter()
                .map(|(currency, amount)| {
                    CurrencyCode::new(*currency)
                        .map(|currency_code| CreateVariantPrice {
                            currency_code,
                            amount: *amount,
                        })
                        .map_err(|e| {
                            ValidationError::new("product template", variant.sku, e.to_string())
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CreateProductVariant {
                title: variant.title.to_string(),
                sku: variant.sku.to_string(),
                manage_inventory: true,
                options: variant
                    .options
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
                prices,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(CreateProduct {
        title: template.title.to_string(),
        handle: template.handle.to_string(),
        description: template.description.to_string(),
        status: fixtures::PRODUCT_STATUS.to_string(),
        thumbnail: template.thumbnail.map(str::to_string),
        options: template
            .options
            .iter()
            .map(|o| CreateProductOption {
                title: o.title.to_string(),
                values: o.values.iter().map(|v| v.to_string()).collect(),
            })
            .collect(),
        variants,
        categories: vec![IdRef::new(category.id.clone())],
        collection_id: collection.id.clone(),
        sales_channels: vec![IdRef::new(sales_channel_id.clone())],
    })
}

/// Create the seed catalog for a seller.
///
/// Every template gets one category and one collection chosen uniformly
/// from what the backend currently lists. All products go out in a single
/// call carrying the seller ID as additional data.
///
/// # Errors
///
/// `SeedError::EmptyPool` if there are no categories or no collections.
pub async fn create_seller_products(
    backend: &dyn Backend,
    rng: &dyn RandomSource,
    seller_id: &SellerId,
    sales_channel_id: &SalesChannelId,
) -> Result<Vec<Product>, SeedError> {
    let collections = backend.list_collections().await?;
    let categories = backend.list_product_categories().await?;
    if categories.is_empty() {
        return Err(SeedError::EmptyPool("product categories"));
    }
    if collections.is_empty() {
        return Err(SeedError::EmptyPool("product collections"));
    }

    let mut products = Vec::with_capacity(fixtures::PRODUCT_TEMPLATES.len());
    for template in &fixtures::PRODUCT_TEMPLATES {
        let category =
            pick(rng, &categories).ok_or(SeedError::EmptyPool("product categories"))?;
        let collection =
            pick(rng, &collections).ok_or(SeedError::EmptyPool("product collections"))?;
        products.push(build_product(template, category, collection, sales_channel_id)?);
    }

    let request = CreateProductsRequest {
        products,
        additional_data: ProductAdditionalData {
            seller_id: seller_id.clone(),
        },
    };
    request.validate()?;
    let created = backend.create_products(request).await?;
    info!(count = created.len(), seller = %seller_id, "created products");
    Ok(created)
}

/// Stock every inventory item on the platform at a location.
///
/// Quantities are uniform in
/// [`MIN_STOCKED_QUANTITY`](fixtures::MIN_STOCKED_QUANTITY)..=[`MAX_STOCKED_QUANTITY`](fixtures::MAX_STOCKED_QUANTITY).
/// With no inventory items the bulk create is still issued, with an empty
/// list.
pub async fn create_inventory_item_stock_levels(
    backend: &dyn Backend,
    rng: &dyn RandomSource,
    stock_location_id: &StockLocationId,
) -> Result<Vec<InventoryLevel>, SeedError> {
    let items = backend.list_inventory_items().await?;
    let request = CreateInventoryLevelsRequest {
        inventory_levels: items
            .into_iter()
            .map(|item| CreateInventoryLevel {
                inventory_item_id: item.id,
                location_id: stock_location_id.clone(),
                stocked_quantity: rng
                    .in_range(fixtures::MIN_STOCKED_QUANTITY, fixtures::MAX_STOCKED_QUANTITY),
            })
            .collect(),
    };
    request.validate()?;
    let levels = backend.create_inventory_levels(request).await?;
    info!(count = levels.len(), location = %stock_location_id, "created inventory levels");
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use crate::backend::BackendOp;
    use crate::core::random::{SequenceRandom, StdRandom};
    use crate::seed::entities::{
        create_product_categories, create_product_collections, create_seller, ensure_sales_channel,
    };
    use crate::seed::provision::create_seller_stock_location;
    use crate::seed::SellerProfile;

    struct Fixture {
        backend: InMemoryBackend,
        seller_id: SellerId,
        sales_channel_id: SalesChannelId,
        location_id: StockLocationId,
    }

    async fn fixture(with_taxonomies: bool) -> Fixture {
        let backend = InMemoryBackend::with_default_store();
        let channel = ensure_sales_channel(&backend).await.unwrap();
        let seller = create_seller(&backend, &SellerProfile::default())
            .await
            .unwrap();
        let location = create_seller_stock_location(&backend, &seller, &channel.id)
            .await
            .unwrap();
        if with_taxonomies {
            create_product_categories(&backend).await.unwrap();
            create_product_collections(&backend).await.unwrap();
        }
        Fixture {
            backend,
            seller_id: seller.id,
            sales_channel_id: channel.id,
            location_id: location.id,
        }
    }

    #[tokio::test]
    async fn products_draw_from_listed_pools() {
        let f = fixture(true).await;
        let rng = StdRandom::seeded(11);
        let products = create_seller_products(&f.backend, &rng, &f.seller_id, &f.sales_channel_id)
            .await
            .unwrap();

        assert_eq!(products.len(), fixtures::PRODUCT_TEMPLATES.len());
        let categories = f.backend.categories();
        let collections = f.backend.collections();
        for product in &products {
            assert_eq!(product.categories.len(), 1);
            assert!(categories.iter().any(|c| c.id == product.categories[0].id));
            let collection_id = product.collection_id.as_ref().unwrap();
            assert!(collections.iter().any(|c| &c.id == collection_id));
            assert_eq!(product.sales_channels[0].id, f.sales_channel_id);
        }

        let ops = f.backend.operations_of(BackendOp::CreateProducts);
        assert_eq!(ops.len(), 1);
        assert_eq!(
            ops[0].payload["additional_data"]["seller_id"],
            f.seller_id.as_str()
        );
    }

    #[tokio::test]
    async fn sequence_source_fixes_assignment() {
        let f = fixture(true).await;
        // Category and collection picks alternate; zero always selects the first.
        let rng = SequenceRandom::new(vec![0]);
        let products = create_seller_products(&f.backend, &rng, &f.seller_id, &f.sales_channel_id)
            .await
            .unwrap();

        let first_category = &f.backend.categories()[0].id;
        let first_collection = &f.backend.collections()[0].id;
        assert!(products.iter().all(|p| &p.categories[0].id == first_category));
        assert!(products
            .iter()
            .all(|p| p.collection_id.as_ref() == Some(first_collection)));
    }

    #[tokio::test]
    async fn empty_pools_are_typed_errors() {
        let f = fixture(false).await;
        let rng = StdRandom::seeded(1);
        let err = create_seller_products(&f.backend, &rng, &f.seller_id, &f.sales_channel_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::EmptyPool("product categories")));
        assert!(f.backend.operations_of(BackendOp::CreateProducts).is_empty());
    }

    #[tokio::test]
    async fn one_level_per_item_within_bounds() {
        let f = fixture(true).await;
        let rng = StdRandom::seeded(5);
        create_seller_products(&f.backend, &rng, &f.seller_id, &f.sales_channel_id)
            .await
            .unwrap();

        let levels = create_inventory_item_stock_levels(&f.backend, &rng, &f.location_id)
            .await
            .unwrap();

        let items = f.backend.inventory_items();
        assert_eq!(items.len(), fixtures::template_variant_count());
        assert_eq!(levels.len(), items.len());
        for level in &levels {
            assert_eq!(level.location_id, f.location_id);
            assert!((1..=50).contains(&level.stocked_quantity));
        }
    }

    #[tokio::test]
    async fn items_outside_the_catalog_are_stocked_too() {
        let f = fixture(true).await;
        f.backend.insert_inventory_items(&["LOOSE-1", "LOOSE-2"]).unwrap();
        let rng = SequenceRandom::new(vec![49]);

        let levels = create_inventory_item_stock_levels(&f.backend, &rng, &f.location_id)
            .await
            .unwrap();
        assert_eq!(levels.len(), 2);
        assert!(levels.iter().all(|l| l.stocked_quantity == 50));
    }

    #[tokio::test]
    async fn no_items_still_issues_empty_bulk_create() {
        let f = fixture(true).await;
        let rng = StdRandom::seeded(1);
        let levels = create_inventory_item_stock_levels(&f.backend, &rng, &f.location_id)
            .await
            .unwrap();
        assert!(levels.is_empty());
        assert_eq!(
            f.backend
                .operations_of(BackendOp::CreateInventoryLevels)
                .len(),
            1
        );
    }

    #[test]
    fn build_product_carries_template_and_assignment() {
        let category = ProductCategory {
            id: crate::core::types::CategoryId::new("pcat_1").unwrap(),
            name: "Boots".into(),
            is_active: true,
        };
        let collection = ProductCollection {
            id: crate::core::types::CollectionId::new("pcol_1").unwrap(),
            title: "Luxury".into(),
        };
        let channel = SalesChannelId::new("sc_1").unwrap();
        let product =
            build_product(&fixtures::PRODUCT_TEMPLATES[2], &category, &collection, &channel)
                .unwrap();

        assert_eq!(product.handle, "leather-chelsea-boot");
        assert_eq!(product.categories[0].id, category.id);
        assert_eq!(product.collection_id, collection.id);
        assert_eq!(product.variants.len(), 2);
        assert!(product.variants.iter().all(|v| v.manage_inventory));
        assert_eq!(product.variants[0].options["Size"], "42");
    }
}
