//! End-to-end tests of the seed pipeline against the in-memory backend.
//!
//! These tests drive the executor over the full plan and check the
//! resulting backend state: every entity the marketplace needs exists,
//! is linked, and matches the fixture data.

use std::collections::BTreeMap;
use std::sync::Arc;

use tempfile::TempDir;

use marketseed::backend::links::ModuleRef;
use marketseed::backend::memory::{FailOn, InMemoryBackend};
use marketseed::backend::{BackendError, BackendOp};
use marketseed::core::fixtures;
use marketseed::core::ops::journal::{RunJournal, RunPhase};
use marketseed::core::paths::SeedPaths;
use marketseed::core::random::StdRandom;
use marketseed::engine::{abandon, ExecuteError, Executor, RunOptions, SeedPlan, StepContext, StepId};
use marketseed::seed::SellerProfile;

// =============================================================================
// Test Fixtures
// =============================================================================

fn context(backend: &InMemoryBackend, seed: u64) -> StepContext {
    StepContext {
        backend: Arc::new(backend.clone()),
        rng: Arc::new(StdRandom::seeded(seed)),
        seller: SellerProfile::default(),
    }
}

/// Run the whole plan without a state directory.
async fn seed(backend: &InMemoryBackend, seed: u64, parallel: usize) {
    Executor::new(context(backend, seed), SeedPlan::full().unwrap())
        .with_max_parallel(parallel)
        .run(RunOptions::default())
        .await
        .unwrap();
}

/// Product title -> (category name, collection title).
fn assignment(backend: &InMemoryBackend) -> BTreeMap<String, (String, String)> {
    let categories = backend.categories();
    let collections = backend.collections();
    backend
        .products()
        .into_iter()
        .map(|product| {
            let category = categories
                .iter()
                .find(|c| c.id == product.categories[0].id)
                .unwrap()
                .name
                .clone();
            let collection = collections
                .iter()
                .find(|c| Some(&c.id) == product.collection_id.as_ref())
                .unwrap()
                .title
                .clone();
            (product.title, (category, collection))
        })
        .collect()
}

// =============================================================================
// Resulting State
// =============================================================================

#[tokio::test]
async fn store_points_at_default_channel_and_region() {
    let backend = InMemoryBackend::with_default_store();
    seed(&backend, 1, 4).await;

    let channels = backend.sales_channels();
    let regions = backend.regions();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].name, fixtures::DEFAULT_SALES_CHANNEL_NAME);
    assert_eq!(regions.len(), 1);

    let store = &backend.stores()[0];
    assert_eq!(store.default_sales_channel_id.as_ref(), Some(&channels[0].id));
    assert_eq!(store.default_region_id.as_ref(), Some(&regions[0].id));
}

#[tokio::test]
async fn region_and_tax_regions_cover_every_country() {
    let backend = InMemoryBackend::with_default_store();
    seed(&backend, 1, 4).await;

    let region = &backend.regions()[0];
    assert_eq!(region.name, fixtures::REGION_NAME);
    assert_eq!(region.currency_code.as_str(), fixtures::REGION_CURRENCY);
    assert_eq!(region.countries.len(), fixtures::COUNTRIES.len());
    assert_eq!(region.payment_providers, vec![fixtures::REGION_PAYMENT_PROVIDER]);

    let tax_regions = backend.tax_regions();
    assert_eq!(tax_regions.len(), 10);
    assert!(tax_regions
        .iter()
        .all(|t| t.provider_id.as_deref() == Some(fixtures::TAX_PROVIDER_ID)));
}

#[tokio::test]
async fn publishable_key_is_linked_to_the_channel() {
    let backend = InMemoryBackend::with_default_store();
    seed(&backend, 1, 4).await;

    let keys = backend.api_keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].title, fixtures::PUBLISHABLE_KEY_TITLE);
    assert_eq!(
        backend.api_key_channels(&keys[0].id),
        vec![backend.sales_channels()[0].id.clone()]
    );
}

#[tokio::test]
async fn seller_fulfillment_chain_is_linked() {
    let backend = InMemoryBackend::with_default_store();
    seed(&backend, 1, 4).await;

    let seller = &backend.sellers()[0];
    assert_eq!(seller.name, fixtures::SELLER_NAME);

    let location = &backend.stock_locations()[0];
    let location_links = backend.links_touching(&ModuleRef::stock_location(&location.id));
    assert_eq!(location_links.len(), 3);
    assert!(location_links
        .iter()
        .any(|l| l.touches(&ModuleRef::seller(&seller.id))));

    let zone = &backend.service_zones()[0];
    assert_eq!(zone.geo_zones.len(), fixtures::COUNTRIES.len());
    assert_eq!(
        zone.fulfillment_set_id.as_ref(),
        Some(&location.fulfillment_sets[0].id)
    );

    let option = &backend.shipping_options()[0];
    assert_eq!(option.service_zone_id, zone.id);
    assert_eq!(option.prices.len(), 2);
    assert_eq!(option.rules.len(), 2);
    assert!(backend
        .links_touching(&ModuleRef::shipping_option(&option.id))
        .iter()
        .any(|l| l.touches(&ModuleRef::seller(&seller.id))));
}

#[tokio::test]
async fn catalog_is_assigned_from_the_seeded_taxonomies() {
    let backend = InMemoryBackend::with_default_store();
    seed(&backend, 3, 4).await;

    assert_eq!(backend.categories().len(), fixtures::CATEGORY_NAMES.len());
    assert_eq!(backend.collections().len(), fixtures::COLLECTION_TITLES.len());

    let products = backend.products();
    assert_eq!(products.len(), fixtures::PRODUCT_TEMPLATES.len());
    let channel = &backend.sales_channels()[0].id;
    for product in &products {
        assert_eq!(product.categories.len(), 1);
        assert_eq!(&product.sales_channels[0].id, channel);
    }
    // Every product resolves to a listed category and collection.
    assert_eq!(assignment(&backend).len(), products.len());
}

#[tokio::test]
async fn every_inventory_item_is_stocked_at_the_seller_location() {
    let backend = InMemoryBackend::with_default_store();
    seed(&backend, 8, 4).await;

    let location = &backend.stock_locations()[0].id;
    let items = backend.inventory_items();
    let levels = backend.inventory_levels();
    assert_eq!(items.len(), fixtures::template_variant_count());
    assert_eq!(levels.len(), items.len());
    for level in &levels {
        assert_eq!(&level.location_id, location);
        assert!(
            (fixtures::MIN_STOCKED_QUANTITY..=fixtures::MAX_STOCKED_QUANTITY)
                .contains(&level.stocked_quantity)
        );
    }
}

#[tokio::test]
async fn policies_match_defaults() {
    let backend = InMemoryBackend::with_default_store();
    seed(&backend, 1, 4).await;

    let rules = backend.commission_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].reference, fixtures::COMMISSION_REFERENCE);
    assert_eq!(rules[0].rate.percentage_rate, fixtures::COMMISSION_PERCENTAGE_RATE);
    assert!(rules[0].is_active);

    let config_rules = backend.configuration_rules();
    assert_eq!(config_rules.len(), fixtures::CONFIGURATION_RULE_DEFAULTS.len());
    for (rule_type, enabled) in fixtures::CONFIGURATION_RULE_DEFAULTS {
        assert!(config_rules
            .iter()
            .any(|r| r.rule_type == rule_type && r.is_enabled == enabled));
    }
}

// =============================================================================
// Scheduling
// =============================================================================

#[tokio::test]
async fn same_seed_gives_same_catalog_in_any_schedule() {
    let sequential = InMemoryBackend::with_default_store();
    seed(&sequential, 42, 1).await;
    let parallel = InMemoryBackend::with_default_store();
    seed(&parallel, 42, 8).await;

    assert_eq!(assignment(&sequential), assignment(&parallel));
}

#[tokio::test]
async fn existing_channel_and_key_are_reused() {
    let backend = InMemoryBackend::with_default_store();
    seed(&backend, 1, 4).await;
    backend.clear_operations();

    // A second pass over the idempotent steps creates nothing new.
    let plan = SeedPlan::from_steps([StepId::SalesChannel, StepId::PublishableKey]).unwrap();
    Executor::new(context(&backend, 1), plan)
        .run(RunOptions::default())
        .await
        .unwrap();

    assert_eq!(backend.sales_channels().len(), 1);
    assert_eq!(backend.api_keys().len(), 1);
    assert!(backend.operations_of(BackendOp::CreateSalesChannels).is_empty());
    assert!(backend.operations_of(BackendOp::CreateApiKeys).is_empty());
    // The key is linked again every time.
    assert_eq!(
        backend
            .operations_of(BackendOp::LinkSalesChannelsToApiKey)
            .len(),
        1
    );
}

#[tokio::test]
async fn backend_without_store_still_seeds() {
    let backend = InMemoryBackend::new();
    let report = Executor::new(context(&backend, 1), SeedPlan::full().unwrap())
        .run(RunOptions::default())
        .await
        .unwrap();

    assert!(report.outputs.store.is_none());
    let store_step = report
        .executed
        .iter()
        .find(|e| e.step == StepId::StoreUpdate)
        .unwrap();
    assert!(store_step.ids.is_empty());
}

// =============================================================================
// Checkpoint and Resume
// =============================================================================

#[tokio::test]
async fn failed_run_resumes_without_repeating_creations() {
    let temp = TempDir::new().unwrap();
    let paths = SeedPaths::new(temp.path().join("state"));
    let backend = InMemoryBackend::with_default_store().fail_on(FailOn::Op(
        BackendOp::CreateInventoryLevels,
        BackendError::Network("connection reset".into()),
    ));
    let exec = Executor::new(context(&backend, 5), SeedPlan::full().unwrap())
        .with_state(paths.clone())
        .with_max_parallel(4);

    let err = exec.run(RunOptions::default()).await.unwrap_err();
    assert!(matches!(
        err,
        ExecuteError::Step {
            step: StepId::InventoryLevels,
            ..
        }
    ));
    let products_before = backend.products().len();

    backend.clear_fail_on();
    let report = exec.resume().await.unwrap();
    assert!(report.skipped.contains(&StepId::Products));
    assert_eq!(backend.products().len(), products_before);
    assert_eq!(backend.inventory_levels().len(), backend.inventory_items().len());
    assert_eq!(RunJournal::read(&paths).unwrap().phase, RunPhase::Committed);
}

#[tokio::test]
async fn abandon_reports_what_was_created() {
    let temp = TempDir::new().unwrap();
    let paths = SeedPaths::new(temp.path().join("state"));
    let backend = InMemoryBackend::with_default_store().fail_on(FailOn::Op(
        BackendOp::CreateSeller,
        BackendError::Rejected {
            status: 409,
            message: "email taken".into(),
        },
    ));
    let exec = Executor::new(context(&backend, 5), SeedPlan::full().unwrap())
        .with_state(paths.clone())
        .with_max_parallel(1);

    exec.run(RunOptions::default()).await.unwrap_err();
    let journal = abandon(&paths).unwrap();

    assert_eq!(journal.phase, RunPhase::Abandoned);
    let ids: Vec<&str> = journal.created_ids().into_iter().map(|(_, id)| id).collect();
    assert!(ids.contains(&backend.sales_channels()[0].id.as_str()));
    assert!(ids.contains(&backend.regions()[0].id.as_str()));
    assert!(backend.sellers().is_empty());
}
