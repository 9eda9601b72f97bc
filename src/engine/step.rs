//! engine::step
//!
//! Dispatch from [`StepId`] to the seed functions.
//!
//! A step reads the outputs of its dependencies from a [`SeedOutputs`]
//! snapshot and returns a [`StepOutput`]. The executor merges that output
//! into the shared outputs with [`SeedOutputs::apply`] once the step has
//! finished, so steps never write shared state.

use std::sync::Arc;

use crate::backend::model::{
    ApiKey, CommissionRule, ConfigurationRule, InventoryLevel, Product, ProductCategory,
    ProductCollection, SalesChannel, Seller, ServiceZone, ShippingOption, StockLocation, Store,
};
use crate::backend::Backend;
use crate::core::random::RandomSource;
use crate::seed::entities::SeededRegion;
use crate::seed::{catalog, entities, policy, provision, SeedError, SeedOutputs, SellerProfile};

use super::plan::StepId;

/// What a step needs besides its dependencies' outputs.
#[derive(Clone)]
pub struct StepContext {
    pub backend: Arc<dyn Backend>,
    pub rng: Arc<dyn RandomSource>,
    pub seller: SellerProfile,
}

impl std::fmt::Debug for StepContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepContext")
            .field("backend", &self.backend.name())
            .field("rng", &self.rng)
            .field("seller", &self.seller)
            .finish()
    }
}

/// The result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    SalesChannel(SalesChannel),
    Region(SeededRegion),
    /// `None` when there was no store to update.
    StoreUpdate(Option<Store>),
    PublishableKey(ApiKey),
    Seller(Seller),
    StockLocation(StockLocation),
    ServiceZone(ServiceZone),
    ShippingOption(ShippingOption),
    Categories(Vec<ProductCategory>),
    Collections(Vec<ProductCollection>),
    Products(Vec<Product>),
    InventoryLevels(Vec<InventoryLevel>),
    CommissionRule(CommissionRule),
    ConfigurationRules(Vec<ConfigurationRule>),
}

impl StepOutput {
    pub fn step(&self) -> StepId {
        match self {
            StepOutput::SalesChannel(_) => StepId::SalesChannel,
            StepOutput::Region(_) => StepId::Region,
            StepOutput::StoreUpdate(_) => StepId::StoreUpdate,
            StepOutput::PublishableKey(_) => StepId::PublishableKey,
            StepOutput::Seller(_) => StepId::Seller,
            StepOutput::StockLocation(_) => StepId::StockLocation,
            StepOutput::ServiceZone(_) => StepId::ServiceZone,
            StepOutput::ShippingOption(_) => StepId::ShippingOption,
            StepOutput::Categories(_) => StepId::Categories,
            StepOutput::Collections(_) => StepId::Collections,
            StepOutput::Products(_) => StepId::Products,
            StepOutput::InventoryLevels(_) => StepId::InventoryLevels,
            StepOutput::CommissionRule(_) => StepId::CommissionRule,
            StepOutput::ConfigurationRules(_) => StepId::ConfigurationRules,
        }
    }

    /// IDs of the entities the step created or updated.
    pub fn ids(&self) -> Vec<String> {
        fn strs<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
            ids.into_iter().map(str::to_string).collect()
        }

        match self {
            StepOutput::SalesChannel(c) => strs([c.id.as_str()]),
            StepOutput::Region(r) => strs(
                std::iter::once(r.region.id.as_str())
                    .chain(r.tax_regions.iter().map(|t| t.id.as_str())),
            ),
            StepOutput::StoreUpdate(store) => strs(store.iter().map(|s| s.id.as_str())),
            StepOutput::PublishableKey(k) => strs([k.id.as_str()]),
            StepOutput::Seller(s) => strs([s.id.as_str()]),
            StepOutput::StockLocation(l) => strs(
                std::iter::once(l.id.as_str())
                    .chain(l.fulfillment_sets.iter().map(|f| f.id.as_str())),
            ),
            StepOutput::ServiceZone(z) => strs([z.id.as_str()]),
            StepOutput::ShippingOption(o) => strs([o.id.as_str()]),
            StepOutput::Categories(c) => strs(c.iter().map(|c| c.id.as_str())),
            StepOutput::Collections(c) => strs(c.iter().map(|c| c.id.as_str())),
            StepOutput::Products(p) => strs(p.iter().map(|p| p.id.as_str())),
            StepOutput::InventoryLevels(l) => strs(l.iter().map(|l| l.id.as_str())),
            StepOutput::CommissionRule(r) => strs([r.id.as_str()]),
            StepOutput::ConfigurationRules(r) => strs(r.iter().map(|r| r.id.as_str())),
        }
    }
}

impl SeedOutputs {
    /// Merge a step's output.
    pub fn apply(&mut self, output: StepOutput) {
        match output {
            StepOutput::SalesChannel(c) => self.sales_channel = Some(c),
            StepOutput::Region(r) => {
                self.region = Some(r.region);
                self.tax_regions = r.tax_regions;
            }
            StepOutput::StoreUpdate(s) => self.store = s,
            StepOutput::PublishableKey(k) => self.publishable_key = Some(k),
            StepOutput::Seller(s) => self.seller = Some(s),
            StepOutput::StockLocation(l) => self.stock_location = Some(l),
            StepOutput::ServiceZone(z) => self.service_zone = Some(z),
            StepOutput::ShippingOption(o) => self.shipping_option = Some(o),
            StepOutput::Categories(c) => self.categories = c,
            StepOutput::Collections(c) => self.collections = c,
            StepOutput::Products(p) => self.products = p,
            StepOutput::InventoryLevels(l) => self.inventory_levels = l,
            StepOutput::CommissionRule(r) => self.commission_rule = Some(r),
            StepOutput::ConfigurationRules(r) => self.configuration_rules = r,
        }
    }
}

/// Run one step against the outputs of the steps before it.
///
/// # Errors
///
/// `SeedError::MissingOutput` if a dependency's output is absent, otherwise
/// whatever the seed function returns.
pub async fn run_step(
    step: StepId,
    ctx: &StepContext,
    outputs: &SeedOutputs,
) -> Result<StepOutput, SeedError> {
    let backend = ctx.backend.as_ref();
    let rng = ctx.rng.as_ref();

    let output = match step {
        StepId::SalesChannel => {
            StepOutput::SalesChannel(entities::ensure_sales_channel(backend).await?)
        }
        StepId::Region => StepOutput::Region(entities::create_regions(backend).await?),
        StepId::StoreUpdate => StepOutput::StoreUpdate(
            entities::update_default_store(
                backend,
                &outputs.require_sales_channel()?.id,
                &outputs.require_region()?.id,
            )
            .await?,
        ),
        StepId::PublishableKey => StepOutput::PublishableKey(
            entities::ensure_publishable_key(backend, &outputs.require_sales_channel()?.id)
                .await?,
        ),
        StepId::Seller => StepOutput::Seller(entities::create_seller(backend, &ctx.seller).await?),
        StepId::StockLocation => StepOutput::StockLocation(
            provision::create_seller_stock_location(
                backend,
                outputs.require_seller()?,
                &outputs.require_sales_channel()?.id,
            )
            .await?,
        ),
        StepId::ServiceZone => StepOutput::ServiceZone(
            provision::create_service_zone_for_fulfillment_set(
                backend,
                &outputs.require_seller()?.id,
                outputs.require_fulfillment_set_id()?,
            )
            .await?,
        ),
        StepId::ShippingOption => StepOutput::ShippingOption(
            provision::create_seller_shipping_option(
                backend,
                outputs.require_seller()?,
                &outputs.require_region()?.id,
                &outputs.require_service_zone()?.id,
            )
            .await?,
        ),
        StepId::Categories => {
            StepOutput::Categories(entities::create_product_categories(backend).await?)
        }
        StepId::Collections => {
            StepOutput::Collections(entities::create_product_collections(backend).await?)
        }
        StepId::Products => StepOutput::Products(
            catalog::create_seller_products(
                backend,
                rng,
                &outputs.require_seller()?.id,
                &outputs.require_sales_channel()?.id,
            )
            .await?,
        ),
        StepId::InventoryLevels => StepOutput::InventoryLevels(
            catalog::create_inventory_item_stock_levels(
                backend,
                rng,
                &outputs.require_stock_location()?.id,
            )
            .await?,
        ),
        StepId::CommissionRule => {
            StepOutput::CommissionRule(policy::create_default_commission_rule(backend).await?)
        }
        StepId::ConfigurationRules => {
            StepOutput::ConfigurationRules(policy::create_configuration_rules(backend).await?)
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use crate::core::random::StdRandom;

    fn context(backend: &InMemoryBackend) -> StepContext {
        StepContext {
            backend: Arc::new(backend.clone()),
            rng: Arc::new(StdRandom::seeded(3)),
            seller: SellerProfile::default(),
        }
    }

    #[tokio::test]
    async fn missing_dependency_is_reported_before_any_call() {
        let backend = InMemoryBackend::with_default_store();
        let ctx = context(&backend);

        let err = run_step(StepId::StoreUpdate, &ctx, &SeedOutputs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::MissingOutput("sales channel")));
        assert!(backend.operations().is_empty());
    }

    #[tokio::test]
    async fn outputs_flow_between_steps() {
        let backend = InMemoryBackend::with_default_store();
        let ctx = context(&backend);
        let mut outputs = SeedOutputs::default();

        for step in [StepId::SalesChannel, StepId::Region, StepId::StoreUpdate] {
            let output = run_step(step, &ctx, &outputs).await.unwrap();
            assert_eq!(output.step(), step);
            outputs.apply(output);
        }

        let store = outputs.store.as_ref().unwrap();
        assert_eq!(
            store.default_sales_channel_id.as_ref(),
            Some(&outputs.sales_channel.as_ref().unwrap().id)
        );
        assert_eq!(outputs.tax_regions.len(), 10);
    }

    #[tokio::test]
    async fn region_ids_include_tax_regions() {
        let backend = InMemoryBackend::new();
        let ctx = context(&backend);

        let output = run_step(StepId::Region, &ctx, &SeedOutputs::default())
            .await
            .unwrap();
        assert_eq!(output.ids().len(), 11);
    }

    #[tokio::test]
    async fn skipped_store_update_records_no_ids() {
        let backend = InMemoryBackend::new();
        let ctx = context(&backend);
        let mut outputs = SeedOutputs::default();
        for step in [StepId::SalesChannel, StepId::Region] {
            outputs.apply(run_step(step, &ctx, &outputs).await.unwrap());
        }

        let output = run_step(StepId::StoreUpdate, &ctx, &outputs).await.unwrap();
        assert_eq!(output, StepOutput::StoreUpdate(None));
        assert!(output.ids().is_empty());
    }
}
