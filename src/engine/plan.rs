//! engine::plan
//!
//! The seed plan: the fixed set of steps and their data dependencies.
//!
//! # Steps
//!
//! | Step | Consumes |
//! |------|----------|
//! | `sales_channel` | |
//! | `region` | |
//! | `store_update` | sales channel, region |
//! | `publishable_key` | sales channel |
//! | `seller` | |
//! | `stock_location` | seller, sales channel |
//! | `service_zone` | stock location, seller |
//! | `shipping_option` | service zone, region, seller |
//! | `categories` | |
//! | `collections` | |
//! | `products` | seller, sales channel, categories, collections |
//! | `inventory_levels` | products, stock location |
//! | `commission_rule` | |
//! | `configuration_rules` | |
//!
//! Declaration order of [`StepId`] is the reference order, which is itself
//! a valid sequential schedule.
//!
//! # Digest
//!
//! The plan digest is a SHA-256 over the steps and their dependencies. A
//! journal records the digest of the plan that produced it; resuming under
//! a different plan is refused.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::graph::{GraphError, StepGraph};

/// One seed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    SalesChannel,
    Region,
    StoreUpdate,
    PublishableKey,
    Seller,
    StockLocation,
    ServiceZone,
    ShippingOption,
    Categories,
    Collections,
    Products,
    InventoryLevels,
    CommissionRule,
    ConfigurationRules,
}

impl StepId {
    /// All steps in reference order.
    pub const ALL: [StepId; 14] = [
        StepId::SalesChannel,
        StepId::Region,
        StepId::StoreUpdate,
        StepId::PublishableKey,
        StepId::Seller,
        StepId::StockLocation,
        StepId::ServiceZone,
        StepId::ShippingOption,
        StepId::Categories,
        StepId::Collections,
        StepId::Products,
        StepId::InventoryLevels,
        StepId::CommissionRule,
        StepId::ConfigurationRules,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StepId::SalesChannel => "sales_channel",
            StepId::Region => "region",
            StepId::StoreUpdate => "store_update",
            StepId::PublishableKey => "publishable_key",
            StepId::Seller => "seller",
            StepId::StockLocation => "stock_location",
            StepId::ServiceZone => "service_zone",
            StepId::ShippingOption => "shipping_option",
            StepId::Categories => "categories",
            StepId::Collections => "collections",
            StepId::Products => "products",
            StepId::InventoryLevels => "inventory_levels",
            StepId::CommissionRule => "commission_rule",
            StepId::ConfigurationRules => "configuration_rules",
        }
    }

    /// Parse a step from its name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.name() == s)
    }

    /// One-line description for plan and status output.
    pub fn description(&self) -> &'static str {
        match self {
            StepId::SalesChannel => "ensure the default sales channel",
            StepId::Region => "create the Europe region and its tax regions",
            StepId::StoreUpdate => "point the store at the default channel and region",
            StepId::PublishableKey => "ensure the publishable key and link it to the channel",
            StepId::Seller => "register the seller identity and create the seller",
            StepId::StockLocation => "create and link the seller stock location",
            StepId::ServiceZone => "create the seller service zone",
            StepId::ShippingOption => "create the seller shipping option",
            StepId::Categories => "create product categories",
            StepId::Collections => "create product collections",
            StepId::Products => "create the seller catalog",
            StepId::InventoryLevels => "stock inventory items at the seller location",
            StepId::CommissionRule => "create the default commission rule",
            StepId::ConfigurationRules => "create configuration rule defaults",
        }
    }

    /// Steps whose outputs this step consumes.
    pub fn dependencies(&self) -> &'static [StepId] {
        match self {
            StepId::StoreUpdate => &[StepId::SalesChannel, StepId::Region],
            StepId::PublishableKey => &[StepId::SalesChannel],
            StepId::StockLocation => &[StepId::Seller, StepId::SalesChannel],
            StepId::ServiceZone => &[StepId::StockLocation, StepId::Seller],
            StepId::ShippingOption => &[StepId::ServiceZone, StepId::Region, StepId::Seller],
            StepId::Products => &[
                StepId::Seller,
                StepId::SalesChannel,
                StepId::Categories,
                StepId::Collections,
            ],
            StepId::InventoryLevels => &[StepId::Products, StepId::StockLocation],
            StepId::SalesChannel
            | StepId::Region
            | StepId::Seller
            | StepId::Categories
            | StepId::Collections
            | StepId::CommissionRule
            | StepId::ConfigurationRules => &[],
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A validated set of steps with their dependency graph.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    graph: StepGraph,
}

impl SeedPlan {
    /// The full seed plan.
    pub fn full() -> Result<Self, GraphError> {
        Self::from_steps(StepId::ALL)
    }

    /// A plan over the given steps. Every dependency must be included.
    pub fn from_steps(steps: impl IntoIterator<Item = StepId>) -> Result<Self, GraphError> {
        let mut graph = StepGraph::new();
        for step in steps {
            graph.add_node(step);
            for dependency in step.dependencies() {
                graph.add_edge(step, *dependency);
            }
        }
        graph.validate()?;
        Ok(Self { graph })
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn contains(&self, step: StepId) -> bool {
        self.graph.contains(step)
    }

    /// Dependency layers for concurrent scheduling.
    pub fn layers(&self) -> Result<Vec<Vec<StepId>>, GraphError> {
        self.graph.layers()
    }

    /// The sequential schedule.
    pub fn sequential_order(&self) -> Result<Vec<StepId>, GraphError> {
        self.graph.topological_order()
    }

    /// Steps not yet in `completed`, in sequential order.
    pub fn remaining(&self, completed: &BTreeSet<StepId>) -> Result<Vec<StepId>, GraphError> {
        Ok(self
            .sequential_order()?
            .into_iter()
            .filter(|step| !completed.contains(step))
            .collect())
    }

    /// Content digest of the plan, `sha256:<hex>`.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for step in self.graph.steps() {
            hasher.update(step.name().as_bytes());
            hasher.update(b":");
            let deps: Vec<&str> = self.graph.dependencies(step).map(|d| d.name()).collect();
            hasher.update(deps.join(",").as_bytes());
            hasher.update(b"\n");
        }
        format!("sha256:{}", hex::encode(hasher.finalize()))
    }
}
