//! backend::links
//!
//! Cross-module association records.
//!
//! A link connects two entities owned by different modules. Each side is a
//! [`ModuleRef`]: the owning module, the key the module uses for the entity,
//! and the entity's id. On the wire a link is a two-entry object:
//!
//! ```json
//! { "seller": { "seller_id": "sel_1" }, "stock_location": { "stock_location_id": "sloc_1" } }
//! ```
//!
//! Refs are only built through the typed constructors, so a link can never
//! pair a module with a key it does not own.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::core::types::{
    SalesChannelId, SellerId, ServiceZoneId, ShippingOptionId, StockLocationId,
};

/// Modules that take part in seeded links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Module {
    Seller,
    StockLocation,
    Fulfillment,
    SalesChannel,
}

impl Module {
    /// The module's registration key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Seller => "seller",
            Module::StockLocation => "stock_location",
            Module::Fulfillment => "fulfillment",
            Module::SalesChannel => "sales_channel",
        }
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One side of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleRef {
    module: Module,
    key: &'static str,
    id: String,
}

impl ModuleRef {
    pub fn seller(id: &SellerId) -> Self {
        Self::new(Module::Seller, "seller_id", id.as_str())
    }

    pub fn stock_location(id: &StockLocationId) -> Self {
        Self::new(Module::StockLocation, "stock_location_id", id.as_str())
    }

    pub fn sales_channel(id: &SalesChannelId) -> Self {
        Self::new(Module::SalesChannel, "sales_channel_id", id.as_str())
    }

    /// Fulfillment providers are registered by id, not created by the pipeline.
    pub fn fulfillment_provider(provider_id: &str) -> Self {
        Self::new(Module::Fulfillment, "fulfillment_provider_id", provider_id)
    }

    pub fn service_zone(id: &ServiceZoneId) -> Self {
        Self::new(Module::Fulfillment, "service_zone_id", id.as_str())
    }

    pub fn shipping_option(id: &ShippingOptionId) -> Self {
        Self::new(Module::Fulfillment, "shipping_option_id", id.as_str())
    }

    fn new(module: Module, key: &'static str, id: &str) -> Self {
        Self {
            module,
            key,
            id: id.to_string(),
        }
    }

    pub fn module(&self) -> Module {
        self.module
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}={}", self.module, self.key, self.id)
    }
}

/// An association between two module-scoped entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkDefinition {
    pub from: ModuleRef,
    pub to: ModuleRef,
}

impl LinkDefinition {
    pub fn new(from: ModuleRef, to: ModuleRef) -> Self {
        Self { from, to }
    }

    /// Whether either side of the link is `entity`.
    pub fn touches(&self, entity: &ModuleRef) -> bool {
        &self.from == entity || &self.to == entity
    }
}

impl std::fmt::Display for LinkDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.from, self.to)
    }
}

struct KeyedId<'a>(&'a ModuleRef);

impl Serialize for KeyedId<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0.key, &self.0.id)?;
        map.end()
    }
}

impl Serialize for LinkDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.from.module.as_str(), &KeyedId(&self.from))?;
        map.serialize_entry(self.to.module.as_str(), &KeyedId(&self.to))?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_module_keyed_object() {
        let link = LinkDefinition::new(
            ModuleRef::seller(&SellerId::new("sel_1").unwrap()),
            ModuleRef::stock_location(&StockLocationId::new("sloc_1").unwrap()),
        );

        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "seller": { "seller_id": "sel_1" },
                "stock_location": { "stock_location_id": "sloc_1" }
            })
        );
    }

    #[test]
    fn fulfillment_refs_use_distinct_keys() {
        let provider = ModuleRef::fulfillment_provider("manual_manual");
        let zone = ModuleRef::service_zone(&ServiceZoneId::new("serzo_1").unwrap());
        assert_eq!(provider.module(), zone.module());
        assert_ne!(provider.key(), zone.key());
    }

    #[test]
    fn touches_either_side() {
        let seller = ModuleRef::seller(&SellerId::new("sel_1").unwrap());
        let option = ModuleRef::shipping_option(&ShippingOptionId::new("so_1").unwrap());
        let link = LinkDefinition::new(seller.clone(), option.clone());
        assert!(link.touches(&seller));
        assert!(link.touches(&option));
        assert!(!link.touches(&ModuleRef::fulfillment_provider("manual_manual")));
    }

    #[test]
    fn display_is_readable() {
        let link = LinkDefinition::new(
            ModuleRef::sales_channel(&SalesChannelId::new("sc_1").unwrap()),
            ModuleRef::stock_location(&StockLocationId::new("sloc_1").unwrap()),
        );
        assert_eq!(
            link.to_string(),
            "sales_channel.sales_channel_id=sc_1 <-> stock_location.stock_location_id=sloc_1"
        );
    }
}
