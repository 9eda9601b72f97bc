//! core::fixtures
//!
//! Fixed literal seed data.
//!
//! Everything the pipeline creates from literals lives here: the region's
//! country list, provider IDs, category and collection names, the product
//! templates and the configuration-rule default table. Steps never embed
//! these values inline.

use serde::{Deserialize, Serialize};

/// Countries covered by the default region, its tax regions and the
/// seller's service zone.
pub const COUNTRIES: [&str; 10] = ["be", "de", "dk", "se", "fr", "es", "it", "pl", "cz", "nl"];

/// Name of the default sales channel (its natural key).
pub const DEFAULT_SALES_CHANNEL_NAME: &str = "Default Sales Channel";

/// Default region.
pub const REGION_NAME: &str = "Europe";
pub const REGION_CURRENCY: &str = "eur";
pub const REGION_PAYMENT_PROVIDER: &str = "pp_system_default";

/// Tax provider every seeded tax region is bound to.
pub const TAX_PROVIDER_ID: &str = "tp_system";

/// Publishable API key.
pub const PUBLISHABLE_KEY_TITLE: &str = "Default publishable key";
pub const PUBLISHABLE_KEY_TYPE: &str = "publishable";

/// Fulfillment provider linked to every seller stock location and used by
/// shipping options.
pub const FULFILLMENT_PROVIDER_ID: &str = "manual_manual";

/// Provider data attached to seeded shipping options.
pub const SHIPPING_OPTION_DATA_ID: &str = "manual-fulfillment";

/// Flat shipping amount, both for the `eur` price and the region price.
pub const SHIPPING_AMOUNT: u64 = 10;

/// Auth provider used to register the seller's identity.
pub const SELLER_AUTH_PROVIDER: &str = "emailpass";

/// Default seller profile, overridable through `[seller]` config.
pub const SELLER_NAME: &str = "MercurJS Store";
pub const SELLER_EMAIL: &str = "seller@mercurjs.com";
pub const SELLER_PASSWORD: &str = "secret";
pub const SELLER_MEMBER_NAME: &str = "John Doe";

/// Service zone name and the geo zone type of its entries.
pub const SERVICE_ZONE_NAME: &str = "Europe";
pub const GEO_ZONE_TYPE: &str = "country";

/// Type of the fulfillment set created for each seller location.
pub const FULFILLMENT_SET_TYPE: &str = "shipping";

pub const SHIPPING_OPTION_DESCRIPTION: &str = "Europe shipping";

/// Status given to seeded products.
pub const PRODUCT_STATUS: &str = "published";

/// Commission rate type.
pub const COMMISSION_RATE_TYPE: &str = "percentage";

/// Stock location address.
pub const STOCK_LOCATION_ADDRESS_1: &str = "Random Strasse";
pub const STOCK_LOCATION_CITY: &str = "Berlin";
pub const STOCK_LOCATION_COUNTRY: &str = "de";

/// Inclusive bounds for seeded stocked quantities.
pub const MIN_STOCKED_QUANTITY: u32 = 1;
pub const MAX_STOCKED_QUANTITY: u32 = 50;

/// Default commission rule.
pub const COMMISSION_RULE_NAME: &str = "default";
pub const COMMISSION_REFERENCE: &str = "site";
pub const COMMISSION_PERCENTAGE_RATE: u32 = 2;

/// Seeded product categories (all active).
pub const CATEGORY_NAMES: [&str; 6] = ["Sneakers", "Sandals", "Boots", "Sport", "Accessories", "Tops"];

/// Seeded product collections.
pub const COLLECTION_TITLES: [&str; 6] = ["Luxury", "Vintage", "Casual", "Soho", "Streetwear", "Y2K"];

/// Marketplace behaviour flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationRuleType {
    /// Sellers share one product catalog.
    GlobalProductCatalog,
    /// New seller products require admin approval.
    RequireProductApproval,
    /// Sellers may request new products.
    ProductRequestEnabled,
    /// Sellers may import products in bulk.
    ProductImportEnabled,
}

impl ConfigurationRuleType {
    /// The wire name of the rule type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigurationRuleType::GlobalProductCatalog => "global_product_catalog",
            ConfigurationRuleType::RequireProductApproval => "require_product_approval",
            ConfigurationRuleType::ProductRequestEnabled => "product_request_enabled",
            ConfigurationRuleType::ProductImportEnabled => "product_import_enabled",
        }
    }
}

impl std::fmt::Display for ConfigurationRuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default enabled state for every configuration rule, in creation order.
pub const CONFIGURATION_RULE_DEFAULTS: [(ConfigurationRuleType, bool); 4] = [
    (ConfigurationRuleType::GlobalProductCatalog, false),
    (ConfigurationRuleType::RequireProductApproval, false),
    (ConfigurationRuleType::ProductRequestEnabled, true),
    (ConfigurationRuleType::ProductImportEnabled, true),
];

/// A product option and its allowed values.
#[derive(Debug, Clone, Copy)]
pub struct OptionTemplate {
    pub title: &'static str,
    pub values: &'static [&'static str],
}

/// A product variant: its option values and prices (currency, amount).
#[derive(Debug, Clone, Copy)]
pub struct VariantTemplate {
    pub title: &'static str,
    pub sku: &'static str,
    pub options: &'static [(&'static str, &'static str)],
    pub prices: &'static [(&'static str, u64)],
}

/// A seed catalog entry. Category, collection and sales channel are
/// assigned when the product is created.
#[derive(Debug, Clone, Copy)]
pub struct ProductTemplate {
    pub title: &'static str,
    pub handle: &'static str,
    pub description: &'static str,
    pub thumbnail: Option<&'static str>,
    pub options: &'static [OptionTemplate],
    pub variants: &'static [VariantTemplate],
}

const SIZES: OptionTemplate = OptionTemplate {
    title: "Size",
    values: &["40", "42", "44"],
};

const APPAREL_SIZES: OptionTemplate = OptionTemplate {
    title: "Size",
    values: &["S", "M", "L"],
};

/// The seed catalog.
pub const PRODUCT_TEMPLATES: [ProductTemplate; 6] = [
    ProductTemplate {
        title: "Classic Canvas Low",
        handle: "classic-canvas-low",
        description: "Low-top canvas sneaker with a vulcanized rubber sole.",
        thumbnail: None,
        options: &[SIZES],
        variants: &[
            VariantTemplate {
                title: "40",
                sku: "CCL-40",
                options: &[("Size", "40")],
                prices: &[("eur", 65), ("usd", 70)],
            },
            VariantTemplate {
                title: "42",
                sku: "CCL-42",
                options: &[("Size", "42")],
                prices: &[("eur", 65), ("usd", 70)],
            },
            VariantTemplate {
                title: "44",
                sku: "CCL-44",
                options: &[("Size", "44")],
                prices: &[("eur", 65), ("usd", 70)],
            },
        ],
    },
    ProductTemplate {
        title: "Trail Runner GTX",
        handle: "trail-runner-gtx",
        description: "Waterproof trail running shoe with an aggressive outsole.",
        thumbnail: None,
        options: &[SIZES],
        variants: &[
            VariantTemplate {
                title: "42",
                sku: "TRG-42",
                options: &[("Size", "42")],
                prices: &[("eur", 140), ("usd", 150)],
            },
            VariantTemplate {
                title: "44",
                sku: "TRG-44",
                options: &[("Size", "44")],
                prices: &[("eur", 140), ("usd", 150)],
            },
        ],
    },
    ProductTemplate {
        title: "Leather Chelsea Boot",
        handle: "leather-chelsea-boot",
        description: "Full-grain leather chelsea boot with elastic side panels.",
        thumbnail: None,
        options: &[SIZES],
        variants: &[
            VariantTemplate {
                title: "42",
                sku: "LCB-42",
                options: &[("Size", "42")],
                prices: &[("eur", 190), ("usd", 205)],
            },
            VariantTemplate {
                title: "44",
                sku: "LCB-44",
                options: &[("Size", "44")],
                prices: &[("eur", 190), ("usd", 205)],
            },
        ],
    },
    ProductTemplate {
        title: "Strap Sandal",
        handle: "strap-sandal",
        description: "Adjustable two-strap sandal with a cork footbed.",
        thumbnail: None,
        options: &[SIZES],
        variants: &[
            VariantTemplate {
                title: "40",
                sku: "SS-40",
                options: &[("Size", "40")],
                prices: &[("eur", 45), ("usd", 50)],
            },
            VariantTemplate {
                title: "42",
                sku: "SS-42",
                options: &[("Size", "42")],
                prices: &[("eur", 45), ("usd", 50)],
            },
        ],
    },
    ProductTemplate {
        title: "Oversized Logo Tee",
        handle: "oversized-logo-tee",
        description: "Heavyweight cotton tee with a dropped shoulder.",
        thumbnail: None,
        options: &[APPAREL_SIZES],
        variants: &[
            VariantTemplate {
                title: "S",
                sku: "OLT-S",
                options: &[("Size", "S")],
                prices: &[("eur", 35), ("usd", 38)],
            },
            VariantTemplate {
                title: "M",
                sku: "OLT-M",
                options: &[("Size", "M")],
                prices: &[("eur", 35), ("usd", 38)],
            },
            VariantTemplate {
                title: "L",
                sku: "OLT-L",
                options: &[("Size", "L")],
                prices: &[("eur", 35), ("usd", 38)],
            },
        ],
    },
    ProductTemplate {
        title: "Crossbody Bag",
        handle: "crossbody-bag",
        description: "Compact nylon crossbody bag with an adjustable strap.",
        thumbnail: None,
        options: &[OptionTemplate {
            title: "Color",
            values: &["Black", "Sand"],
        }],
        variants: &[
            VariantTemplate {
                title: "Black",
                sku: "CB-BLK",
                options: &[("Color", "Black")],
                prices: &[("eur", 55), ("usd", 60)],
            },
            VariantTemplate {
                title: "Sand",
                sku: "CB-SND",
                options: &[("Color", "Sand")],
                prices: &[("eur", 55), ("usd", 60)],
            },
        ],
    },
];

/// Total number of variants across the seed catalog.
pub fn template_variant_count() -> usize {
    PRODUCT_TEMPLATES.iter().map(|p| p.variants.len()).sum()
}
