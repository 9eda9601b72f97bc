//! seed::policy
//!
//! Marketplace policy seeders: the default commission rule and the
//! configuration rule defaults.

use tracing::info;

use crate::backend::model::{CommissionRate, CommissionRule, ConfigurationRule};
use crate::backend::requests::{
    CreateCommissionRuleRequest, CreateConfigurationRuleRequest, Validate,
};
use crate::backend::Backend;
use crate::core::fixtures;

use super::SeedError;

/// Create the site-wide default commission rule (2%, tax inclusive).
pub async fn create_default_commission_rule(
    backend: &dyn Backend,
) -> Result<CommissionRule, SeedError> {
    let request = CreateCommissionRuleRequest {
        name: fixtures::COMMISSION_RULE_NAME.to_string(),
        is_active: true,
        reference: fixtures::COMMISSION_REFERENCE.to_string(),
        reference_id: String::new(),
        rate: CommissionRate {
            include_tax: true,
            rate_type: fixtures::COMMISSION_RATE_TYPE.to_string(),
            percentage_rate: fixtures::COMMISSION_PERCENTAGE_RATE,
        },
    };
    request.validate()?;
    let rule = backend.create_commission_rule(request).await?;
    info!(id = %rule.id, "created default commission rule");
    Ok(rule)
}

/// Create one configuration rule per default, in table order.
///
/// Rules are submitted one call at a time; a failure stops the loop and
/// leaves earlier rules in place.
pub async fn create_configuration_rules(
    backend: &dyn Backend,
) -> Result<Vec<ConfigurationRule>, SeedError> {
    let mut rules = Vec::with_capacity(fixtures::CONFIGURATION_RULE_DEFAULTS.len());
    for (rule_type, is_enabled) in fixtures::CONFIGURATION_RULE_DEFAULTS {
        let request = CreateConfigurationRuleRequest {
            rule_type,
            is_enabled,
        };
        request.validate()?;
        let rule = backend.create_configuration_rule(request).await?;
        info!(id = %rule.id, rule = %rule.rule_type, enabled = rule.is_enabled, "created configuration rule");
        rules.push(rule);
    }
    Ok(rules)
}
