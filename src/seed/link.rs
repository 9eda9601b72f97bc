//! seed::link
//!
//! Cross-module linking.
//!
//! Links are submitted without checking that either side exists; the
//! backend's link store is idempotent, so re-linking is harmless.

use tracing::debug;

use crate::backend::links::{LinkDefinition, ModuleRef};
use crate::backend::requests::{CreateLinksRequest, Validate};
use crate::backend::Backend;

use super::SeedError;

/// Link two module-scoped entities.
pub async fn link(
    backend: &dyn Backend,
    from: ModuleRef,
    to: ModuleRef,
) -> Result<LinkDefinition, SeedError> {
    let definition = LinkDefinition::new(from, to);
    link_all(backend, vec![definition.clone()]).await?;
    Ok(definition)
}

/// Submit a batch of links in one backend call.
pub async fn link_all(backend: &dyn Backend, links: Vec<LinkDefinition>) -> Result<(), SeedError> {
    let request = CreateLinksRequest { links };
    request.validate()?;
    for definition in &request.links {
        debug!(link = %definition, "linking");
    }
    backend.create_links(request).await?;
    Ok(())
}
