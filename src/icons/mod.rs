//! Icon provisioning: descriptors → work items → registered icons

pub mod descriptor;
pub mod loader;
pub mod normalize;
pub mod resolver;

use crate::core::config::IconLoadingConfig;
use crate::surface::IconSurface;
use crate::Result;
use descriptor::IconDescriptor;
use loader::LoadReport;

/// Resolves `descriptors` and loads the resulting work list into `surface`
pub async fn provision<S>(
    descriptors: &[IconDescriptor],
    surface: &S,
    config: &IconLoadingConfig,
) -> Result<LoadReport>
where
    S: IconSurface + ?Sized,
{
    let items = resolver::resolve(descriptors, config);
    loader::load_all(&items, surface, config).await
}
