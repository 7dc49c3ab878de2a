//! Startup load of the container catalog and the default-selection policy.

use crate::model::{ClientError, ContainerCatalog};
use crate::service::OptimizeService;

/// The container code preferred as the default selection when present.
pub const STANDARD_CONTAINER_CODE: &str = "40GP";

/// Loads the catalog once at startup.
///
/// The catalog is read-only after this call; callers hand it to dependents
/// by reference and never mutate it.
pub async fn load_catalog<S: OptimizeService>(service: &S) -> Result<ContainerCatalog, ClientError> {
    service.fetch_containers().await
}

/// Deterministic default-selection policy, applied once after load.
///
/// Prefers the standard code when the catalog contains it, otherwise the
/// first code in the catalog's natural iteration order, otherwise none.
pub fn default_container_code(catalog: &ContainerCatalog) -> Option<&str> {
    if catalog.contains_key(STANDARD_CONTAINER_CODE) {
        return Some(STANDARD_CONTAINER_CODE);
    }
    catalog.keys().next().map(String::as_str)
}
