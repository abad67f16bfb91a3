use catalog_core::CatalogError;
use tracing::warn;

/// Log uploads left behind by a write that failed afterwards. The host has
/// no delete API, so they stay hosted.
pub(crate) fn report(resource: &str, urls: &[String], err: &CatalogError) {
    if urls.is_empty() {
        return;
    }
    warn!(
        resource,
        orphaned = ?urls,
        error = %err,
        "document write failed after upload; hosted images are orphaned"
    );
}
