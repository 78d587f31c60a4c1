use crate::{LocalStorage, Storage, StorageResult};
use std::sync::Arc;
use uplink_core::Config;

/// Create the storage backend from configuration.
///
/// The local filesystem backend is the only one currently implemented; the
/// `Storage` trait is the seam a remote backend would plug into.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(
        config.local_storage_path.clone(),
        config.public_base_url.clone(),
    )
    .await?;

    Ok(Arc::new(storage))
}
