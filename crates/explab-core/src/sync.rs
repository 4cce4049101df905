use std::sync::Arc;
use tokio::sync::Mutex;

use explab_error::{ExperimentError, Result};
use explab_remote::{ApiMethod, ApiTransport, idempotent_ok};
use explab_store::StateStore;

/// Record of one completed synchronization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReceipt {
    pub addon_id: String,
    pub method: ApiMethod,
    pub status: u16,
}

/// Reflects current local truth to the remote installations service: `put`
/// when the addon is installed locally, `delete` when it is not. Fire-once
/// per triggering event; anything missed reconciles on the next event.
pub struct SyncManager<T: ApiTransport> {
    transport: Arc<T>,
    store: Arc<Mutex<StateStore>>,
}

impl<T: ApiTransport> Clone for SyncManager<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: ApiTransport> SyncManager<T> {
    pub fn new(transport: Arc<T>, store: Arc<Mutex<StateStore>>) -> Self {
        Self { transport, store }
    }

    pub async fn sync(&self, addon_id: &str) -> Result<SyncReceipt> {
        let (method, url) = {
            let store = self.store.lock().await;
            let experiment = store
                .available(addon_id)
                .ok_or_else(|| ExperimentError::UnknownExperiment(addon_id.to_string()))?;
            let method = if store.is_installed(addon_id) {
                ApiMethod::Put
            } else {
                ApiMethod::Delete
            };
            (
                method,
                format!("{}{}", experiment.installations_url, store.client_id()),
            )
        };

        let outcome = self.transport.call(method, &url, &[]).await?;
        if idempotent_ok(method, outcome.status) {
            Ok(SyncReceipt {
                addon_id: addon_id.to_string(),
                method,
                status: outcome.status,
            })
        } else {
            Err(ExperimentError::RemoteRejected(
                addon_id.to_string(),
                outcome.status,
            ))
        }
    }

    /// Synchronize every experiment the catalog knows. Rejections are logged
    /// and skipped so one failing entry cannot stall the rest.
    pub async fn sync_all(&self) -> Vec<SyncReceipt> {
        let addon_ids = {
            let store = self.store.lock().await;
            store.catalog_ids()
        };

        let mut receipts = Vec::with_capacity(addon_ids.len());
        for addon_id in addon_ids {
            match self.sync(&addon_id).await {
                Ok(receipt) => receipts.push(receipt),
                Err(err) => explab_logger::warn(&format!("sync failed for {addon_id}: {err}")),
            }
        }
        receipts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::testutil::{RecordingTransport, store_with_catalog};

    #[tokio::test]
    async fn test_installed_addon_syncs_with_put() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_catalog(&dir, &["a@explab"]);
        store.lock().await.upsert("a@explab", true, None).unwrap();
        let client_id = store.lock().await.client_id().to_string();

        let transport = Arc::new(RecordingTransport::with_statuses(vec![200]));
        let sync = SyncManager::new(Arc::clone(&transport), store);

        let receipt = sync.sync("a@explab").await.unwrap();
        assert_eq!(receipt.method, ApiMethod::Put);
        assert_eq!(receipt.status, 200);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[(
                ApiMethod::Put,
                format!("https://explab.io/api/a@explab/installations/{client_id}"),
            )]
        );
    }

    #[tokio::test]
    async fn test_absent_addon_syncs_with_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_catalog(&dir, &["a@explab"]);

        let transport = Arc::new(RecordingTransport::with_statuses(vec![204]));
        let sync = SyncManager::new(Arc::clone(&transport), store);

        let receipt = sync.sync("a@explab").await.unwrap();
        assert_eq!(receipt.method, ApiMethod::Delete);
    }

    #[tokio::test]
    async fn test_redundant_delete_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_catalog(&dir, &["a@explab"]);

        let transport = Arc::new(RecordingTransport::with_statuses(vec![204, 404]));
        let sync = SyncManager::new(Arc::clone(&transport), store);

        // Two back-to-back syncs with no state change: both must settle
        // without error even though the second delete finds nothing.
        assert!(sync.sync("a@explab").await.is_ok());
        assert!(sync.sync("a@explab").await.is_ok());
        assert_eq!(transport.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_catalog(&dir, &["a@explab"]);

        let transport = Arc::new(RecordingTransport::with_statuses(vec![500]));
        let sync = SyncManager::new(transport, store);

        let err = sync.sync("a@explab").await.unwrap_err();
        assert!(matches!(err, ExperimentError::RemoteRejected(_, 500)));
    }

    #[tokio::test]
    async fn test_unknown_addon_is_rejected_locally() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_catalog(&dir, &[]);

        let transport = Arc::new(RecordingTransport::with_statuses(Vec::new()));
        let sync = SyncManager::new(Arc::clone(&transport), store);

        let err = sync.sync("mystery@addon").await.unwrap_err();
        assert!(matches!(err, ExperimentError::UnknownExperiment(_)));
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_all_covers_catalog_and_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_catalog(&dir, &["a@explab", "b@explab"]);
        store.lock().await.upsert("a@explab", true, None).unwrap();

        let transport = Arc::new(RecordingTransport::with_statuses(vec![500, 204]));
        let sync = SyncManager::new(Arc::clone(&transport), store);

        let receipts = sync.sync_all().await;
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].addon_id, "b@explab");
        assert_eq!(transport.calls.lock().unwrap().len(), 2);
    }
}
