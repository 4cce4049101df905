use std::sync::Arc;
use tokio::sync::Mutex;

use explab_error::Result;
use explab_host::PackageHost;
use explab_store::{Experiment, StateStore};

use crate::ui::{UiCommand, UiEvent, UiEventSender};

/// Executes remote-originated commands arriving over the UI channel.
///
/// Install and uninstall requests are honored only for addon ids the catalog
/// knows: the remote/UI layer cannot drive arbitrary host package operations.
pub struct CommandHandler<H: PackageHost> {
    host: Arc<H>,
    store: Arc<Mutex<StateStore>>,
    ui: UiEventSender,
    self_id: String,
}

impl<H: PackageHost> CommandHandler<H> {
    pub fn new(
        host: Arc<H>,
        store: Arc<Mutex<StateStore>>,
        ui: UiEventSender,
        self_id: impl Into<String>,
    ) -> Self {
        Self {
            host,
            store,
            ui,
            self_id: self_id.into(),
        }
    }

    pub async fn handle(&self, command: UiCommand) -> Result<()> {
        match command {
            UiCommand::InstallExperiment { addon_id } => self.install_experiment(&addon_id).await,
            UiCommand::UninstallExperiment { addon_id } => {
                self.uninstall_experiment(&addon_id).await
            }
            UiCommand::UninstallSelf => self.uninstall_self().await,
            UiCommand::SyncInstalled => self.sync_installed().await,
            UiCommand::CatalogLoaded { experiments } => self.catalog_loaded(experiments).await,
        }
    }

    pub async fn install_experiment(&self, addon_id: &str) -> Result<()> {
        let install_url = {
            let store = self.store.lock().await;
            if !store.is_known(addon_id) {
                explab_logger::debug(&format!("ignoring install of unknown id {addon_id}"), true);
                return Ok(());
            }
            store
                .available(addon_id)
                .and_then(|experiment| experiment.install_url.clone())
        };

        match install_url {
            Some(url) => self.host.install_from_url(&url).await,
            None => {
                explab_logger::warn(&format!("experiment {addon_id} has no install url"));
                Ok(())
            }
        }
    }

    pub async fn uninstall_experiment(&self, addon_id: &str) -> Result<()> {
        if !self.store.lock().await.is_known(addon_id) {
            explab_logger::debug(&format!("ignoring uninstall of unknown id {addon_id}"), true);
            return Ok(());
        }
        self.host.uninstall(addon_id).await
    }

    /// Kick out every installed experiment, then the hosting package itself.
    pub async fn uninstall_self(&self) -> Result<()> {
        self.uninstall_installed().await;
        self.host.uninstall(&self.self_id).await?;
        self.teardown().await
    }

    /// Final teardown when the host is already removing the agent: uninstall
    /// the experiments and drop all persisted state.
    pub async fn teardown(&self) -> Result<()> {
        self.store.lock().await.clear()?;
        self.send(UiEvent::SelfUninstalled);
        Ok(())
    }

    pub async fn uninstall_installed(&self) {
        let addon_ids = {
            let store = self.store.lock().await;
            store.installed_ids()
        };
        for addon_id in addon_ids {
            if let Err(err) = self.uninstall_experiment(&addon_id).await {
                explab_logger::warn(&format!("failed to uninstall {addon_id}: {err}"));
            }
        }
    }

    /// Answer a UI reconcile request with the client identity and the full
    /// installed snapshot.
    pub async fn sync_installed(&self) -> Result<()> {
        let (client_id, installed) = {
            let store = self.store.lock().await;
            (store.client_id().to_string(), store.snapshot())
        };
        self.send(UiEvent::SyncInstalledResult {
            client_id,
            installed,
        });
        Ok(())
    }

    /// A fresh catalog snapshot arrived: replace the cache wholesale, then
    /// rebuild the installed store from a full host enumeration.
    pub async fn catalog_loaded(&self, experiments: Vec<Experiment>) -> Result<()> {
        self.store.lock().await.replace_catalog(experiments)?;

        let addons = self.host.enumerate().await?;
        self.store.lock().await.populate_from_host(
            addons
                .into_iter()
                .map(|addon| (addon.id, addon.active, addon.install_date)),
        )
    }

    fn send(&self, event: UiEvent) {
        if self.ui.send(event).is_err() {
            explab_logger::debug("ui channel closed, event dropped", true);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::testutil::{HostCall, RecordingHost, addon, experiment, store_with_catalog};
    use crate::ui;

    struct Fixture {
        commands: CommandHandler<RecordingHost>,
        host: Arc<RecordingHost>,
        store: Arc<Mutex<StateStore>>,
        events: ui::UiEventReceiver,
    }

    fn fixture(dir: &tempfile::TempDir, catalog: &[&str]) -> Fixture {
        let store = store_with_catalog(dir, catalog);
        let host = Arc::new(RecordingHost::default());
        let (tx, events) = ui::event_channel();
        let commands = CommandHandler::new(
            Arc::clone(&host),
            Arc::clone(&store),
            tx,
            "agent@explab.io",
        );
        Fixture {
            commands,
            host,
            store,
            events,
        }
    }

    #[tokio::test]
    async fn test_install_drives_host_for_known_experiment() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(&dir, &["a@explab"]);

        fx.commands.install_experiment("a@explab").await.unwrap();

        let calls = fx.host.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![HostCall::InstallFromUrl(
                "https://explab.io/files/a@explab.xpi".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_unrecognized_install_command_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(&dir, &["a@explab"]);

        fx.commands
            .install_experiment("not-in-catalog")
            .await
            .unwrap();

        assert!(fx.host.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_uninstall_command_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(&dir, &["a@explab"]);

        fx.commands
            .uninstall_experiment("not-in-catalog")
            .await
            .unwrap();

        assert!(fx.host.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uninstall_self_cascades_then_removes_agent() {
        let dir = tempfile::tempdir().unwrap();
        let mut fx = fixture(&dir, &["a@explab", "b@explab"]);
        {
            let mut store = fx.store.lock().await;
            store.upsert("a@explab", true, None).unwrap();
            store.upsert("b@explab", true, None).unwrap();
        }

        fx.commands.uninstall_self().await.unwrap();

        let calls = fx.host.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                HostCall::Uninstall("a@explab".to_string()),
                HostCall::Uninstall("b@explab".to_string()),
                HostCall::Uninstall("agent@explab.io".to_string()),
            ]
        );
        assert!(fx.store.lock().await.installed_ids().is_empty());
        assert!(matches!(
            fx.events.try_recv().unwrap(),
            UiEvent::SelfUninstalled
        ));
    }

    #[tokio::test]
    async fn test_sync_installed_replies_with_identity_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut fx = fixture(&dir, &["a@explab"]);
        fx.store
            .lock()
            .await
            .upsert("a@explab", true, None)
            .unwrap();
        let expected_id = fx.store.lock().await.client_id().to_string();

        fx.commands.sync_installed().await.unwrap();

        match fx.events.try_recv().unwrap() {
            UiEvent::SyncInstalledResult {
                client_id,
                installed,
            } => {
                assert_eq!(client_id, expected_id);
                assert!(installed.contains_key("a@explab"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_catalog_loaded_replaces_cache_and_populates_store() {
        let dir = tempfile::tempdir().unwrap();
        let fx = fixture(&dir, &["old@explab"]);
        {
            let mut installed = fx.host.installed.lock().unwrap();
            installed.push(addon("a@explab", true));
            installed.push(addon("stray@other", true));
        }

        fx.commands
            .catalog_loaded(vec![experiment("a@explab"), experiment("b@explab")])
            .await
            .unwrap();

        let store = fx.store.lock().await;
        assert!(!store.is_known("old@explab"));
        assert!(store.is_known("b@explab"));
        assert!(store.is_installed("a@explab"));
        assert!(!store.is_installed("stray@other"));
    }
}
