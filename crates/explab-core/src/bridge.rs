use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use explab_error::Result;
use explab_host::{AddonInfo, HostEvent, InstallInfo, LifecycleState};
use explab_remote::ApiTransport;
use explab_store::StateStore;

use crate::channels::ExperimentChannels;
use crate::metrics::MetricsSink;
use crate::sync::SyncManager;
use crate::ui::{AddonSummary, InstallPhase, UiEvent, UiEventSender, format_install_data};

/// Subscribes to host package-manager events and reflects them into the
/// installed store, the UI collaborator and the remote service.
pub struct LifecycleBridge<T: ApiTransport> {
    store: Arc<Mutex<StateStore>>,
    sync: SyncManager<T>,
    ui: UiEventSender,
    metrics: Arc<dyn MetricsSink>,
    channels: Arc<dyn ExperimentChannels>,
    lifecycle: HashMap<String, LifecycleState>,
}

impl<T: ApiTransport + 'static> LifecycleBridge<T> {
    pub fn new(
        store: Arc<Mutex<StateStore>>,
        sync: SyncManager<T>,
        ui: UiEventSender,
        metrics: Arc<dyn MetricsSink>,
        channels: Arc<dyn ExperimentChannels>,
    ) -> Self {
        Self {
            store,
            sync,
            ui,
            metrics,
            channels,
            lifecycle: HashMap::new(),
        }
    }

    pub fn state_of(&self, addon_id: &str) -> LifecycleState {
        self.lifecycle
            .get(addon_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn handle(&mut self, event: HostEvent) -> Result<()> {
        if let Some(addon_id) = event.addon_id() {
            let state = self.state_of(addon_id).apply(&event);
            self.lifecycle.insert(addon_id.to_string(), state);
        }

        match event {
            HostEvent::NewInstall(install) => self.forward(InstallPhase::New, &install),
            HostEvent::InstallStarted(install) => self.forward(InstallPhase::Started, &install),
            HostEvent::DownloadStarted(install) => {
                self.forward(InstallPhase::DownloadStarted, &install);
            }
            HostEvent::DownloadProgress(install) => {
                self.forward(InstallPhase::DownloadProgress, &install);
            }
            HostEvent::DownloadEnded(install) => {
                self.forward(InstallPhase::DownloadEnded, &install);
            }
            HostEvent::DownloadCancelled(install) => {
                self.forward(InstallPhase::DownloadCancelled, &install);
            }
            HostEvent::DownloadFailed(install) => {
                self.forward(InstallPhase::DownloadFailed, &install);
            }
            HostEvent::InstallCancelled(install) => self.forward(InstallPhase::Cancelled, &install),
            HostEvent::InstallFailed(install) => self.forward(InstallPhase::Failed, &install),
            HostEvent::InstallEnded { install, addon } => {
                return self.install_ended(install, addon).await;
            }
            HostEvent::Enabled(addon) => return self.manage(addon, true).await,
            HostEvent::Disabled(addon) => return self.manage(addon, false).await,
            HostEvent::Uninstalling(addon) => return self.uninstalling(addon).await,
            HostEvent::Uninstalled(addon) => return self.uninstalled(addon).await,
        }
        Ok(())
    }

    async fn recognized(&self, addon_id: &str) -> bool {
        self.store.lock().await.is_known(addon_id)
    }

    /// Install-progress events pass through untouched: the store only changes
    /// once the host resolves an addon identity.
    fn forward(&self, phase: InstallPhase, install: &InstallInfo) {
        self.send(UiEvent::Install {
            phase,
            data: format_install_data(install, None),
        });
    }

    async fn install_ended(&self, install: InstallInfo, addon: AddonInfo) -> Result<()> {
        if !self.recognized(&addon.id).await {
            return Ok(());
        }

        self.store
            .lock()
            .await
            .upsert(&addon.id, addon.active, addon.install_date)?;

        // Remote state settles before the UI hears about completion.
        if let Err(err) = self.sync.sync(&addon.id).await {
            explab_logger::warn(&format!("install sync for {} failed: {err}", addon.id));
        }

        self.send(UiEvent::Install {
            phase: InstallPhase::Ended,
            data: format_install_data(&install, Some(&addon)),
        });
        self.metrics.experiment_enabled(&addon.id);
        self.channels.update_experiment_channels();
        Ok(())
    }

    async fn manage(&self, addon: AddonInfo, enabled: bool) -> Result<()> {
        if !self.recognized(&addon.id).await {
            return Ok(());
        }

        self.store
            .lock()
            .await
            .upsert(&addon.id, addon.active, addon.install_date)?;

        let summary = AddonSummary::from(&addon);
        if enabled {
            self.send(UiEvent::ManageEnabled(summary));
            self.metrics.experiment_enabled(&addon.id);
        } else {
            self.send(UiEvent::ManageDisabled(summary));
            self.metrics.experiment_disabled(&addon.id);
        }
        self.channels.update_experiment_channels();
        Ok(())
    }

    /// The package is still present while uninstall runs; the store is
    /// untouched until the host confirms removal.
    async fn uninstalling(&self, addon: AddonInfo) -> Result<()> {
        if self.recognized(&addon.id).await {
            self.send(UiEvent::UninstallStarted(AddonSummary::from(&addon)));
        }
        Ok(())
    }

    async fn uninstalled(&self, addon: AddonInfo) -> Result<()> {
        if !self.recognized(&addon.id).await {
            return Ok(());
        }

        // Final metadata is captured before the record disappears.
        self.send(UiEvent::UninstallEnded {
            summary: AddonSummary::from(&addon),
            addon: addon.clone(),
        });

        {
            let mut store = self.store.lock().await;
            store.upsert(&addon.id, addon.active, addon.install_date)?;
            store.remove(&addon.id)?;
        }

        let sync = self.sync.clone();
        let addon_id = addon.id.clone();
        tokio::spawn(async move {
            if let Err(err) = sync.sync(&addon_id).await {
                explab_logger::warn(&format!("uninstall sync for {addon_id} failed: {err}"));
            }
        });

        self.metrics.experiment_disabled(&addon.id);
        self.channels.update_experiment_channels();
        Ok(())
    }

    fn send(&self, event: UiEvent) {
        if self.ui.send(event).is_err() {
            explab_logger::debug("ui channel closed, event dropped", true);
        }
    }
}
