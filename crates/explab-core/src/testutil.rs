#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;

use explab_error::Result;
use explab_host::{AddonInfo, PackageHost};
use explab_remote::{ApiMethod, ApiOutcome, ApiTransport};
use explab_store::{Experiment, StateStore};

use crate::channels::ExperimentChannels;
use crate::metrics::MetricsSink;

pub struct RecordingTransport {
    pub calls: StdMutex<Vec<(ApiMethod, String)>>,
    pub statuses: StdMutex<Vec<u16>>,
}

impl RecordingTransport {
    pub fn with_statuses(statuses: Vec<u16>) -> Self {
        Self {
            calls: StdMutex::new(Vec::new()),
            statuses: StdMutex::new(statuses),
        }
    }
}

impl ApiTransport for RecordingTransport {
    async fn call(
        &self,
        method: ApiMethod,
        url: &str,
        _extra_headers: &[(String, String)],
    ) -> Result<ApiOutcome> {
        self.calls.lock().unwrap().push((method, url.to_string()));
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.is_empty() {
            200
        } else {
            statuses.remove(0)
        };
        Ok(ApiOutcome::from_status(status))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    InstallFromUrl(String),
    Uninstall(String),
    Enumerate,
}

#[derive(Default)]
pub struct RecordingHost {
    pub calls: StdMutex<Vec<HostCall>>,
    pub installed: StdMutex<Vec<AddonInfo>>,
}

impl PackageHost for RecordingHost {
    async fn enumerate(&self) -> Result<Vec<AddonInfo>> {
        self.calls.lock().unwrap().push(HostCall::Enumerate);
        Ok(self.installed.lock().unwrap().clone())
    }

    async fn install_from_url(&self, url: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::InstallFromUrl(url.to_string()));
        Ok(())
    }

    async fn uninstall(&self, addon_id: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Uninstall(addon_id.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    pub enabled: StdMutex<Vec<String>>,
    pub disabled: StdMutex<Vec<String>>,
}

impl MetricsSink for RecordingMetrics {
    fn on_enable(&self) {}

    fn on_disable(&self) {}

    fn experiment_enabled(&self, addon_id: &str) {
        self.enabled.lock().unwrap().push(addon_id.to_string());
    }

    fn experiment_disabled(&self, addon_id: &str) {
        self.disabled.lock().unwrap().push(addon_id.to_string());
    }
}

#[derive(Default)]
pub struct RecordingChannels {
    pub updates: StdMutex<usize>,
}

impl ExperimentChannels for RecordingChannels {
    fn update_experiment_channels(&self) {
        *self.updates.lock().unwrap() += 1;
    }
}

pub fn experiment(addon_id: &str) -> Experiment {
    Experiment {
        addon_id: addon_id.to_string(),
        title: format!("Experiment {addon_id}"),
        description: None,
        installations_url: format!("https://explab.io/api/{addon_id}/installations/"),
        install_url: Some(format!("https://explab.io/files/{addon_id}.xpi")),
        survey_url: None,
        extra: serde_json::Map::new(),
    }
}

pub fn addon(id: &str, active: bool) -> AddonInfo {
    AddonInfo {
        id: id.to_string(),
        name: format!("Addon {id}"),
        version: "1.0".to_string(),
        description: Some("description".to_string()),
        homepage_url: None,
        icon_url: None,
        active,
        install_date: Some(1_500_000_000),
    }
}

pub fn store_with_catalog(dir: &tempfile::TempDir, ids: &[&str]) -> Arc<Mutex<StateStore>> {
    let path = dir.path().join("state.json");
    let mut store = StateStore::load(&path).unwrap();
    store
        .replace_catalog(ids.iter().map(|id| experiment(id)).collect())
        .unwrap();
    Arc::new(Mutex::new(store))
}
