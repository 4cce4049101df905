use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use explab_constants::{STATE_DIR, STATE_FILE};
use explab_error::{ExperimentError, Result};

use crate::experiment::{Experiment, InstalledRecord};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    environment: Option<String>,
    #[serde(default)]
    installed: IndexMap<String, InstalledRecord>,
    #[serde(default)]
    available: IndexMap<String, Experiment>,
}

/// Process-wide persisted state: client identity, the installed-experiment
/// store and the available-experiments cache. Loaded at startup, written on
/// every mutation, removed entirely on final uninstall.
pub struct StateStore {
    path: PathBuf,
    state: PersistedState,
}

impl StateStore {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(STATE_DIR)
            .join(STATE_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|err| ExperimentError::StateLoad(format!("{}: {err}", path.display())))?;
            serde_json::from_str(&content)
                .map_err(|err| ExperimentError::StateLoad(format!("{}: {err}", path.display())))?
        } else {
            PersistedState::default()
        };

        let mut store = Self {
            path: path.to_path_buf(),
            state,
        };
        if store.state.client_id.is_none() {
            // Generate an identity for this client, so the service can manage
            // experiment installations for multiple installations per user.
            // DO NOT USE IN METRICS.
            store.state.client_id = Some(uuid::Uuid::new_v4().to_string());
            store.persist()?;
        }
        Ok(store)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| ExperimentError::StateSave(format!("{}: {err}", parent.display())))?;
        }
        let content = serde_json::to_string_pretty(&self.state)
            .map_err(|err| ExperimentError::StateSave(err.to_string()))?;
        fs::write(&self.path, content)
            .map_err(|err| ExperimentError::StateSave(format!("{}: {err}", self.path.display())))
    }

    pub fn client_id(&self) -> &str {
        self.state.client_id.as_deref().unwrap_or_default()
    }

    pub fn environment(&self) -> Option<&str> {
        self.state.environment.as_deref()
    }

    pub fn set_environment(&mut self, name: &str) -> Result<()> {
        self.state.environment = Some(name.to_string());
        self.persist()
    }

    /// Whether an addon id names a known experiment, i.e. appears in the
    /// available-experiments cache.
    pub fn is_known(&self, addon_id: &str) -> bool {
        self.state.available.contains_key(addon_id)
    }

    pub fn is_installed(&self, addon_id: &str) -> bool {
        self.state.installed.contains_key(addon_id)
    }

    pub fn available(&self, addon_id: &str) -> Option<&Experiment> {
        self.state.available.get(addon_id)
    }

    pub fn get(&self, addon_id: &str) -> Option<&InstalledRecord> {
        self.state.installed.get(addon_id)
    }

    pub fn snapshot(&self) -> IndexMap<String, InstalledRecord> {
        self.state.installed.clone()
    }

    pub fn installed_ids(&self) -> Vec<String> {
        self.state.installed.keys().cloned().collect()
    }

    pub fn catalog_ids(&self) -> Vec<String> {
        self.state.available.keys().cloned().collect()
    }

    /// Merge host-reported fields over the cached catalog metadata for this
    /// id. Installed-state lives only in the installed store; a stray
    /// `active` key on the catalog copy is dropped here.
    pub fn upsert(&mut self, addon_id: &str, active: bool, install_date: Option<i64>) -> Result<()> {
        self.upsert_record(addon_id, active, install_date);
        self.persist()
    }

    fn upsert_record(&mut self, addon_id: &str, active: bool, install_date: Option<i64>) {
        if let Some(cached) = self.state.available.get_mut(addon_id) {
            cached.extra.remove("active");
        }
        let experiment = self.state.available.get(addon_id).cloned();
        self.state.installed.insert(
            addon_id.to_string(),
            InstalledRecord {
                active,
                install_date,
                experiment,
            },
        );
    }

    pub fn remove(&mut self, addon_id: &str) -> Result<()> {
        self.state.installed.shift_remove(addon_id);
        self.persist()
    }

    /// Replace the available-experiments cache wholesale, dropping the prior
    /// snapshot in one step.
    pub fn replace_catalog(&mut self, experiments: Vec<Experiment>) -> Result<()> {
        self.state.available = experiments
            .into_iter()
            .map(|experiment| (experiment.addon_id.clone(), experiment))
            .collect();
        self.persist()
    }

    /// Bulk startup population: reset the installed store from a full host
    /// package enumeration, keeping only addons the catalog knows.
    pub fn populate_from_host<I>(&mut self, addons: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, bool, Option<i64>)>,
    {
        self.state.installed = IndexMap::new();
        for (addon_id, active, install_date) in addons {
            if self.is_known(&addon_id) {
                self.upsert_record(&addon_id, active, install_date);
            }
        }
        self.persist()
    }

    /// Final teardown: drop all state and delete the backing file.
    pub fn clear(&mut self) -> Result<()> {
        self.state.installed.clear();
        self.state.available.clear();
        self.state.environment = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|err| {
                ExperimentError::StateSave(format!("{}: {err}", self.path.display()))
            })?;
        }
        Ok(())
    }
}
