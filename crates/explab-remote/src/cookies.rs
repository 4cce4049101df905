use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use explab_error::{ExperimentError, Result};

/// Enumerates the session cookies scoped to a hostname. The browser-owned
/// cookie database is external; this seam is what the request client sees.
pub trait CookieSource {
    fn cookies_for_host(&self, hostname: &str) -> Vec<(String, String)>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
}

/// File-backed cookie source: a JSON map of hostname to cookie entries,
/// exported from the hosting browser session.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CookieFile {
    #[serde(default)]
    by_host: HashMap<String, Vec<CookieEntry>>,
}

impl CookieFile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|err| ExperimentError::StateLoad(format!("{}: {err}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|err| ExperimentError::StateLoad(format!("{}: {err}", path.display())))
    }

    #[must_use]
    pub fn from_entries(hostname: &str, entries: Vec<CookieEntry>) -> Self {
        let mut by_host = HashMap::new();
        by_host.insert(hostname.to_string(), entries);
        Self { by_host }
    }
}

impl CookieSource for CookieFile {
    fn cookies_for_host(&self, hostname: &str) -> Vec<(String, String)> {
        self.by_host
            .get(hostname)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| (entry.name.clone(), entry.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
