use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An optional installable package advertised by the remote catalog.
/// Read-only to this agent; the catalog is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    pub addon_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Endpoint recording per-client installations; the client identity is
    /// appended as a path segment when synchronizing.
    pub installations_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_url: Option<String>,
    /// Catalog fields this agent does not model, carried wholesale.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Local record of one installed experiment: the host-reported fields merged
/// over the catalog metadata captured at the time of the last event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstalledRecord {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<Experiment>,
}
