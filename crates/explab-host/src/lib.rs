pub mod lifecycle;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use explab_error::Result;

pub use lifecycle::LifecycleState;

/// Progress of one in-flight install, as reported by the host package
/// manager. Addon identity may not be resolvable before completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub max_progress: i64,
}

/// A package as the host package manager reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddonInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_date: Option<i64>,
}

/// Lifecycle events published by the host package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    NewInstall(InstallInfo),
    InstallStarted(InstallInfo),
    DownloadStarted(InstallInfo),
    DownloadProgress(InstallInfo),
    DownloadEnded(InstallInfo),
    DownloadCancelled(InstallInfo),
    DownloadFailed(InstallInfo),
    InstallCancelled(InstallInfo),
    InstallFailed(InstallInfo),
    InstallEnded {
        install: InstallInfo,
        addon: AddonInfo,
    },
    Enabled(AddonInfo),
    Disabled(AddonInfo),
    Uninstalling(AddonInfo),
    Uninstalled(AddonInfo),
}

impl HostEvent {
    /// Addon identity, where the event carries one. Install-progress events
    /// do not: the id resolves only once the install completes.
    pub fn addon_id(&self) -> Option<&str> {
        match self {
            Self::InstallEnded { addon, .. }
            | Self::Enabled(addon)
            | Self::Disabled(addon)
            | Self::Uninstalling(addon)
            | Self::Uninstalled(addon) => Some(&addon.id),
            _ => None,
        }
    }
}

pub type HostEventSender = mpsc::UnboundedSender<HostEvent>;
pub type HostEventReceiver = mpsc::UnboundedReceiver<HostEvent>;

pub fn event_channel() -> (HostEventSender, HostEventReceiver) {
    mpsc::unbounded_channel()
}

/// The host package manager, consumed at its interface: enumeration,
/// install-from-url and uninstall-by-id. Lifecycle events arrive separately
/// on the event channel.
pub trait PackageHost {
    fn enumerate(&self) -> impl Future<Output = Result<Vec<AddonInfo>>> + Send;
    fn install_from_url(&self, url: &str) -> impl Future<Output = Result<()>> + Send;
    fn uninstall(&self, addon_id: &str) -> impl Future<Output = Result<()>> + Send;
}
