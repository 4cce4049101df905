use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use explab_host::{AddonInfo, InstallInfo};
use explab_store::{Experiment, InstalledRecord};

/// Which install-progress step an `addon-install` event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallPhase {
    New,
    Started,
    DownloadStarted,
    DownloadProgress,
    DownloadEnded,
    DownloadCancelled,
    DownloadFailed,
    Failed,
    Cancelled,
    Ended,
}

impl InstallPhase {
    /// Event name on the UI wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "addon-install:install-new",
            Self::Started => "addon-install:install-started",
            Self::DownloadStarted => "addon-install:download-started",
            Self::DownloadProgress => "addon-install:download-progress",
            Self::DownloadEnded => "addon-install:download-ended",
            Self::DownloadCancelled => "addon-install:download-cancelled",
            Self::DownloadFailed => "addon-install:download-failed",
            Self::Failed => "addon-install:install-failed",
            Self::Cancelled => "addon-install:install-cancelled",
            Self::Ended => "addon-install:install-ended",
        }
    }
}

/// The fields every manage/uninstall event carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonSummary {
    pub id: String,
    pub name: String,
    pub version: String,
}

impl From<&AddonInfo> for AddonSummary {
    fn from(addon: &AddonInfo) -> Self {
        Self {
            id: addon.id.clone(),
            name: addon.name.clone(),
            version: addon.version.clone(),
        }
    }
}

/// Normalized install-progress payload: the install fields, plus the addon
/// fields once the addon is resolvable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub version: String,
    pub progress: i64,
    pub max_progress: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

pub fn format_install_data(install: &InstallInfo, addon: Option<&AddonInfo>) -> InstallData {
    let mut data = InstallData {
        name: install.name.clone(),
        error: install.error.clone(),
        state: install.state.clone(),
        version: install.version.clone(),
        progress: install.progress,
        max_progress: install.max_progress,
        ..InstallData::default()
    };

    if let Some(addon) = addon {
        data.id = Some(addon.id.clone());
        data.description = addon.description.clone();
        data.homepage_url = addon.homepage_url.clone();
        data.icon_url = addon.icon_url.clone();
    }

    data
}

/// Events produced for the UI collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ManageEnabled(AddonSummary),
    ManageDisabled(AddonSummary),
    UninstallStarted(AddonSummary),
    UninstallEnded {
        summary: AddonSummary,
        addon: AddonInfo,
    },
    Install {
        phase: InstallPhase,
        data: InstallData,
    },
    SelfInstalled,
    SelfEnabled,
    SelfUpgraded,
    SelfUninstalled,
    SyncInstalledResult {
        client_id: String,
        installed: IndexMap<String, InstalledRecord>,
    },
}

/// Commands consumed from the UI/remote layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    InstallExperiment { addon_id: String },
    UninstallExperiment { addon_id: String },
    UninstallSelf,
    SyncInstalled,
    CatalogLoaded { experiments: Vec<Experiment> },
}

pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;
pub type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;
pub type UiCommandSender = mpsc::UnboundedSender<UiCommand>;
pub type UiCommandReceiver = mpsc::UnboundedReceiver<UiCommand>;

pub fn event_channel() -> (UiEventSender, UiEventReceiver) {
    mpsc::unbounded_channel()
}

pub fn command_channel() -> (UiCommandSender, UiCommandReceiver) {
    mpsc::unbounded_channel()
}
