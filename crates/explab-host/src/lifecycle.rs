use crate::HostEvent;

/// Per-addon lifecycle as observed from host events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Unknown,
    Installing,
    InstalledActive,
    InstalledInactive,
    Uninstalling,
    Uninstalled,
}

impl LifecycleState {
    #[must_use]
    pub fn apply(self, event: &HostEvent) -> Self {
        match event {
            HostEvent::NewInstall(_)
            | HostEvent::InstallStarted(_)
            | HostEvent::DownloadStarted(_)
            | HostEvent::DownloadProgress(_)
            | HostEvent::DownloadEnded(_) => Self::Installing,
            HostEvent::DownloadCancelled(_)
            | HostEvent::DownloadFailed(_)
            | HostEvent::InstallCancelled(_)
            | HostEvent::InstallFailed(_) => Self::Unknown,
            HostEvent::InstallEnded { addon, .. } => {
                if addon.active {
                    Self::InstalledActive
                } else {
                    Self::InstalledInactive
                }
            }
            HostEvent::Enabled(_) => Self::InstalledActive,
            HostEvent::Disabled(_) => Self::InstalledInactive,
            HostEvent::Uninstalling(_) => Self::Uninstalling,
            HostEvent::Uninstalled(_) => Self::Uninstalled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AddonInfo, InstallInfo};

    fn addon(id: &str, active: bool) -> AddonInfo {
        AddonInfo {
            id: id.to_string(),
            name: id.to_string(),
            version: "1.0".to_string(),
            description: None,
            homepage_url: None,
            icon_url: None,
            active,
            install_date: None,
        }
    }

    #[test]
    fn test_install_flow() {
        let state = LifecycleState::Unknown
            .apply(&HostEvent::NewInstall(InstallInfo::default()))
            .apply(&HostEvent::DownloadStarted(InstallInfo::default()))
            .apply(&HostEvent::InstallEnded {
                install: InstallInfo::default(),
                addon: addon("a@explab", true),
            });
        assert_eq!(state, LifecycleState::InstalledActive);
    }

    #[test]
    fn test_install_ended_inactive() {
        let state = LifecycleState::Installing.apply(&HostEvent::InstallEnded {
            install: InstallInfo::default(),
            addon: addon("a@explab", false),
        });
        assert_eq!(state, LifecycleState::InstalledInactive);
    }

    #[test]
    fn test_failed_download_resets() {
        let state = LifecycleState::Installing
            .apply(&HostEvent::DownloadFailed(InstallInfo::default()));
        assert_eq!(state, LifecycleState::Unknown);
    }

    #[test]
    fn test_enable_disable_cycle() {
        let enabled = LifecycleState::InstalledInactive.apply(&HostEvent::Enabled(addon("a", true)));
        assert_eq!(enabled, LifecycleState::InstalledActive);

        let disabled = enabled.apply(&HostEvent::Disabled(addon("a", false)));
        assert_eq!(disabled, LifecycleState::InstalledInactive);
    }

    #[test]
    fn test_uninstall_flow() {
        let state = LifecycleState::InstalledActive
            .apply(&HostEvent::Uninstalling(addon("a", true)))
            .apply(&HostEvent::Uninstalled(addon("a", false)));
        assert_eq!(state, LifecycleState::Uninstalled);
    }

    #[test]
    fn test_addon_id_only_on_resolved_events() {
        assert!(
            HostEvent::DownloadProgress(InstallInfo::default())
                .addon_id()
                .is_none()
        );
        assert_eq!(
            HostEvent::Enabled(addon("a@explab", true)).addon_id(),
            Some("a@explab")
        );
    }
}
