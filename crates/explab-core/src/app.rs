use std::sync::Arc;
use tokio::sync::Mutex;

use explab_constants::{CATALOG_RELOAD_INTERVAL_SECS, SELF_ADDON_ID, VERSION};
use explab_env::{Environment, HistorySource, detect_from_history, resolve};
use explab_error::Result;
use explab_host::{HostEventReceiver, PackageHost};
use explab_remote::ApiTransport;
use explab_store::StateStore;

use crate::bridge::LifecycleBridge;
use crate::channels::ExperimentChannels;
use crate::commands::CommandHandler;
use crate::metrics::MetricsSink;
use crate::sync::SyncManager;
use crate::ui::{
    UiCommand, UiCommandReceiver, UiCommandSender, UiEvent, UiEventReceiver, UiEventSender,
    command_channel, event_channel,
};

/// Why the agent is being started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    Install,
    Enable,
    Upgrade,
    Startup,
}

/// Why the agent is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Uninstall,
    Disable,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Configured environment name; falls back to the persisted preference,
    /// then to production.
    pub environment: Option<String>,
    pub addon_version: String,
    pub load_reason: LoadReason,
    pub self_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: None,
            addon_version: VERSION.to_string(),
            load_reason: LoadReason::Startup,
            self_id: SELF_ADDON_ID.to_string(),
        }
    }
}

/// Options handed to the UI collaborator when it is (re)created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub base_url: String,
    pub badge_color: String,
    pub origin_allowlist: String,
    pub addon_version: String,
    pub reload_interval_secs: u64,
}

/// The owned application context: every component is built here and rebuilt
/// on environment changes; nothing lives in module-level state.
pub struct App<H, T, F>
where
    H: PackageHost,
    T: ApiTransport + 'static,
    F: Fn(&'static Environment) -> T,
{
    env: &'static Environment,
    addon_version: String,
    load_reason: LoadReason,
    store: Arc<Mutex<StateStore>>,
    sync: SyncManager<T>,
    bridge: LifecycleBridge<T>,
    commands: CommandHandler<H>,
    ui_events: UiEventSender,
    metrics: Arc<dyn MetricsSink>,
    channels: Arc<dyn ExperimentChannels>,
    host_events: HostEventReceiver,
    ui_commands: UiCommandReceiver,
    transport_factory: F,
}

impl<H, T, F> App<H, T, F>
where
    H: PackageHost,
    T: ApiTransport + 'static,
    F: Fn(&'static Environment) -> T,
{
    /// Build the agent. Returns the app plus the UI collaborator's ends of
    /// the typed channels: events out, commands in.
    pub fn new(
        config: AppConfig,
        mut store: StateStore,
        host: Arc<H>,
        host_events: HostEventReceiver,
        metrics: Arc<dyn MetricsSink>,
        channels: Arc<dyn ExperimentChannels>,
        transport_factory: F,
    ) -> Result<(Self, UiEventReceiver, UiCommandSender)> {
        let configured = config
            .environment
            .as_deref()
            .or_else(|| store.environment())
            .unwrap_or_default()
            .to_string();
        let env = resolve(&configured);
        if config.environment.is_some() {
            store.set_environment(env.name)?;
        }

        let store = Arc::new(Mutex::new(store));
        let transport = Arc::new(transport_factory(env));
        let sync = SyncManager::new(transport, Arc::clone(&store));

        let (ui_events, ui_receiver) = event_channel();
        let (command_sender, ui_commands) = command_channel();

        let bridge = LifecycleBridge::new(
            Arc::clone(&store),
            sync.clone(),
            ui_events.clone(),
            Arc::clone(&metrics),
            Arc::clone(&channels),
        );
        let commands = CommandHandler::new(
            host,
            Arc::clone(&store),
            ui_events.clone(),
            config.self_id,
        );

        let app = Self {
            env,
            addon_version: config.addon_version,
            load_reason: config.load_reason,
            store,
            sync,
            bridge,
            commands,
            ui_events,
            metrics,
            channels,
            host_events,
            ui_commands,
            transport_factory,
        };
        Ok((app, ui_receiver, command_sender))
    }

    pub fn environment(&self) -> &'static Environment {
        self.env
    }

    pub fn ui_config(&self) -> UiConfig {
        UiConfig {
            base_url: self.env.base_url.to_string(),
            badge_color: self.env.badge_color.to_string(),
            origin_allowlist: self.env.origin_allowlist.to_string(),
            addon_version: self.addon_version.clone(),
            reload_interval_secs: CATALOG_RELOAD_INTERVAL_SECS,
        }
    }

    /// Announce the load reason, then optionally let recent navigation
    /// history pick the environment before the event loop starts.
    pub async fn startup<S: HistorySource>(&mut self, history: Option<&S>) -> Result<()> {
        match self.load_reason {
            LoadReason::Install => self.send(UiEvent::SelfInstalled),
            LoadReason::Enable => self.send(UiEvent::SelfEnabled),
            LoadReason::Upgrade => self.send(UiEvent::SelfUpgraded),
            LoadReason::Startup => {}
        }
        if matches!(self.load_reason, LoadReason::Install | LoadReason::Enable) {
            self.metrics.on_enable();
        }

        if let Some(source) = history
            && let Some(env) = detect_from_history(source, self.env.name).await
        {
            explab_logger::info(&format!("switching to last visited environment {}", env.name));
            self.reinitialize(env.name).await?;
        }
        Ok(())
    }

    /// Tear down and rebuild everything that depends on the active
    /// environment, then reconcile installed state against the new service.
    pub async fn reinitialize(&mut self, name: &str) -> Result<()> {
        let env = resolve(name);
        self.store.lock().await.set_environment(env.name)?;
        self.env = env;

        let transport = Arc::new((self.transport_factory)(env));
        self.sync = SyncManager::new(transport, Arc::clone(&self.store));
        self.bridge = LifecycleBridge::new(
            Arc::clone(&self.store),
            self.sync.clone(),
            self.ui_events.clone(),
            Arc::clone(&self.metrics),
            Arc::clone(&self.channels),
        );

        self.sync.sync_all().await;
        Ok(())
    }

    /// The cooperative event loop: host events and UI commands are handled
    /// one at a time, in arrival order. Runs until the host event channel
    /// closes or an uninstall-self command completes.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                maybe_event = self.host_events.recv() => match maybe_event {
                    Some(event) => {
                        if let Err(err) = self.bridge.handle(event).await {
                            explab_logger::warn(&format!("event handling failed: {err}"));
                        }
                    }
                    None => break,
                },
                maybe_command = self.ui_commands.recv() => match maybe_command {
                    Some(command) => {
                        let stop = matches!(command, UiCommand::UninstallSelf);
                        if let Err(err) = self.commands.handle(command).await {
                            explab_logger::warn(&format!("command handling failed: {err}"));
                        }
                        if stop {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        Ok(())
    }

    /// Mirror of startup for the teardown path. A plain shutdown keeps all
    /// state; disable reports the metric; uninstall cascades.
    pub async fn shutdown(&mut self, reason: ShutdownReason) -> Result<()> {
        if matches!(reason, ShutdownReason::Uninstall | ShutdownReason::Disable) {
            self.metrics.on_disable();
        }
        if matches!(reason, ShutdownReason::Uninstall) {
            self.commands.uninstall_installed().await;
            self.commands.teardown().await?;
        }
        Ok(())
    }

    fn send(&self, event: UiEvent) {
        if self.ui_events.send(event).is_err() {
            explab_logger::debug("ui channel closed, event dropped", true);
        }
    }
}
