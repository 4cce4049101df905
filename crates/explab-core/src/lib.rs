pub mod app;
pub mod bridge;
pub mod channels;
pub mod commands;
pub mod metrics;
pub mod sync;
pub mod ui;

#[cfg(test)]
pub(crate) mod testutil;

pub use app::{App, AppConfig, LoadReason, ShutdownReason, UiConfig};
pub use bridge::LifecycleBridge;
pub use channels::ExperimentChannels;
pub use commands::CommandHandler;
pub use metrics::MetricsSink;
pub use sync::{SyncManager, SyncReceipt};
pub use ui::{UiCommand, UiEvent};
