pub mod envs;
pub mod status;
pub mod sync;

pub use envs::EnvsHandler;
pub use status::StatusHandler;
pub use sync::SyncHandler;
