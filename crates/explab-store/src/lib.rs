pub mod experiment;
pub mod state;

pub use experiment::{Experiment, InstalledRecord};
pub use state::StateStore;
