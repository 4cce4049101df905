/// Collaborator that recomputes which experiment message channels are live
/// after an experiment is enabled, disabled or removed.
pub trait ExperimentChannels: Send + Sync {
    fn update_experiment_channels(&self);
}

/// No-op refresher for embeddings without a channel subsystem.
pub struct NoChannels;

impl ExperimentChannels for NoChannels {
    fn update_experiment_channels(&self) {}
}
