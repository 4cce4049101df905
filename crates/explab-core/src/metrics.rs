/// Metrics collaborator interface. Events are keyed by addon id only; the
/// client identity never crosses this boundary.
pub trait MetricsSink: Send + Sync {
    fn on_enable(&self);
    fn on_disable(&self);
    fn experiment_enabled(&self, addon_id: &str);
    fn experiment_disabled(&self, addon_id: &str);
}

/// Sink that records nothing, logging at debug level instead.
pub struct LogMetrics {
    debug: bool,
}

impl LogMetrics {
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl MetricsSink for LogMetrics {
    fn on_enable(&self) {
        explab_logger::debug("metric: agent enabled", self.debug);
    }

    fn on_disable(&self) {
        explab_logger::debug("metric: agent disabled", self.debug);
    }

    fn experiment_enabled(&self, addon_id: &str) {
        explab_logger::debug(&format!("metric: experiment enabled {addon_id}"), self.debug);
    }

    fn experiment_disabled(&self, addon_id: &str) {
        explab_logger::debug(
            &format!("metric: experiment disabled {addon_id}"),
            self.debug,
        );
    }
}
