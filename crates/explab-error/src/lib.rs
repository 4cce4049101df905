use std::fmt;

#[derive(Debug)]
pub enum ExperimentError {
    UnknownExperiment(String),
    RemoteRejected(String, u16),
    Network(String),
    HostOperation(String, String),
    StateLoad(String),
    StateSave(String),
    ChannelClosed(String),
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownExperiment(id) => {
                write!(f, "Experiment '{id}' is not in the catalog")
            }
            Self::RemoteRejected(id, status) => {
                write!(f, "Remote service rejected sync for '{id}' with status {status}")
            }
            Self::Network(msg) => {
                write!(f, "Network error: {msg}")
            }
            Self::HostOperation(id, reason) => {
                write!(f, "Host package operation failed for '{id}': {reason}")
            }
            Self::StateLoad(msg) => {
                write!(f, "Failed to load agent state: {msg}")
            }
            Self::StateSave(msg) => {
                write!(f, "Failed to save agent state: {msg}")
            }
            Self::ChannelClosed(name) => {
                write!(f, "Channel '{name}' closed")
            }
        }
    }
}

impl std::error::Error for ExperimentError {}

impl From<anyhow::Error> for ExperimentError {
    fn from(err: anyhow::Error) -> Self {
        Self::StateLoad(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExperimentError>;
