use std::time::Duration;

/// Failures at the smartctl process boundary
#[derive(Debug, thiserror::Error)]
pub enum SmartctlError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("smartctl did not finish within {0:?}")]
    TimedOut(Duration),
}
