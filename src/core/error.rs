use thiserror::Error;

/// Failure of a single socket table query (one family, one protocol).
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("{family}/{protocol} socket query failed: {reason}")]
    SocketQuery {
        family: &'static str,
        protocol: &'static str,
        reason: String,
    },
}

/// Failures reported back from the row actions.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("no row selected")]
    NoSelection,
    #[error("no valid PID found ({0:?})")]
    InvalidPid(String),
    #[error("process {0} no longer exists")]
    NoSuchProcess(u32),
    #[error("killing process {0} is not supported on this platform")]
    KillUnsupported(u32),
    #[error("failed to kill process {0} (permission denied?)")]
    KillDenied(u32),
    #[error("no remote address available for lookup")]
    NoRemoteAddress,
    #[error("'{0}' command not found, please install it")]
    ToolMissing(&'static str),
    #[error("lookup of {ip} failed: {reason}")]
    LookupFailed { ip: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
