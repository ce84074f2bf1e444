/// Failure reported by the emulated control plane.
///
/// `NotFound` is kept apart so callers can turn it into an existence check;
/// everything else is fatal to the running command.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{operation}: {resource} not found")]
    NotFound {
        operation: &'static str,
        resource: String,
    },

    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} returned a response without {field}")]
    MalformedResponse {
        operation: &'static str,
        field: &'static str,
    },
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
