use thiserror::Error;

/// Errors returned by a single inference call.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The request never produced a response (connect, DNS, reset, timeout).
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The service answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// A 2xx response whose body is not a valid inference payload. Not retried.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    /// Every attempt failed; `last` is the final failure.
    #[error("gave up after {attempts} attempts: {last}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: Box<InferenceError>,
    },

    /// The caller cancelled the request.
    #[error("inference cancelled")]
    Cancelled,
}

impl InferenceError {
    /// Transport failures and non-2xx statuses are retried identically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InferenceError::Transport { .. } | InferenceError::Status { .. }
        )
    }

    /// Returns `true` for [`InferenceError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InferenceError::Cancelled)
    }
}
