use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Remote generation error: HTTP {status}: {body}")]
    RemoteGeneration { status: u16, body: String },
    #[error("Language model error: {0}")]
    Llm(String),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Empty response: {0}")]
    EmptyResponse(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// Whether a retry policy may run the failed operation again.
    ///
    /// Only failures on the far side of a network call qualify; decode,
    /// storage and configuration errors are final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StudioError::Transport(_)
                | StudioError::RemoteGeneration { .. }
                | StudioError::Llm(_)
                | StudioError::Schema(_)
                | StudioError::Serialization(_)
        )
    }
}

impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => StudioError::RemoteGeneration {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => StudioError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        StudioError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(StudioError::Transport("reset".into()).is_retryable());
        assert!(StudioError::RemoteGeneration {
            status: 503,
            body: "busy".into()
        }
        .is_retryable());
        assert!(StudioError::Schema("no final_prompt".into()).is_retryable());

        assert!(!StudioError::Decode("garbage".into()).is_retryable());
        assert!(!StudioError::Storage("disk full".into()).is_retryable());
        assert!(!StudioError::EmptyResponse("no image".into()).is_retryable());
        assert!(!StudioError::Config("HF_TOKEN".into()).is_retryable());
    }

    #[test]
    fn test_display_includes_status() {
        let err = StudioError::RemoteGeneration {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(
            err.to_string(),
            "Remote generation error: HTTP 502: bad gateway"
        );
    }
}
