use thiserror::Error;

/// Error type for pipeline results.  Exit code 2 = policy block, 1 = tool error.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("policy block")]
    PolicyBlock,
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// A vision or advisory call did not produce a usable answer.
///
/// Never escapes the engine: callers get the best report available without it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExternalServiceError {
    #[error("{service} timed out after {after_ms} ms")]
    Timeout { service: &'static str, after_ms: u64 },

    #[error("{service} failed: {message}")]
    Failed {
        service: &'static str,
        message: String,
    },

    #[error("{service} call was cancelled")]
    Cancelled { service: &'static str },
}

impl ExternalServiceError {
    pub fn failed(service: &'static str, message: impl Into<String>) -> Self {
        ExternalServiceError::Failed {
            service,
            message: message.into(),
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            ExternalServiceError::Timeout { service, .. }
            | ExternalServiceError::Failed { service, .. }
            | ExternalServiceError::Cancelled { service } => service,
        }
    }
}

#[derive(Debug, Error)]
pub enum CertifyError {
    #[error("document {document_id} fails policy (score {score}); no certificate issued")]
    Failing { document_id: String, score: u8 },

    #[error("certificate issuance failed: {0:#}")]
    Issuer(#[source] anyhow::Error),
}
