use std::path::PathBuf;

use reqwest::{blocking::Response, StatusCode};

/// Errors raised by the remote service clients.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{service}: request failed")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service}: unexpected status {status}: {body}")]
    UnexpectedStatus {
        service: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("{service}: request rejected: {description}")]
    Rejected {
        service: &'static str,
        description: String,
    },
}

impl ServiceError {
    pub fn http(service: &'static str, source: reqwest::Error) -> Self {
        // reqwest puts the request url in its errors, which for telegram contains the bot token
        Self::Http {
            service,
            source: source.without_url(),
        }
    }

    /// Whether repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::UnexpectedStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Rejected { .. } => false,
        }
    }
}

/// Turns a non-success response into [`ServiceError::UnexpectedStatus`] carrying the body
pub fn check_status(service: &'static str, response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().unwrap_or_default();
        Err(ServiceError::UnexpectedStatus {
            service,
            status,
            body,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("image {0:?} does not exist or is not a file")]
    NotAFile(PathBuf),
    #[error("no files ending in {suffix:?} found in {dir:?}")]
    NoSnapshot { dir: PathBuf, suffix: String },
    #[error("image {0:?} is empty")]
    Empty(PathBuf),
}
