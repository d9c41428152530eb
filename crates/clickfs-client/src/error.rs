use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("Could not decode response from {url}: {msg}")]
    Decode { url: String, msg: String },

    #[error("Invalid client configuration: {msg}")]
    InvalidConfig { msg: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// True for errors the remote side reported, as opposed to local setup problems.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ClientError::Http(_) | ClientError::Status { .. } | ClientError::Decode { .. }
        )
    }
}
