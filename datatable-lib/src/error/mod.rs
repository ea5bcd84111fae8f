//! Error types

mod api;

pub use api::*;

/// Top-level error type for the data table library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error returned while talking to a list or sub-data endpoint.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// Returns the HTTP status code if this error came from an HTTP response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(api) => api.status_code(),
        }
    }
}
