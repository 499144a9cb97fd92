//! API server error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}
