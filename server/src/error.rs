use std::time::Duration;

use rocket::http::Status;
use shared::github::UpstreamError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CardError {
    #[error("Missing username parameter")]
    MissingUsername,
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("GitHub did not respond within {0:?}")]
    Timeout(Duration),
}

impl CardError {
    pub fn status(&self) -> Status {
        match self {
            Self::MissingUsername => Status::BadRequest,
            Self::UserNotFound(_) | Self::Upstream(_) | Self::Timeout(_) => {
                Status::InternalServerError
            }
        }
    }
}
