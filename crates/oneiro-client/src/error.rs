use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("not signed in")]
    NotSignedIn,
    #[error("dream {0} is not in the feed")]
    NotInFeed(Uuid),
    #[error("a like for dream {0} is already in flight")]
    LikeInFlight(Uuid),
}
