use crate::{
    api::{self, CommentId},
    Target,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller's input was rejected before anything was sent
    #[error("Invalid input: {0}")]
    Validation(api::Error),

    /// The comment service could not be reached, or refused the request
    #[error("Comment service request failed: {0:#}")]
    Transport(anyhow::Error),

    /// The same operation is already running for this target. Nothing was done.
    #[error("Operation already in flight for {0:?}")]
    InFlight(Target),

    #[error("Comment {0:?} is not loaded in this thread")]
    UnknownComment(CommentId),

    #[error("Comment {0:?} has no more replies to load")]
    NoMoreReplies(CommentId),

    #[error("Post has no more comments to load")]
    NoMoreComments,

    #[error("Thread was discarded")]
    Discarded,
}

impl Error {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::InFlight(_))
    }

    /// Whether retrying the same command later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::InFlight(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Transport(e) => e.downcast_ref::<api::Error>() == Some(&api::Error::PermissionDenied),
            _ => false,
        }
    }
}
