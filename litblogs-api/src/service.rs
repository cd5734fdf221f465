use async_trait::async_trait;

use crate::{Comment, CommentId, CommentPage, LikeToggled, NewComment, PostId, ReplyPage};

/// The backend comment API, as seen by the user the implementor is authenticated as.
///
/// Failures reported by the backend itself carry a [`crate::Error`], which can be
/// recovered with `anyhow::Error::downcast_ref`. Any other failure (transport,
/// unparseable response) is opaque.
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Top-level comments of `post`, newest first
    async fn list_comments(
        &self,
        post: PostId,
        skip: usize,
        limit: usize,
    ) -> anyhow::Result<CommentPage>;

    /// Replies to `comment`, in server order, in pages of a server-defined size
    async fn list_replies(&self, comment: CommentId, skip: usize) -> anyhow::Result<ReplyPage>;

    async fn create_comment(&self, comment: NewComment) -> anyhow::Result<Comment>;

    async fn toggle_like(&self, comment: CommentId) -> anyhow::Result<LikeToggled>;
}
