use uuid::Uuid;

use crate::{Author, Error, PostId, Time, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub author: Author,
    pub content: String,
    pub created_at: Time,

    pub like_count: u64,

    /// Whether the user the request was authenticated as likes this comment
    pub viewer_has_liked: bool,

    /// Number of direct replies, whether they are included below or not
    pub reply_count: u64,
    pub has_more_replies: bool,

    /// First replies, when the server chose to embed some
    #[serde(default)]
    pub replies: Vec<Comment>,
}

/// One page of the top-level comments of a post, newest first
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub total: u64,
    pub has_more: bool,
}

/// One page of replies to a comment, in server order
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ReplyPage {
    pub replies: Vec<Comment>,
    pub has_more: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub content: String,

    /// None for a comment on the post itself
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.content)?;
        if self.content.trim().is_empty() {
            return Err(Error::EmptyContent);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Liked,
    Unliked,
}

/// Authoritative like state of a comment after a toggle
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LikeToggled {
    pub like_count: u64,
    pub action: LikeAction,
}

impl LikeToggled {
    pub fn viewer_has_liked(&self) -> bool {
        self.action == LikeAction::Liked
    }
}
