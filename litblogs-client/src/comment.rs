use std::collections::HashSet;

use crate::api::{self, Author, CommentId, PostId, Time};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LikeState {
    pub like_count: u64,
    pub viewer_has_liked: bool,
}

impl LikeState {
    /// What the viewer expects to see once their toggle went through
    pub fn toggled(self) -> LikeState {
        match self.viewer_has_liked {
            true => LikeState {
                like_count: self.like_count.saturating_sub(1),
                viewer_has_liked: false,
            },
            false => LikeState {
                like_count: self.like_count + 1,
                viewer_has_liked: true,
            },
        }
    }
}

impl From<api::LikeToggled> for LikeState {
    fn from(t: api::LikeToggled) -> LikeState {
        LikeState {
            like_count: t.like_count,
            viewer_has_liked: t.viewer_has_liked(),
        }
    }
}

/// A comment as held in a thread. Like and reply bookkeeping can only be changed
/// by the thread's own operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub parent_id: Option<CommentId>,
    pub author: Author,
    pub content: String,
    pub created_at: Time,

    pub(crate) likes: LikeState,

    /// Loaded replies: locally submitted ones first (newest first), then server order
    pub(crate) replies: Vec<Comment>,
    pub(crate) reply_count: u64,
    pub(crate) has_more_replies: bool,

    /// Number of replies received from the server so far, ie. the pagination cursor
    pub(crate) fetched: usize,
}

impl From<api::Comment> for Comment {
    fn from(c: api::Comment) -> Comment {
        let replies = c.replies.into_iter().map(Comment::from).collect::<Vec<_>>();
        let mut res = Comment {
            id: c.id,
            post_id: c.post_id,
            parent_id: c.parent_id,
            author: c.author,
            content: c.content,
            created_at: c.created_at,
            likes: LikeState {
                like_count: c.like_count,
                viewer_has_liked: c.viewer_has_liked,
            },
            fetched: replies.len(),
            replies,
            reply_count: c.reply_count,
            has_more_replies: c.has_more_replies,
        };
        res.normalize();
        res
    }
}

impl Comment {
    pub fn likes(&self) -> LikeState {
        self.likes
    }

    pub fn like_count(&self) -> u64 {
        self.likes.like_count
    }

    pub fn viewer_has_liked(&self) -> bool {
        self.likes.viewer_has_liked
    }

    pub fn replies(&self) -> &[Comment] {
        &self.replies
    }

    pub fn reply_count(&self) -> u64 {
        self.reply_count
    }

    pub fn has_more_replies(&self) -> bool {
        self.has_more_replies
    }

    /// Replies the server has that are not loaded yet
    pub fn remaining_replies(&self) -> u64 {
        self.reply_count.saturating_sub(self.replies.len() as u64)
    }

    /// Restore `reply_count >= replies.len()`, with equality once there is nothing
    /// more to fetch, whatever the server said
    fn normalize(&mut self) {
        let loaded = self.replies.len() as u64;
        if self.reply_count < loaded || (!self.has_more_replies && self.reply_count != loaded) {
            tracing::warn!(
                comment = ?self.id,
                reply_count = self.reply_count,
                loaded,
                has_more = self.has_more_replies,
                "reply count reported by server disagrees with loaded replies"
            );
            self.reply_count = loaded;
        }
    }

    /// Append one page of replies received from the server. `received` is the page
    /// length as sent by the server, before duplicates were filtered out of `page`.
    pub(crate) fn append_replies(&mut self, page: Vec<Comment>, received: usize, has_more: bool) {
        if has_more && received == 0 {
            tracing::warn!(
                comment = ?self.id,
                "server claims more replies but sent an empty page, stopping pagination"
            );
        }
        self.fetched += received;
        self.replies.extend(page);
        self.has_more_replies = has_more && received > 0;
        self.normalize();
    }

    /// Insert a freshly submitted reply, newest first
    pub(crate) fn insert_reply(&mut self, reply: Comment) {
        self.replies.insert(0, reply);
        self.reply_count += 1;
    }

    pub fn find_in<'a>(comments: &'a [Comment], id: &CommentId) -> Option<&'a Comment> {
        for c in comments.iter() {
            if c.id == *id {
                return Some(c);
            }
            if let Some(res) = Comment::find_in(&c.replies, id) {
                return Some(res);
            }
        }
        None
    }

    pub(crate) fn find_in_mut<'a>(
        comments: &'a mut [Comment],
        id: &CommentId,
    ) -> Option<&'a mut Comment> {
        for c in comments.iter_mut() {
            if c.id == *id {
                return Some(c);
            }
            if let Some(res) = Comment::find_in_mut(&mut c.replies, id) {
                return Some(res);
            }
        }
        None
    }

    /// Depth of comment `id` if it is in `comments`, top-level comments being at depth 0
    pub fn depth_in(comments: &[Comment], id: &CommentId) -> Option<usize> {
        for c in comments.iter() {
            if c.id == *id {
                return Some(0);
            }
            if let Some(d) = Comment::depth_in(&c.replies, id) {
                return Some(d + 1);
            }
        }
        None
    }

    pub(crate) fn collect_ids(comments: &[Comment], into: &mut HashSet<CommentId>) {
        for c in comments {
            into.insert(c.id);
            Comment::collect_ids(&c.replies, into);
        }
    }
}
