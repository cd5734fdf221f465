use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use litblogs_api::{
    self as api, AuthToken, Author, CommentId, CommentPage, Error, LikeAction, LikeToggled,
    NewComment, PostId, ReplyPage, Time, UserId, Uuid,
};
use parking_lot::Mutex;

mod service;
pub use service::{Gate, MockService, Op};

pub const DEFAULT_REPLY_PAGE_SIZE: usize = 5;

pub type SharedServer = Arc<Mutex<MockServer>>;

/// In-memory stand-in for the LitBlogs comment backend
pub struct MockServer {
    users: BTreeMap<UserId, DbUser>,
    posts: HashMap<PostId, Vec<CommentId>>,
    comments: HashMap<CommentId, DbComment>,
    reply_page_size: usize,
    last_time: Option<Time>,
}

#[derive(Debug)]
struct DbUser {
    name: String,
    display_name: Option<String>,
    sessions: HashSet<AuthToken>,
}

#[derive(Debug)]
struct DbComment {
    post: PostId,
    parent: Option<CommentId>,
    author: UserId,
    content: String,
    created_at: Time,
    likes: HashSet<UserId>,

    /// Oldest first
    replies: Vec<CommentId>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            posts: HashMap::new(),
            comments: HashMap::new(),
            reply_page_size: DEFAULT_REPLY_PAGE_SIZE,
            last_time: None,
        }
    }

    pub fn with_reply_page_size(mut self, size: usize) -> MockServer {
        self.reply_page_size = size;
        self
    }

    pub fn shared(self) -> SharedServer {
        Arc::new(Mutex::new(self))
    }

    /// Return the current number of users
    pub fn test_num_users(&self) -> usize {
        self.users.len()
    }

    pub fn admin_create_user(&mut self, name: String, display_name: Option<String>) -> UserId {
        let id = UserId(Uuid::new_v4());
        self.users.insert(
            id,
            DbUser {
                name,
                display_name,
                sessions: HashSet::new(),
            },
        );
        id
    }

    /// Sessions are handed out without any credential check
    pub fn login(&mut self, user: UserId) -> Result<AuthToken, Error> {
        let u = self.users.get_mut(&user).ok_or(Error::PermissionDenied)?;
        let tok = AuthToken(Uuid::new_v4());
        u.sessions.insert(tok);
        Ok(tok)
    }

    pub fn unauth(&mut self, tok: AuthToken) -> Result<(), Error> {
        for u in self.users.values_mut() {
            if u.sessions.remove(&tok) {
                return Ok(());
            }
        }
        Err(Error::PermissionDenied)
    }

    fn resolve(&self, tok: AuthToken) -> Result<UserId, Error> {
        for (id, u) in self.users.iter() {
            if u.sessions.contains(&tok) {
                return Ok(*id);
            }
        }
        Err(Error::PermissionDenied)
    }

    pub fn create_post(&mut self) -> PostId {
        let id = PostId(Uuid::new_v4());
        self.posts.insert(id, Vec::new());
        id
    }

    /// Strictly increasing timestamps, so that ordering by date is never ambiguous
    fn now(&mut self) -> Time {
        let now = Utc::now();
        let res = match self.last_time {
            Some(last) if last >= now => last + chrono::Duration::milliseconds(1),
            _ => now,
        };
        self.last_time = Some(res);
        res
    }

    fn author(&self, id: UserId) -> Author {
        match self.users.get(&id) {
            Some(u) => Author {
                id,
                name: u.name.clone(),
                display_name: u.display_name.clone(),
            },
            None => Author {
                id,
                name: String::from("[deleted]"),
                display_name: None,
            },
        }
    }

    fn comment(&self, id: CommentId) -> Result<&DbComment, Error> {
        self.comments.get(&id).ok_or(Error::UnknownComment(id.0))
    }

    /// Without any reply embedded
    fn render(&self, id: CommentId, viewer: Option<UserId>) -> Result<api::Comment, Error> {
        let c = self.comment(id)?;
        Ok(api::Comment {
            id,
            post_id: c.post,
            parent_id: c.parent,
            author: self.author(c.author),
            content: c.content.clone(),
            created_at: c.created_at,
            like_count: c.likes.len() as u64,
            viewer_has_liked: viewer.map_or(false, |v| c.likes.contains(&v)),
            reply_count: c.replies.len() as u64,
            has_more_replies: !c.replies.is_empty(),
            replies: Vec::new(),
        })
    }

    /// Newest first, ties broken by id
    fn top_level(&self, post: PostId) -> Result<Vec<CommentId>, Error> {
        let mut res = self
            .posts
            .get(&post)
            .ok_or(Error::UnknownPost(post.0))?
            .clone();
        res.sort_unstable_by_key(|id| {
            let date = self.comments.get(id).map(|c| c.created_at);
            (Reverse(date), *id)
        });
        Ok(res)
    }

    pub fn list_comments(
        &self,
        tok: AuthToken,
        post: PostId,
        skip: usize,
        limit: usize,
    ) -> Result<CommentPage, Error> {
        let viewer = self.resolve(tok)?;
        let ids = self.top_level(post)?;
        let comments = ids
            .iter()
            .skip(skip)
            .take(limit)
            .map(|id| self.render(*id, Some(viewer)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CommentPage {
            has_more: skip.saturating_add(comments.len()) < ids.len(),
            total: ids.len() as u64,
            comments,
        })
    }

    pub fn list_replies(
        &self,
        tok: AuthToken,
        comment: CommentId,
        skip: usize,
    ) -> Result<ReplyPage, Error> {
        let viewer = self.resolve(tok)?;
        let c = self.comment(comment)?;
        let replies = c
            .replies
            .iter()
            .skip(skip)
            .take(self.reply_page_size)
            .map(|id| self.render(*id, Some(viewer)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ReplyPage {
            has_more: skip.saturating_add(replies.len()) < c.replies.len(),
            replies,
        })
    }

    pub fn create_comment(&mut self, tok: AuthToken, new: NewComment) -> Result<api::Comment, Error> {
        let author = self.resolve(tok)?;
        new.validate()?;
        if !self.posts.contains_key(&new.post_id) {
            return Err(Error::UnknownPost(new.post_id.0));
        }
        if let Some(parent) = new.parent_id {
            if self.comment(parent)?.post != new.post_id {
                return Err(Error::UnknownComment(parent.0));
            }
        }
        let id = CommentId(Uuid::new_v4());
        let created_at = self.now();
        self.comments.insert(
            id,
            DbComment {
                post: new.post_id,
                parent: new.parent_id,
                author,
                content: String::from(new.content.trim()),
                created_at,
                likes: HashSet::new(),
                replies: Vec::new(),
            },
        );
        let siblings = match new.parent_id {
            None => self.posts.get_mut(&new.post_id),
            Some(parent) => self.comments.get_mut(&parent).map(|c| &mut c.replies),
        };
        siblings
            .ok_or(Error::UnknownPost(new.post_id.0))?
            .push(id);
        self.render(id, Some(author))
    }

    pub fn toggle_like(&mut self, tok: AuthToken, comment: CommentId) -> Result<LikeToggled, Error> {
        let user = self.resolve(tok)?;
        let c = self
            .comments
            .get_mut(&comment)
            .ok_or(Error::UnknownComment(comment.0))?;
        let action = match c.likes.remove(&user) {
            true => LikeAction::Unliked,
            false => {
                c.likes.insert(user);
                LikeAction::Liked
            }
        };
        Ok(LikeToggled {
            like_count: c.likes.len() as u64,
            action,
        })
    }

    /// The whole thread of `post` as seen by nobody in particular, with every reply embedded
    pub fn export_thread(&self, post: PostId) -> Result<Vec<api::Comment>, Error> {
        self.top_level(post)?
            .into_iter()
            .map(|id| self.export_comment(id))
            .collect()
    }

    fn export_comment(&self, id: CommentId) -> Result<api::Comment, Error> {
        let mut res = self.render(id, None)?;
        res.replies = self
            .comment(id)?
            .replies
            .iter()
            .map(|r| self.export_comment(*r))
            .collect::<Result<Vec<_>, _>>()?;
        res.has_more_replies = false;
        Ok(res)
    }
}
