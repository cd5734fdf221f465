use std::collections::{HashMap, HashSet};

use crate::{
    api::{self, CommentId, CommentPage, LikeToggled, NewComment, PostId, ReplyPage},
    Comment, Error, LikeState, ThreadConfig, ViewState,
};

/// Where a composer posts to
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Target {
    Post,
    Comment(CommentId),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageInfo {
    /// Number of comments the page added to the thread
    pub loaded: usize,
    pub total: u64,
    pub has_more: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct PageRequest {
    pub post: PostId,
    pub skip: usize,
    pub limit: usize,
    pub replace: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ReplyRequest {
    pub skip: usize,
    epoch: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct LikeRequest {
    /// State to roll back to
    pub snapshot: LikeState,
    epoch: u64,
}

/// The comments of one post, along with their presentation state.
///
/// Asynchronous operations are split in two: a `begin_*` method that checks the
/// in-flight guards and applies any optimistic change, and a `settle_*` method
/// that applies the service's answer (or rolls back) and releases the guards.
/// Nothing is locked in between, so operations on different comments interleave
/// freely.
#[derive(Clone, Debug)]
pub struct Forest {
    post: PostId,
    config: ThreadConfig,

    roots: Vec<Comment>,
    total: u64,
    has_more: bool,
    loaded: bool,
    loading_page: bool,

    /// Number of top-level comments received from the server, ie. the page cursor
    fetched: usize,

    /// Bumped whenever `roots` is replaced by a fresh first page. Answers to requests
    /// begun under an older epoch describe nodes that no longer exist.
    epoch: u64,

    /// Holds an entry for every comment in `roots`, recursively
    views: HashMap<CommentId, ViewState>,
    submitting: HashSet<Target>,
    drafts: HashMap<Target, String>,
}

fn register_views(
    views: &mut HashMap<CommentId, ViewState>,
    comments: &[Comment],
    depth: usize,
    config: &ThreadConfig,
) {
    for c in comments {
        views
            .entry(c.id)
            .or_insert_with(|| ViewState::for_depth(depth, config));
        register_views(views, &c.replies, depth + 1, config);
    }
}

impl Forest {
    pub fn new(post: PostId, config: ThreadConfig) -> Forest {
        Forest {
            post,
            config,
            roots: Vec::new(),
            total: 0,
            has_more: false,
            loaded: false,
            loading_page: false,
            fetched: 0,
            epoch: 0,
            views: HashMap::new(),
            submitting: HashSet::new(),
            drafts: HashMap::new(),
        }
    }

    pub fn post(&self) -> PostId {
        self.post
    }

    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    pub fn roots(&self) -> &[Comment] {
        &self.roots
    }

    /// Number of top-level comments on the post, loaded or not
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a first page of comments was received
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_loading_page(&self) -> bool {
        self.loading_page
    }

    pub fn is_submitting(&self, target: Target) -> bool {
        self.submitting.contains(&target)
    }

    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        Comment::find_in(&self.roots, &id)
    }

    pub fn depth(&self, id: CommentId) -> Option<usize> {
        Comment::depth_in(&self.roots, &id)
    }

    pub fn view(&self, id: CommentId) -> Option<ViewState> {
        self.views.get(&id).copied()
    }

    pub fn draft(&self, target: Target) -> Option<&str> {
        self.drafts.get(&target).map(|d| d as &str)
    }

    pub fn set_draft(&mut self, target: Target, text: String) -> Result<(), Error> {
        self.check_target(target)?;
        match text.is_empty() {
            true => self.drafts.remove(&target),
            false => self.drafts.insert(target, text),
        };
        Ok(())
    }

    fn check_target(&self, target: Target) -> Result<(), Error> {
        match target {
            Target::Post => Ok(()),
            Target::Comment(id) if self.views.contains_key(&id) => Ok(()),
            Target::Comment(id) => Err(Error::UnknownComment(id)),
        }
    }

    fn view_mut(&mut self, id: CommentId) -> Result<&mut ViewState, Error> {
        self.views.get_mut(&id).ok_or(Error::UnknownComment(id))
    }

    pub fn toggle_expand(&mut self, id: CommentId) -> Result<bool, Error> {
        let view = self.view_mut(id)?;
        view.expanded = !view.expanded;
        Ok(view.expanded)
    }

    pub fn toggle_replies(&mut self, id: CommentId) -> Result<bool, Error> {
        let view = self.view_mut(id)?;
        view.replies_visible = !view.replies_visible;
        if view.replies_visible {
            view.expanded = true;
        }
        Ok(view.replies_visible)
    }

    /// Closing the form keeps the draft around
    pub fn toggle_reply_form(&mut self, id: CommentId) -> Result<bool, Error> {
        let view = self.view_mut(id)?;
        view.reply_form_visible = !view.reply_form_visible;
        if view.reply_form_visible {
            view.expanded = true;
        }
        Ok(view.reply_form_visible)
    }

    /// Before the first page arrived, asking for more restarts from the first page
    pub(crate) fn begin_page(&mut self, first: bool) -> Result<PageRequest, Error> {
        if self.loading_page {
            return Err(Error::InFlight(Target::Post));
        }
        let replace = first || !self.loaded;
        if !replace && !self.has_more {
            return Err(Error::NoMoreComments);
        }
        self.loading_page = true;
        Ok(PageRequest {
            post: self.post,
            skip: if replace { 0 } else { self.fetched },
            limit: std::cmp::max(self.config.page_size, 1),
            replace,
        })
    }

    pub(crate) fn settle_page(
        &mut self,
        req: PageRequest,
        res: anyhow::Result<CommentPage>,
    ) -> Result<PageInfo, Error> {
        self.loading_page = false;
        let page = res.map_err(Error::Transport)?;
        let received = page.comments.len();
        let mut comments = page
            .comments
            .into_iter()
            .map(Comment::from)
            .collect::<Vec<_>>();
        let loaded = if req.replace {
            let mut ids = HashSet::new();
            Comment::collect_ids(&comments, &mut ids);
            self.views.retain(|id, _| ids.contains(id));
            self.roots = comments;
            self.fetched = received;
            self.epoch += 1;
            self.roots.len()
        } else {
            comments.retain(|c| Comment::find_in(&self.roots, &c.id).is_none());
            self.fetched += received;
            let loaded = comments.len();
            self.roots.extend(comments);
            loaded
        };
        register_views(&mut self.views, &self.roots, 0, &self.config);
        if page.has_more && received == 0 {
            tracing::warn!(
                post = ?self.post,
                "server claims more comments but sent an empty page, stopping pagination"
            );
        }
        self.has_more = page.has_more && received > 0;
        self.total = std::cmp::max(page.total, self.roots.len() as u64);
        self.loaded = true;
        tracing::debug!(post = ?self.post, loaded, total = self.total, "received comment page");
        Ok(PageInfo {
            loaded,
            total: self.total,
            has_more: self.has_more,
        })
    }

    /// Returns the pagination cursor to fetch from
    pub(crate) fn begin_replies(&mut self, id: CommentId) -> Result<ReplyRequest, Error> {
        let node = Comment::find_in(&self.roots, &id).ok_or(Error::UnknownComment(id))?;
        let (has_more, skip) = (node.has_more_replies, node.fetched);
        let view = self.view_mut(id)?;
        if view.loading_replies {
            return Err(Error::InFlight(Target::Comment(id)));
        }
        if !has_more {
            return Err(Error::NoMoreReplies(id));
        }
        view.loading_replies = true;
        Ok(ReplyRequest {
            skip,
            epoch: self.epoch,
        })
    }

    /// A page fetched at a cursor the node no longer has, eg. because the thread
    /// was reloaded meanwhile, is dropped and the current node returned as is.
    pub(crate) fn settle_replies(
        &mut self,
        id: CommentId,
        req: ReplyRequest,
        res: anyhow::Result<ReplyPage>,
    ) -> Result<Comment, Error> {
        if let Some(view) = self.views.get_mut(&id) {
            view.loading_replies = false;
        }
        let page = res.map_err(Error::Transport)?;
        let node = Comment::find_in(&self.roots, &id).ok_or(Error::UnknownComment(id))?;
        if req.epoch != self.epoch || req.skip != node.fetched {
            tracing::debug!(
                comment = ?id,
                ?req,
                fetched = node.fetched,
                "dropping reply page fetched before the thread was reloaded"
            );
            return Ok(node.clone());
        }
        let received = page.replies.len();
        let mut replies = page
            .replies
            .into_iter()
            .map(Comment::from)
            .collect::<Vec<_>>();
        replies.retain(|r| Comment::find_in(&self.roots, &r.id).is_none());
        let depth = self.depth(id).ok_or(Error::UnknownComment(id))?;
        let node = Comment::find_in_mut(&mut self.roots, &id).ok_or(Error::UnknownComment(id))?;
        register_views(&mut self.views, &replies, depth + 1, &self.config);
        tracing::debug!(comment = ?id, received, kept = replies.len(), "received reply page");
        node.append_replies(replies, received, page.has_more);
        Ok(node.clone())
    }

    /// Applies the optimistic like toggle, returning the state to roll back to
    pub(crate) fn begin_like(&mut self, id: CommentId) -> Result<LikeRequest, Error> {
        let view = self.views.get_mut(&id).ok_or(Error::UnknownComment(id))?;
        if view.like_in_flight {
            return Err(Error::InFlight(Target::Comment(id)));
        }
        let node = Comment::find_in_mut(&mut self.roots, &id).ok_or(Error::UnknownComment(id))?;
        let snapshot = node.likes;
        node.likes = snapshot.toggled();
        view.like_in_flight = true;
        Ok(LikeRequest {
            snapshot,
            epoch: self.epoch,
        })
    }

    /// On failure, only rolls back if the thread was not reloaded meanwhile: a reload
    /// brings in likes fresher than the snapshot.
    pub(crate) fn settle_like(
        &mut self,
        id: CommentId,
        req: LikeRequest,
        res: anyhow::Result<LikeToggled>,
    ) -> Result<LikeState, Error> {
        if let Some(view) = self.views.get_mut(&id) {
            view.like_in_flight = false;
        }
        let same_epoch = req.epoch == self.epoch;
        let node = Comment::find_in_mut(&mut self.roots, &id);
        match (res, node) {
            (Ok(toggled), Some(node)) => {
                node.likes = LikeState::from(toggled);
                Ok(node.likes)
            }
            (Ok(toggled), None) => Ok(LikeState::from(toggled)),
            (Err(err), Some(node)) if same_epoch => {
                tracing::debug!(comment = ?id, snapshot = ?req.snapshot, "like failed, rolling back");
                node.likes = req.snapshot;
                Err(Error::Transport(err))
            }
            (Err(err), Some(_)) => {
                tracing::debug!(comment = ?id, "like failed after a reload, keeping reloaded state");
                Err(Error::Transport(err))
            }
            (Err(err), None) => Err(Error::Transport(err)),
        }
    }

    pub(crate) fn begin_submit(&mut self, target: Target, text: &str) -> Result<NewComment, Error> {
        self.check_target(target)?;
        let new = NewComment {
            post_id: self.post,
            content: String::from(text.trim()),
            parent_id: match target {
                Target::Post => None,
                Target::Comment(id) => Some(id),
            },
        };
        new.validate().map_err(Error::Validation)?;
        if !self.submitting.insert(target) {
            return Err(Error::InFlight(target));
        }
        self.drafts.insert(target, String::from(text));
        Ok(new)
    }

    pub(crate) fn settle_submit(
        &mut self,
        target: Target,
        res: anyhow::Result<api::Comment>,
    ) -> Result<Comment, Error> {
        self.submitting.remove(&target);
        let created = Comment::from(res.map_err(Error::Transport)?);
        if let Some(existing) = self.get(created.id) {
            tracing::warn!(comment = ?created.id, "created comment is already in the thread");
            let existing = existing.clone();
            self.drafts.remove(&target);
            return Ok(existing);
        }
        match target {
            Target::Post => {
                register_views(
                    &mut self.views,
                    std::slice::from_ref(&created),
                    0,
                    &self.config,
                );
                self.roots.insert(0, created.clone());
                self.total += 1;
            }
            Target::Comment(parent) => {
                let depth = self.depth(parent).ok_or(Error::UnknownComment(parent))?;
                let node = Comment::find_in_mut(&mut self.roots, &parent)
                    .ok_or(Error::UnknownComment(parent))?;
                node.insert_reply(created.clone());
                register_views(
                    &mut self.views,
                    std::slice::from_ref(&created),
                    depth + 1,
                    &self.config,
                );
                let view = self.view_mut(parent)?;
                view.replies_visible = true;
                view.expanded = true;
                view.reply_form_visible = false;
            }
        }
        self.drafts.remove(&target);
        tracing::debug!(comment = ?created.id, ?target, "comment submitted");
        Ok(created)
    }
}
