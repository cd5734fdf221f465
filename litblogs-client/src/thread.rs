use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    api::{CommentId, CommentService, PostId},
    Comment, Error, Forest, LikeState, PageInfo, Target, ThreadConfig,
};

/// The comment thread of one post view, bound to the comment service it loads from.
///
/// Clones share the same thread. Commands only hold the state lock while they
/// update it, never while waiting on the service, so commands on different
/// comments can run concurrently and settle in any order. After `discard`,
/// every command fails with `Error::Discarded` and answers still in flight
/// are dropped.
pub struct CommentThread<S> {
    service: Arc<S>,
    state: Arc<Mutex<Option<Forest>>>,
}

impl<S> Clone for CommentThread<S> {
    fn clone(&self) -> Self {
        CommentThread {
            service: self.service.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S: CommentService> CommentThread<S> {
    pub fn open(service: Arc<S>, post: PostId, config: ThreadConfig) -> CommentThread<S> {
        tracing::debug!(?post, "opening comment thread");
        CommentThread {
            service,
            state: Arc::new(Mutex::new(Some(Forest::new(post, config)))),
        }
    }

    /// Tear the thread down, returning its last state
    pub fn discard(&self) -> Option<Forest> {
        let res = self.state.lock().take();
        if let Some(forest) = &res {
            tracing::debug!(post = ?forest.post(), "discarded comment thread");
        }
        res
    }

    pub fn is_discarded(&self) -> bool {
        self.state.lock().is_none()
    }

    pub fn read<R>(&self, f: impl FnOnce(&Forest) -> R) -> Result<R, Error> {
        self.state.lock().as_ref().map(f).ok_or(Error::Discarded)
    }

    pub fn snapshot(&self) -> Result<Forest, Error> {
        self.read(|f| f.clone())
    }

    fn with_forest<R>(&self, f: impl FnOnce(&mut Forest) -> Result<R, Error>) -> Result<R, Error> {
        match self.state.lock().as_mut() {
            Some(forest) => f(forest),
            None => Err(Error::Discarded),
        }
    }

    fn settle<R>(&self, f: impl FnOnce(&mut Forest) -> Result<R, Error>) -> Result<R, Error> {
        let res = self.with_forest(f);
        if let Err(Error::Discarded) = &res {
            tracing::debug!("dropping answer received after the thread was discarded");
        }
        res
    }

    pub fn toggle_expand(&self, id: CommentId) -> Result<bool, Error> {
        self.with_forest(|f| f.toggle_expand(id))
    }

    pub fn toggle_replies(&self, id: CommentId) -> Result<bool, Error> {
        self.with_forest(|f| f.toggle_replies(id))
    }

    pub fn toggle_reply_form(&self, id: CommentId) -> Result<bool, Error> {
        self.with_forest(|f| f.toggle_reply_form(id))
    }

    pub fn set_draft(&self, target: Target, text: String) -> Result<(), Error> {
        self.with_forest(|f| f.set_draft(target, text))
    }

    /// (Re)load the first page of top-level comments
    pub async fn load_top_level(&self) -> Result<PageInfo, Error> {
        self.load_page(true).await
    }

    pub async fn load_more_comments(&self) -> Result<PageInfo, Error> {
        self.load_page(false).await
    }

    async fn load_page(&self, first: bool) -> Result<PageInfo, Error> {
        let req = self.with_forest(|f| f.begin_page(first))?;
        tracing::debug!(?req, "fetching comment page");
        let res = self
            .service
            .list_comments(req.post, req.skip, req.limit)
            .await;
        self.settle(|f| f.settle_page(req, res))
    }

    pub async fn load_more_replies(&self, id: CommentId) -> Result<Comment, Error> {
        let req = self.with_forest(|f| f.begin_replies(id))?;
        tracing::debug!(comment = ?id, skip = req.skip, "fetching replies");
        let res = self.service.list_replies(id, req.skip).await;
        self.settle(|f| f.settle_replies(id, req, res))
    }

    /// Returns the like state the server settled on. The optimistic state is
    /// visible through `read` for as long as the request is in flight.
    pub async fn toggle_like(&self, id: CommentId) -> Result<LikeState, Error> {
        let req = self.with_forest(|f| f.begin_like(id))?;
        tracing::debug!(comment = ?id, snapshot = ?req.snapshot, "toggling like");
        let res = self.service.toggle_like(id).await;
        self.settle(|f| f.settle_like(id, req, res))
    }

    pub async fn submit_reply(&self, target: Target, text: &str) -> Result<Comment, Error> {
        let new = self.with_forest(|f| f.begin_submit(target, text))?;
        tracing::debug!(?target, "submitting comment");
        let res = self.service.create_comment(new).await;
        self.settle(|f| f.settle_submit(target, res))
    }

    /// Load every page of comments and every reply of the thread
    pub async fn load_everything(&self) -> Result<(), Error> {
        if !self.read(|f| f.is_loaded())? {
            self.load_top_level().await?;
        }
        while self.read(|f| f.has_more())? {
            self.load_more_comments().await?;
        }
        let mut pending = self.read(|f| f.roots().iter().map(|c| c.id).collect::<Vec<_>>())?;
        while let Some(id) = pending.pop() {
            while self.read(|f| f.get(id).map_or(false, |c| c.has_more_replies()))? {
                self.load_more_replies(id).await?;
            }
            pending.extend(self.read(|f| {
                f.get(id)
                    .map(|c| c.replies().iter().map(|r| r.id).collect::<Vec<_>>())
                    .unwrap_or_default()
            })?);
        }
        Ok(())
    }
}
