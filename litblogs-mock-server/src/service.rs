use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use litblogs_api::{
    AuthToken, Comment, CommentId, CommentPage, CommentService, LikeToggled, NewComment, PostId,
    ReplyPage,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::SharedServer;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Op {
    ListComments,
    ListReplies,
    CreateComment,
    ToggleLike,
}

/// Keeps one held call waiting until released or dropped
#[must_use]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

#[derive(Default)]
struct Faults {
    calls: HashMap<Op, usize>,
    failures: HashMap<Op, usize>,
    holds: HashMap<Op, VecDeque<oneshot::Receiver<()>>>,
}

/// `CommentService` backed by a `MockServer`, acting as one logged-in user.
///
/// Calls can be counted, held back or made to fail, to observe what a client
/// does while a request is in flight or after it failed.
pub struct MockService {
    server: SharedServer,
    token: AuthToken,
    faults: Mutex<Faults>,
}

impl MockService {
    pub fn new(server: SharedServer, token: AuthToken) -> MockService {
        MockService {
            server,
            token,
            faults: Mutex::new(Faults::default()),
        }
    }

    pub fn server(&self) -> &SharedServer {
        &self.server
    }

    /// Number of calls to `op` received so far, including held and failed ones
    pub fn calls(&self, op: Op) -> usize {
        self.faults.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Make the next call to `op` fail after reaching the service
    pub fn fail_next(&self, op: Op) {
        *self.faults.lock().failures.entry(op).or_insert(0) += 1;
    }

    /// Make the next call to `op` wait until the returned gate is released
    pub fn hold_next(&self, op: Op) -> Gate {
        let (send, recv) = oneshot::channel();
        self.faults
            .lock()
            .holds
            .entry(op)
            .or_default()
            .push_back(recv);
        Gate(send)
    }

    async fn enter(&self, op: Op) -> anyhow::Result<()> {
        let hold = {
            let mut faults = self.faults.lock();
            *faults.calls.entry(op).or_insert(0) += 1;
            faults.holds.get_mut(&op).and_then(|h| h.pop_front())
        };
        if let Some(hold) = hold {
            tracing::trace!(?op, "holding call");
            // A dropped gate releases the call too
            let _ = hold.await;
        }
        let fail = {
            let mut faults = self.faults.lock();
            match faults.failures.get_mut(&op) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            }
        };
        if fail {
            anyhow::bail!("injected failure of {op:?}");
        }
        Ok(())
    }
}

#[async_trait]
impl CommentService for MockService {
    async fn list_comments(
        &self,
        post: PostId,
        skip: usize,
        limit: usize,
    ) -> anyhow::Result<CommentPage> {
        self.enter(Op::ListComments).await?;
        let res = self.server.lock().list_comments(self.token, post, skip, limit);
        Ok(res?)
    }

    async fn list_replies(&self, comment: CommentId, skip: usize) -> anyhow::Result<ReplyPage> {
        self.enter(Op::ListReplies).await?;
        let res = self.server.lock().list_replies(self.token, comment, skip);
        Ok(res?)
    }

    async fn create_comment(&self, comment: NewComment) -> anyhow::Result<Comment> {
        self.enter(Op::CreateComment).await?;
        let res = self.server.lock().create_comment(self.token, comment);
        Ok(res?)
    }

    async fn toggle_like(&self, comment: CommentId) -> anyhow::Result<LikeToggled> {
        self.enter(Op::ToggleLike).await?;
        let res = self.server.lock().toggle_like(self.token, comment);
        Ok(res?)
    }
}
