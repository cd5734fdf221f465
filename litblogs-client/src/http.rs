use anyhow::Context;
use async_trait::async_trait;

use crate::api::{
    self, AuthToken, Comment, CommentId, CommentPage, CommentService, LikeToggled, NewComment,
    PostId, ReplyPage,
};

/// `CommentService` talking JSON to the LitBlogs backend at `host`
#[derive(Clone, Debug)]
pub struct HttpService {
    client: reqwest::Client,
    host: String,
    token: AuthToken,
}

impl HttpService {
    pub fn new(host: String, token: AuthToken) -> HttpService {
        HttpService {
            client: reqwest::Client::new(),
            host: String::from(host.trim_end_matches('/')),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.host, path)
    }

    async fn send<R>(&self, req: reqwest::RequestBuilder, what: &str) -> anyhow::Result<R>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        let resp = req
            .bearer_auth(self.token.0)
            .send()
            .await
            .with_context(|| format!("sending {what} request"))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("receiving {what} response"))?;
        if !status.is_success() {
            let err = api::Error::parse(&body).unwrap_or_else(|err| {
                tracing::debug!(?err, ?status, "failed parsing error response");
                api::Error::Unknown(format!("server answered {status}"))
            });
            return Err(anyhow::Error::new(err).context(format!("{what} request was rejected")));
        }
        serde_json::from_slice(&body).with_context(|| format!("parsing {what} response"))
    }
}

#[async_trait]
impl CommentService for HttpService {
    async fn list_comments(
        &self,
        post: PostId,
        skip: usize,
        limit: usize,
    ) -> anyhow::Result<CommentPage> {
        let req = self
            .client
            .get(self.url(&format!("posts/{}/comments", post.0)))
            .query(&[("skip", skip), ("limit", limit)]);
        self.send(req, "comment listing").await
    }

    async fn list_replies(&self, comment: CommentId, skip: usize) -> anyhow::Result<ReplyPage> {
        let req = self
            .client
            .get(self.url(&format!("comments/{}/replies", comment.0)))
            .query(&[("skip", skip)]);
        self.send(req, "reply listing").await
    }

    async fn create_comment(&self, comment: NewComment) -> anyhow::Result<Comment> {
        let req = self
            .client
            .post(self.url(&format!("posts/{}/comments", comment.post_id.0)))
            .json(&comment);
        self.send(req, "comment creation").await
    }

    async fn toggle_like(&self, comment: CommentId) -> anyhow::Result<LikeToggled> {
        let req = self
            .client
            .post(self.url(&format!("comments/{}/like", comment.0)));
        self.send(req, "like").await
    }
}
