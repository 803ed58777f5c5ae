//! Comment service: the remote source plus the reconciliation core.

use std::sync::Arc;

use async_trait::async_trait;
use murmur_bilibili::{BilibiliClient, BilibiliError, CommentOrder, NewReply};
use tracing::{error, info};

use crate::{Comment, CommentsError, NO_PARENT, ReplyOutcome, UnrepliedComments, reconcile};

/// Number of comments fetched per reconciliation run.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Remote store of comments that can also accept replies.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch one page of the newest comments on the account's content.
    async fn fetch_page(&self, page_size: u32) -> Result<Vec<Comment>, BilibiliError>;

    /// Post a reply and return the new comment id, if reported.
    async fn send_reply(&self, reply: &NewReply) -> Result<Option<i64>, BilibiliError>;
}

#[async_trait]
impl CommentSource for BilibiliClient {
    async fn fetch_page(&self, page_size: u32) -> Result<Vec<Comment>, BilibiliError> {
        let page = self.get_comments(CommentOrder::Recent, page_size).await?;
        Ok(page.comments.into_iter().map(Comment::from).collect())
    }

    async fn send_reply(&self, reply: &NewReply) -> Result<Option<i64>, BilibiliError> {
        BilibiliClient::send_reply(self, reply).await
    }
}

/// Finds unreplied comments and answers them.
#[derive(Clone)]
pub struct CommentService {
    source: Arc<dyn CommentSource>,
    owner_id: String,
    page_size: u32,
}

impl CommentService {
    /// Create a service for the account identified by `owner_id`.
    pub fn new(source: Arc<dyn CommentSource>, owner_id: impl Into<String>) -> Self {
        Self {
            source,
            owner_id: owner_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// The account whose comments count as replies.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Find unreplied comments for the configured account.
    pub async fn find_own_unreplied(&self) -> Result<UnrepliedComments, CommentsError> {
        self.find_unreplied(&self.owner_id).await
    }

    /// Fetch one page and return the comments `owner_id` has not answered.
    #[tracing::instrument(skip(self))]
    pub async fn find_unreplied(&self, owner_id: &str) -> Result<UnrepliedComments, CommentsError> {
        let page = self.source.fetch_page(self.page_size).await.map_err(|e| {
            error!(error = %e, "failed to fetch comment page");
            CommentsError::RemoteFetch(e)
        })?;

        let unreplied = reconcile::find_unreplied(&page, owner_id);
        info!(
            fetched = page.len(),
            unreplied = unreplied.len(),
            "reconciled comment page"
        );

        Ok(unreplied.into())
    }

    /// Reply to `target_comment_id` in the thread rooted at `root_id`.
    ///
    /// Never fails: transport and API errors come back as an unsuccessful
    /// [`ReplyOutcome`]. A `root_id` of [`NO_PARENT`] means the target is
    /// itself top-level.
    #[tracing::instrument(skip(self, text))]
    pub async fn submit_reply(
        &self,
        content_id: i64,
        target_comment_id: i64,
        text: &str,
        root_id: i64,
    ) -> ReplyOutcome {
        if text.trim().is_empty() {
            return ReplyOutcome::failed("reply text is empty");
        }

        let root = if root_id == NO_PARENT {
            target_comment_id
        } else {
            root_id
        };

        let reply = NewReply {
            oid: content_id,
            parent: target_comment_id,
            root,
            message: text.to_string(),
        };

        match self.source.send_reply(&reply).await {
            Ok(new_comment_id) => {
                info!(target = target_comment_id, ?new_comment_id, "replied to comment");
                ReplyOutcome::sent(new_comment_id)
            }
            Err(e) => {
                error!(target = target_comment_id, error = %e, "failed to reply to comment");
                ReplyOutcome::failed(format!("failed to reply to comment: {}", e))
            }
        }
    }
}
