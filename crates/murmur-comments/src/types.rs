//! Comment types.

use murmur_bilibili::RawComment;
use serde::{Deserialize, Serialize};

/// Sentinel id meaning "no parent" on top-level comments.
pub const NO_PARENT: i64 = 0;

/// A comment on the creator's content.
///
/// Serialized with the field names the HTTP API has always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "rpid")]
    pub comment_id: i64,
    #[serde(rename = "mid")]
    pub author_id: String,
    #[serde(rename = "oid")]
    pub content_id: i64,
    #[serde(rename = "root")]
    pub root_id: i64,
    #[serde(rename = "parent")]
    pub parent_id: i64,
    #[serde(rename = "content")]
    pub text: String,
    /// Title of the content the comment is attached to.
    pub title: String,
    #[serde(rename = "uname")]
    pub author_name: String,
    #[serde(default)]
    pub bvid: String,
}

impl Comment {
    /// Whether this comment starts a thread.
    pub fn is_top_level(&self) -> bool {
        self.root_id == NO_PARENT
    }
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Self {
            comment_id: raw.rpid,
            author_id: raw.mid,
            content_id: raw.oid,
            root_id: raw.root,
            parent_id: raw.parent,
            text: raw.content.message,
            title: raw.title,
            author_name: raw.member.uname,
            bvid: raw.bvid,
        }
    }
}

/// Unreplied comments, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnrepliedComments {
    pub result: Vec<Comment>,
    pub count: usize,
}

impl From<Vec<Comment>> for UnrepliedComments {
    fn from(result: Vec<Comment>) -> Self {
        let count = result.len();
        Self { result, count }
    }
}

/// Outcome of a reply submission. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOutcome {
    pub success: bool,
    pub message: String,
    #[serde(rename = "rpid", skip_serializing_if = "Option::is_none", default)]
    pub new_comment_id: Option<i64>,
}

impl ReplyOutcome {
    pub fn sent(new_comment_id: Option<i64>) -> Self {
        Self {
            success: true,
            message: "reply sent".to_string(),
            new_comment_id,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            new_comment_id: None,
        }
    }
}
