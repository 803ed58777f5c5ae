//! Bilibili wire types.

use serde::{Deserialize, Deserializer, Serialize, de};

/// Cookie credential for an authenticated Bilibili session.
#[derive(Clone)]
pub struct Credential {
    /// `SESSDATA` session cookie.
    pub sessdata: String,
    /// `bili_jct` cookie, doubles as the CSRF token for writes.
    pub bili_jct: String,
}

impl Credential {
    pub fn new(sessdata: impl Into<String>, bili_jct: impl Into<String>) -> Self {
        Self {
            sessdata: sessdata.into(),
            bili_jct: bili_jct.into(),
        }
    }

    /// Render the `Cookie` header value.
    pub fn cookie_header(&self) -> String {
        format!("SESSDATA={}; bili_jct={}", self.sessdata, self.bili_jct)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("sessdata", &"<redacted>")
            .field("bili_jct", &"<redacted>")
            .finish()
    }
}

/// Standard Bilibili response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Sort order for the creator-center comment list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentOrder {
    /// Newest first.
    #[default]
    Recent,
    /// Most liked first.
    Likes,
    /// Most replied first.
    Replies,
}

impl CommentOrder {
    /// Query-string value understood by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recent => "ctime",
            Self::Likes => "like",
            Self::Replies => "count",
        }
    }
}

/// A comment as returned by the creator-center comment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    pub rpid: i64,
    /// Author account id. The API sends a number; some mirrors send a string.
    #[serde(deserialize_with = "string_or_number")]
    pub mid: String,
    pub oid: i64,
    #[serde(default)]
    pub root: i64,
    #[serde(default)]
    pub parent: i64,
    #[serde(default)]
    pub content: RawContent,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub member: RawMember,
    #[serde(default)]
    pub bvid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContent {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMember {
    #[serde(default)]
    pub uname: String,
}

/// One fetched page of creator-center comments.
#[derive(Debug, Clone, Default)]
pub struct CommentPage {
    pub comments: Vec<RawComment>,
    /// Total number of comments reported by the pager, if any.
    pub total: Option<u64>,
}

/// A reply to post through the reply-add endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    /// Content (video) the reply is attached to.
    pub oid: i64,
    /// Comment being replied to.
    pub parent: i64,
    /// Top-level comment of the thread.
    pub root: i64,
    /// Reply text.
    pub message: String,
}

/// `data` payload of a successful reply-add call.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyAddData {
    pub rpid: Option<i64>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
