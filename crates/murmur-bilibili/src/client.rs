//! Bilibili HTTP client implementation.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{COOKIE, REFERER};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    ApiEnvelope, BilibiliError, CommentOrder, CommentPage, Credential, NewReply, RawComment,
    ReplyAddData,
};

/// Public API host (reply writes).
pub const DEFAULT_API_URL: &str = "https://api.bilibili.com";

/// Creator-center host (comment management).
pub const DEFAULT_MEMBER_URL: &str = "https://member.bilibili.com";

/// Resource type for video comments.
const VIDEO_RESOURCE_TYPE: u8 = 1;

/// Platform marker for web clients.
const WEB_PLATFORM: u8 = 1;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) murmur/0.1";

/// Client for the Bilibili endpoints used by murmur.
pub struct BilibiliClient {
    http: Client,
    api_url: String,
    member_url: String,
    credential: Credential,
}

impl BilibiliClient {
    /// Create a new client against the public Bilibili hosts.
    pub fn new(credential: Credential) -> Self {
        Self::with_urls(DEFAULT_API_URL, DEFAULT_MEMBER_URL, credential)
    }

    /// Create a new client against custom hosts.
    pub fn with_urls(
        api_url: impl Into<String>,
        member_url: impl Into<String>,
        credential: Credential,
    ) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            member_url: member_url.into().trim_end_matches('/').to_string(),
            credential,
        }
    }

    /// Get the public API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Get the creator-center base URL.
    pub fn member_url(&self) -> &str {
        &self.member_url
    }

    /// Fetch the first page of comments across all of the account's videos.
    #[tracing::instrument(skip(self))]
    pub async fn get_comments(
        &self,
        order: CommentOrder,
        page_size: u32,
    ) -> Result<CommentPage, BilibiliError> {
        let url = format!("{}/x/web/replies", self.member_url);

        let query_params: Vec<(&str, String)> = vec![
            ("order", order.as_str().to_string()),
            ("filter", "-1".to_string()),
            ("is_hidden", "0".to_string()),
            ("type", VIDEO_RESOURCE_TYPE.to_string()),
            ("bvid", String::new()),
            ("pn", "1".to_string()),
            ("ps", page_size.to_string()),
        ];

        let response = self
            .http
            .get(&url)
            .header(COOKIE, self.credential.cookie_header())
            .header(REFERER, format!("{}/", self.member_url))
            .query(&query_params)
            .send()
            .await?;

        let data: serde_json::Value = self.handle_response(response).await?;

        // The list is the only field we rely on; its absence means the
        // response shape changed or the session is not a creator session.
        let list = data.get("list").ok_or_else(|| {
            BilibiliError::InvalidResponse(format!("missing comment list: {}", data))
        })?;

        let comments: Vec<RawComment> = if list.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(list.clone())?
        };

        let total = data
            .get("pager")
            .and_then(|p| p.get("total"))
            .and_then(|t| t.as_u64());

        debug!(count = comments.len(), ?total, "fetched comment page");

        Ok(CommentPage { comments, total })
    }

    /// Post a reply to a comment.
    ///
    /// Returns the id of the new comment when the API reports one.
    #[tracing::instrument(skip(self, reply), fields(oid = reply.oid, parent = reply.parent, root = reply.root))]
    pub async fn send_reply(&self, reply: &NewReply) -> Result<Option<i64>, BilibiliError> {
        let url = format!("{}/x/v2/reply/add", self.api_url);

        let form: Vec<(&str, String)> = vec![
            ("oid", reply.oid.to_string()),
            ("type", VIDEO_RESOURCE_TYPE.to_string()),
            ("message", reply.message.clone()),
            ("plat", WEB_PLATFORM.to_string()),
            ("root", reply.root.to_string()),
            ("parent", reply.parent.to_string()),
            ("csrf", self.credential.bili_jct.clone()),
        ];

        let response = self
            .http
            .post(&url)
            .header(COOKIE, self.credential.cookie_header())
            .form(&form)
            .send()
            .await?;

        let data: Option<ReplyAddData> = self.handle_optional_response(response).await?;
        let rpid = data.and_then(|d| d.rpid);

        debug!(?rpid, "posted reply");
        Ok(rpid)
    }

    /// Handle a response whose envelope must carry `data`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BilibiliError> {
        self.handle_optional_response(response)
            .await?
            .ok_or_else(|| BilibiliError::InvalidResponse("response carried no data".to_string()))
    }

    /// Handle a response, checking HTTP status and the envelope code.
    async fn handle_optional_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>, BilibiliError> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.map_err(|e| {
                BilibiliError::InvalidResponse(format!(
                    "request failed ({}): failed to read response: {}",
                    status, e
                ))
            })?;
            return Err(BilibiliError::InvalidResponse(format!(
                "request failed ({}): {}",
                status, text
            )));
        }

        let text = response.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&text)?;

        if envelope.code != 0 {
            return Err(BilibiliError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }

        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> BilibiliClient {
        BilibiliClient::with_urls(
            server.uri(),
            server.uri(),
            Credential::new("test-sessdata", "test-csrf"),
        )
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = BilibiliClient::with_urls(
            "https://api.example.com/",
            "https://member.example.com/",
            Credential::new("a", "b"),
        );
        assert_eq!(client.api_url(), "https://api.example.com");
        assert_eq!(client.member_url(), "https://member.example.com");
    }

    #[test]
    fn test_client_default_urls() {
        let client = BilibiliClient::new(Credential::new("a", "b"));
        assert_eq!(client.api_url(), DEFAULT_API_URL);
        assert_eq!(client.member_url(), DEFAULT_MEMBER_URL);
    }

    #[tokio::test]
    async fn test_get_comments_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/x/web/replies"))
            .and(query_param("order", "ctime"))
            .and(query_param("ps", "20"))
            .and(header("cookie", "SESSDATA=test-sessdata; bili_jct=test-csrf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "message": "0",
                "data": {
                    "list": [
                        {
                            "rpid": 11, "mid": 100, "oid": 5, "root": 0, "parent": 0,
                            "content": {"message": "first"}, "title": "Video",
                            "member": {"uname": "viewer"}, "bvid": "BV1"
                        },
                        {
                            "rpid": 12, "mid": 200, "oid": 5, "root": 11, "parent": 11,
                            "content": {"message": "thanks"}, "title": "Video",
                            "member": {"uname": "creator"}, "bvid": "BV1"
                        }
                    ],
                    "pager": {"pn": 1, "ps": 20, "total": 2}
                }
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let page = client.get_comments(CommentOrder::Recent, 20).await.unwrap();

        assert_eq!(page.comments.len(), 2);
        assert_eq!(page.total, Some(2));
        assert_eq!(page.comments[0].rpid, 11);
        assert_eq!(page.comments[1].mid, "200");
        assert_eq!(page.comments[1].parent, 11);
    }

    #[tokio::test]
    async fn test_get_comments_null_list_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/x/web/replies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "data": {"list": null, "pager": {"total": 0}}
            })))
            .mount(&mock_server)
            .await;

        let page = test_client(&mock_server)
            .get_comments(CommentOrder::Recent, 20)
            .await
            .unwrap();
        assert!(page.comments.is_empty());
    }

    #[tokio::test]
    async fn test_get_comments_missing_list() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/x/web/replies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "data": {"pager": {"total": 0}}
            })))
            .mount(&mock_server)
            .await;

        let err = test_client(&mock_server)
            .get_comments(CommentOrder::Recent, 20)
            .await
            .unwrap_err();
        assert!(matches!(err, BilibiliError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_get_comments_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/x/web/replies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": -101,
                "message": "账号未登录"
            })))
            .mount(&mock_server)
            .await;

        let err = test_client(&mock_server)
            .get_comments(CommentOrder::Recent, 20)
            .await
            .unwrap_err();
        match err {
            BilibiliError::Api { code, .. } => assert_eq!(code, -101),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_comments_http_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/x/web/replies"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let err = test_client(&mock_server)
            .get_comments(CommentOrder::Recent, 20)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_send_reply_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/x/v2/reply/add"))
            .and(body_string_contains("csrf=test-csrf"))
            .and(body_string_contains("parent=11"))
            .and(body_string_contains("root=10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "message": "0",
                "data": {"rpid": 999, "rpid_str": "999"}
            })))
            .mount(&mock_server)
            .await;

        let reply = NewReply {
            oid: 5,
            parent: 11,
            root: 10,
            message: "thanks".to_string(),
        };
        let rpid = test_client(&mock_server).send_reply(&reply).await.unwrap();
        assert_eq!(rpid, Some(999));
    }

    #[tokio::test]
    async fn test_send_reply_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/x/v2/reply/add"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 12015,
                "message": "需要输入验证码"
            })))
            .mount(&mock_server)
            .await;

        let reply = NewReply {
            oid: 5,
            parent: 11,
            root: 11,
            message: "hi".to_string(),
        };
        let err = test_client(&mock_server).send_reply(&reply).await.unwrap_err();
        assert!(matches!(err, BilibiliError::Api { code: 12015, .. }));
    }
}
