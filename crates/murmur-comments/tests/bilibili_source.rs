//! End-to-end tests for the comment service against a mocked Bilibili API.

use std::sync::Arc;

use murmur_bilibili::{BilibiliClient, Credential};
use murmur_comments::{CommentService, CommentsError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> CommentService {
    let client = BilibiliClient::with_urls(
        server.uri(),
        server.uri(),
        Credential::new("sessdata", "csrf"),
    );
    CommentService::new(Arc::new(client), "200")
}

fn raw(rpid: i64, mid: i64, root: i64, parent: i64) -> serde_json::Value {
    serde_json::json!({
        "rpid": rpid,
        "mid": mid,
        "oid": 5,
        "root": root,
        "parent": parent,
        "content": {"message": format!("comment {rpid}")},
        "title": "Video",
        "member": {"uname": format!("user{mid}")},
        "bvid": "BV1"
    })
}

#[tokio::test]
async fn unreplied_comments_from_live_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x/web/replies"))
        .and(query_param("ps", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "data": {
                "list": [
                    raw(1, 100, 0, 0),
                    raw(2, 200, 1, 1),
                    raw(3, 101, 0, 0),
                    raw(4, 102, 3, 3)
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    let result = service(&mock_server).find_own_unreplied().await.unwrap();

    assert_eq!(result.count, 2);
    let ids: Vec<i64> = result.result.iter().map(|c| c.comment_id).collect();
    assert_eq!(ids, vec![3, 4]);
    assert_eq!(result.result[0].author_name, "user101");
}

#[tokio::test]
async fn malformed_page_is_a_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x/web/replies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let err = service(&mock_server).find_own_unreplied().await.unwrap_err();
    assert!(matches!(err, CommentsError::RemoteFetch(_)));
}

#[tokio::test]
async fn reply_failure_is_reported_not_raised() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/x/v2/reply/add"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let outcome = service(&mock_server).submit_reply(5, 3, "thanks", 3).await;
    assert!(!outcome.success);
    assert!(outcome.message.contains("500"));
}

#[tokio::test]
async fn reply_success_carries_new_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/x/v2/reply/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 0,
            "data": {"rpid": 77}
        })))
        .mount(&mock_server)
        .await;

    let outcome = service(&mock_server).submit_reply(5, 3, "thanks", 3).await;
    assert!(outcome.success);
    assert_eq!(outcome.new_comment_id, Some(77));
}
