//! Integration tests for thread operations against a mock server
//!
//! **Coverage:**
//! - Fetch: section discovery, error mapping, bearer header
//! - Edit: append round trip, local validation short-circuit
//! - Create: form encoding, atomic folder filing, markup rejection
//! - Search: client-side limit enforcement
//! - Retry: 429 and 5xx call counts

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use serde_json::json;
use support::test_client;
use threadloom_client::NewThreadRequest;
use threadloom_domain::{EditMode, EditRequest, ThreadLoomError};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn thread_body(id: &str, title: &str, html: &str) -> serde_json::Value {
    json!({
        "thread": {"id": id, "title": title, "link": format!("https://docs.example.test/{id}")},
        "html": html,
    })
}

#[tokio::test]
async fn get_thread_discovers_sections_and_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1/threads/T1"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(thread_body(
            "T1",
            "Notes",
            r#"<p data-section-id="s1">A</p><p data-section-id="s2">B</p>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let thread = client.get_thread("T1").await.expect("thread");

    assert_eq!(thread.id, "T1");
    assert_eq!(thread.section_ids(), vec!["s1", "s2"]);
}

#[tokio::test]
async fn get_thread_maps_the_status_contract() {
    let server = MockServer::start().await;
    for (id, status) in [("gone", 404), ("locked", 403), ("anon", 401)] {
        Mock::given(method("GET"))
            .and(path(format!("/1/threads/{id}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let client = test_client(&server.uri());

    let err = client.get_thread("gone").await.expect_err("404");
    assert!(matches!(err, ThreadLoomError::NotFound(_)));
    assert!(err.to_string().contains("gone"), "error should name the id: {err}");

    let err = client.get_thread("locked").await.expect_err("403");
    assert!(matches!(err, ThreadLoomError::Forbidden(_)));

    let err = client.get_thread("anon").await.expect_err("401");
    assert!(matches!(err, ThreadLoomError::Unauthorized(_)));
    assert!(!err.to_string().contains("test-token"), "credential must never leak");
}

#[tokio::test]
async fn append_edit_round_trips_as_a_body_suffix() {
    let server = MockServer::start().await;

    // First fetch sees the original body
    Mock::given(method("GET"))
        .and(path("/1/threads/T1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(thread_body("T1", "Notes", "<p>start</p>")),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // The edit is a form-encoded write with append location
    Mock::given(method("POST"))
        .and(path("/1/threads/edit-document"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("thread_id=T1"))
        .and(body_string_contains("location=0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(thread_body(
            "T1",
            "Notes",
            "<p>start</p><p>appended</p>",
        )))
        .expect(1)
        .mount(&server)
        .await;

    // Fetches after the edit see the appended fragment
    Mock::given(method("GET"))
        .and(path("/1/threads/T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(thread_body(
            "T1",
            "Notes",
            "<p>start</p><p>appended</p>",
        )))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());

    let before = client.get_thread("T1").await.expect("before");
    assert_eq!(before.html, "<p>start</p>");

    let edited = client
        .edit_thread(&EditRequest::append("T1", "<p>appended</p>"))
        .await
        .expect("edit");
    assert!(edited.html.ends_with("<p>appended</p>"));

    let after = client.get_thread("T1").await.expect("after");
    assert!(after.html.starts_with(&before.html), "append preserves the prefix");
    assert!(after.html.ends_with("<p>appended</p>"), "fragment lands as a suffix");
}

#[tokio::test]
async fn section_edit_without_section_id_makes_zero_calls() {
    let server = MockServer::start().await;
    // No mocks mounted: any request at all would 404 loudly below.

    let client = test_client(&server.uri());
    for mode in [
        EditMode::AfterSection,
        EditMode::BeforeSection,
        EditMode::ReplaceSection,
        EditMode::DeleteSection,
    ] {
        let request = EditRequest {
            thread_id: "T1".into(),
            content: Some("<p>x</p>".into()),
            mode,
            section_id: None,
        };
        let err = client.edit_thread(&request).await.expect_err("must fail locally");
        assert!(matches!(err, ThreadLoomError::InvalidRequest(_)), "mode {mode:?}: {err}");
    }

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "local validation must not reach the network");
}

#[tokio::test]
async fn section_targeted_edit_sends_the_section_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/threads/edit-document"))
        .and(body_string_contains("location=4"))
        .and(body_string_contains("section_id=s2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(thread_body("T1", "Notes", "<p>new</p>")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = EditRequest::at_section(
        "T1",
        EditMode::ReplaceSection,
        "s2",
        Some("<p>new</p>".into()),
    );
    client.edit_thread(&request).await.expect("edit");
}

#[tokio::test]
async fn create_thread_files_into_folders_with_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/threads/new-document"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("format=html"))
        .and(body_string_contains("member_ids=F1%2CF2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(thread_body("T9", "Fresh", "<h1>Fresh</h1>")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let thread = client
        .create_thread(
            NewThreadRequest::new("<h1>Fresh</h1>")
                .title("Fresh")
                .in_folder("F1")
                .in_folder("F2"),
        )
        .await
        .expect("created");

    assert_eq!(thread.id, "T9");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "filing rides the create call");
}

#[tokio::test]
async fn rejected_markup_surfaces_as_invalid_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/threads/new-document"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unsupported tag: <marquee>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .create_thread(NewThreadRequest::new("<marquee>nope</marquee>"))
        .await
        .expect_err("rejected");

    assert!(matches!(err, ThreadLoomError::InvalidContent(_)));
    assert!(err.to_string().contains("marquee"));
}

#[tokio::test]
async fn search_never_yields_more_than_the_limit() {
    let server = MockServer::start().await;
    let hits: Vec<_> = (0..8)
        .map(|i| json!({"id": format!("T{i}"), "title": format!("hit {i}")}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/1/threads/search"))
        .and(query_param("query", "x"))
        .and(query_param("count", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "threads": hits })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results: Vec<_> = client.search_threads("x", 5).await.expect("search").collect();

    assert_eq!(results.len(), 5, "over-returning server is truncated client-side");
    assert_eq!(results[0].id, "T0");
}

#[tokio::test]
async fn rate_limit_retries_once_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1/threads/T1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/threads/T1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(thread_body("T1", "Notes", "<p>A</p>")),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let thread = client.get_thread("T1").await.expect("second attempt succeeds");

    assert_eq!(thread.id, "T1");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2, "exactly one retry");
}

#[tokio::test]
async fn persistent_rate_limit_exhausts_the_single_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1/threads/T1"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_thread("T1").await.expect_err("still limited");

    assert!(matches!(err, ThreadLoomError::RateLimited(_)));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn server_errors_exhaust_the_single_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1/threads/T1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_thread("T1").await.expect_err("unavailable");

    assert!(matches!(err, ThreadLoomError::ServiceUnavailable(_)));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2, "original call plus exactly one retry");
}

#[tokio::test]
async fn batch_fetch_preserves_request_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1/threads/"))
        .and(query_param("ids", "T2,T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "T1": thread_body("T1", "One", ""),
            "T2": thread_body("T2", "Two", ""),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let threads = client.get_threads(&["T2", "T1"]).await.expect("batch");

    let ids: Vec<_> = threads.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["T2", "T1"]);
}
