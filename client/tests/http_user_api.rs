//! HTTP adapter tests against the in-process fake directory API.

mod support;

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use client::domain::ports::{UserApi, UserApiError};
use client::domain::{UserDraft, UserId};
use client::outbound::http::HttpUserApi;
use rstest::rstest;

use support::FakeServer;

fn adapter(server: &FakeServer) -> HttpUserApi {
    HttpUserApi::new(server.base_url.clone()).expect("adapter builds")
}

fn id(value: &str) -> UserId {
    UserId::new(value).expect("valid id")
}

#[actix_rt::test]
async fn lists_users_in_server_order_ignoring_extra_fields() {
    let server = FakeServer::start();
    server.api.seed("Jane", "jane@x.com", "1 Main St");
    server.api.seed("Ada", "ada@example.org", "12 Analytical Row");

    let users = adapter(&server).list_users().await.expect("list succeeds");

    let names: Vec<_> = users.iter().map(|user| user.name().to_owned()).collect();
    assert_eq!(names, vec!["Jane".to_owned(), "Ada".to_owned()]);
    assert_eq!(users[0].id(), &id("u1"));
    assert_eq!(server.api.requests(), vec!["GET /api/users".to_owned()]);
    server.stop().await;
}

#[actix_rt::test]
async fn creates_and_decodes_the_wrapped_record() {
    let server = FakeServer::start();

    let user = adapter(&server)
        .create_user(&UserDraft::new("Jane", "jane@x.com", "1 Main St"))
        .await
        .expect("create succeeds")
        .expect("record echoed");

    assert_eq!(user.id(), &id("u1"));
    assert_eq!(user.email(), "jane@x.com");
    assert_eq!(server.api.names(), vec!["Jane".to_owned()]);
    assert_eq!(server.api.requests(), vec!["POST /api/create/user".to_owned()]);
    server.stop().await;
}

#[actix_rt::test]
async fn create_answered_with_only_a_message_is_still_a_success() {
    let server = FakeServer::start();
    server.api.acknowledge_creates_without_record();

    let saved = adapter(&server)
        .create_user(&UserDraft::new("Jane", "jane@x.com", "1 Main St"))
        .await
        .expect("create succeeds");

    assert_eq!(saved, None);
    assert_eq!(server.api.names(), vec!["Jane".to_owned()]);
    server.stop().await;
}

#[actix_rt::test]
async fn duplicate_create_is_a_conflict_with_the_server_message() {
    let server = FakeServer::start();
    server.api.seed("Jane", "jane@x.com", "1 Main St");

    let error = adapter(&server)
        .create_user(&UserDraft::new("Janet", "jane@x.com", "2 Side St"))
        .await
        .expect_err("duplicate rejected");

    assert_eq!(
        error,
        UserApiError::conflict(Some("User already exists.".to_owned()))
    );
    server.stop().await;
}

#[actix_rt::test]
async fn update_without_a_record_in_the_body_echoes_the_draft() {
    let server = FakeServer::start();
    let stored = server.api.seed("Jane", "jane@x.com", "1 Main St");
    let draft = UserDraft::new("Jane Doe", "jane@x.com", "2 New St");

    let user = adapter(&server)
        .update_user(&id(&stored), &draft)
        .await
        .expect("update succeeds");

    assert_eq!(user.id(), &id(&stored));
    assert_eq!(user.to_draft(), draft);
    assert_eq!(server.api.names(), vec!["Jane Doe".to_owned()]);
    server.stop().await;
}

#[rstest]
#[case::get("get")]
#[case::update("update")]
#[case::delete("delete")]
#[actix_rt::test]
async fn missing_user_maps_to_not_found(#[case] operation: &str) {
    let server = FakeServer::start();
    let api = adapter(&server);
    let missing = id("u404");
    let draft = UserDraft::new("Jane", "jane@x.com", "1 Main St");

    let error = match operation {
        "get" => api.get_user(&missing).await.map(|_| ()),
        "update" => api.update_user(&missing, &draft).await.map(|_| ()),
        _ => api.delete_user(&missing).await,
    }
    .expect_err("missing user");

    assert_eq!(
        error,
        UserApiError::not_found(Some("User not found.".to_owned()))
    );
    server.stop().await;
}

#[actix_rt::test]
async fn deletes_by_id() {
    let server = FakeServer::start();
    let stored = server.api.seed("Jane", "jane@x.com", "1 Main St");

    adapter(&server)
        .delete_user(&id(&stored))
        .await
        .expect("delete succeeds");

    assert!(server.api.names().is_empty());
    assert_eq!(
        server.api.requests(),
        vec![format!("DELETE /api/delete/user/{stored}")]
    );
    server.stop().await;
}

#[rstest]
#[case::with_message(500, Some("db down"), Some("db down"))]
#[case::without_body(503, None, None)]
#[actix_rt::test]
async fn server_failures_keep_status_and_message(
    #[case] status: u16,
    #[case] message: Option<&str>,
    #[case] expected: Option<&str>,
) {
    let server = FakeServer::start();
    server.api.fail_next(status, message);

    let error = adapter(&server)
        .list_users()
        .await
        .expect_err("server failure");

    assert_eq!(
        error,
        UserApiError::server(status, expected.map(str::to_owned))
    );
    server.stop().await;
}

#[actix_rt::test]
async fn unreachable_server_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let base = url::Url::parse(&format!("http://{addr}/api")).expect("url");
    let api = HttpUserApi::with_timeout(base, Some(Duration::from_secs(2))).expect("adapter");

    let error = api.list_users().await.expect_err("nothing listening");

    assert!(
        matches!(error, UserApiError::Network { .. }),
        "got {error:?}"
    );
    assert_eq!(error.user_message("Error fetching users"), "Error fetching users");
}

/// Serve one response whose body stops short of its `Content-Length`.
fn serve_truncated_body(status_line: &'static str) -> url::Url {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut line = String::new();
        while reader.read_line(&mut line).expect("read request") > 2 {
            line.clear();
        }
        let response = format!("{status_line}\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n[{{\"_id\":");
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush response");
    });
    url::Url::parse(&format!("http://{addr}/api")).expect("url")
}

#[actix_rt::test]
async fn truncated_body_after_a_status_is_a_server_error() {
    let base = serve_truncated_body("HTTP/1.1 200 OK");
    let api = HttpUserApi::with_timeout(base, Some(Duration::from_secs(5))).expect("adapter");

    let error = api.list_users().await.expect_err("body cut short");

    assert_eq!(error, UserApiError::server(200_u16, None::<String>));
    assert_eq!(error.user_message("Error fetching users"), "Error fetching users");
}
