mod common;

use std::time::Duration;

use common::TestServer;
use posting_engine::{FailureKind, FetchSettings, PageClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn client_returns_decoded_html_with_metadata() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/doc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<p>caf\xe9</p>".to_vec(), "text/html; charset=ISO-8859-1"),
            ),
    );

    let client = PageClient::new(FetchSettings::default()).unwrap();
    let url = server.url("/doc");

    let page = client.get(&url).expect("fetch ok");
    assert_eq!(page.original_url, url);
    assert_eq!(page.final_url, url);
    assert_eq!(page.redirect_count, 0);
    assert!(page.content_type.unwrap().starts_with("text/html"));
    assert_eq!(page.html, "<p>caf\u{e9}</p>");
}

#[test]
fn redirects_are_followed_and_counted() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new")),
    );
    server.mount(
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("moved", "text/html")),
    );

    let client = PageClient::new(FetchSettings::default()).unwrap();
    let page = client.get(&server.url("/old")).unwrap();

    assert_eq!(page.final_url, server.url("/new"));
    assert_eq!(page.redirect_count, 1);
    assert_eq!(page.html, "moved");
}

#[test]
fn client_fails_on_http_status() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404)),
    );

    let client = PageClient::new(FetchSettings::default()).unwrap();
    let err = client.get(&server.url("/missing")).unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[test]
fn client_times_out_on_slow_response() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET")).and(path("/slow")).respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("slow", "text/html"),
        ),
    );

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let client = PageClient::new(settings).unwrap();
    let err = client.get(&server.url("/slow")).unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn client_rejects_too_large_response() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/large"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("01234567890", "text/html")),
    );

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let client = PageClient::new(settings).unwrap();
    let err = client.get(&server.url("/large")).unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[test]
fn client_rejects_non_html() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json")),
    );

    let client = PageClient::new(FetchSettings::default()).unwrap();
    let err = client.get(&server.url("/data.json")).unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "application/json".to_string()
        }
    );
}

#[test]
fn malformed_url_is_rejected_before_any_request() {
    let client = PageClient::new(FetchSettings::default()).unwrap();
    let err = client.get("not a url").unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
