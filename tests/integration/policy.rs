//! Address policy enforcement.

use castle_metadata::ResolveOptions;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{MIXED_HOST, private_url, public_url, resolver, url_on};

fn allow_private() -> ResolveOptions {
    ResolveOptions {
        allow_private_urls: true,
        ..ResolveOptions::default()
    }
}

#[tokio::test]
async fn test_private_url_is_refused_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("name: Secret\n", "app/castle"))
        .expect(0)
        .mount(&server)
        .await;

    let url = private_url(&server, "/game.castle");
    let err = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap_err();
    assert!(err.is_policy_violation());
    assert!(err.to_string().contains("Not a public URL"));
}

#[tokio::test]
async fn test_host_with_any_private_address_is_private() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let url = url_on(&server, MIXED_HOST, "/game.castle");
    let err = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap_err();
    assert!(err.is_policy_violation());
}

#[tokio::test]
async fn test_private_url_allowed_on_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dev/game.castle"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "name: Dev Build\nmain: http://127.0.0.1:9000/main.lua\n",
            "app/castle",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let url = private_url(&server, "/dev/game.castle");
    let metadata = resolver(&server).resolve_url(&url, allow_private()).await.unwrap();

    assert_eq!(metadata.get("name"), Some(&json!("Dev Build")));
    assert!(!metadata.url_is_public());
    assert!(!metadata.main_url_is_public());
    assert_eq!(metadata.main_url(), "http://127.0.0.1:9000/main.lua");
    assert_eq!(metadata.canonical_url(), None);
}

#[tokio::test]
async fn test_public_package_cannot_point_main_at_loopback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game.castle"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"main": "http://127.0.0.1/admin.lua"}"#, "app/castle+json"),
        )
        .mount(&server)
        .await;

    let url = public_url(&server, "/game.castle");
    let err = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap_err();
    assert!(err.is_policy_violation());
    assert!(err.to_string().contains("main URL"));
}

#[tokio::test]
async fn test_main_from_header_is_checked_too() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game.castle"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("name: Innocent\n", "app/castle")
                .insert_header("x-castle-main", "http://169.254.169.254/latest/meta-data"),
        )
        .mount(&server)
        .await;

    let url = public_url(&server, "/game.castle");
    let err = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap_err();
    assert!(err.is_policy_violation());
}

#[tokio::test]
async fn test_private_canonical_url_refused_even_with_private_allowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game.castle"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "canonicalUrl: http://192.168.0.10/game.castle\n",
            "app/castle+yaml",
        ))
        .mount(&server)
        .await;

    let url = private_url(&server, "/game.castle");
    let err = resolver(&server).resolve_url(&url, allow_private()).await.unwrap_err();
    assert!(err.is_policy_violation());
    assert!(err.to_string().contains("Canonical URL"));
}

#[tokio::test]
async fn test_public_canonical_url_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mirror/game.castle"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"canonicalUrl": "http://93.184.216.34/game.castle"}"#,
            "app/castle+json",
        ))
        .mount(&server)
        .await;

    let url = public_url(&server, "/mirror/game.castle");
    let metadata = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap();
    assert_eq!(metadata.canonical_url(), Some("http://93.184.216.34/game.castle"));
    assert_eq!(metadata.get("canonicalUrl"), Some(&json!("http://93.184.216.34/game.castle")));
}

#[tokio::test]
async fn test_redirect_to_private_address_is_refused() {
    let server = MockServer::start().await;
    let internal = format!("http://127.0.0.1:{}/internal", server.address().port());
    Mock::given(method("GET"))
        .and(path("/game.castle"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", internal.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/internal"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("name: Internal\n", "app/castle"))
        .expect(0)
        .mount(&server)
        .await;

    let url = public_url(&server, "/game.castle");
    let err = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap_err();
    assert!(err.is_policy_violation());
}
