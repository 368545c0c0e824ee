//! Successful resolutions through the full pipeline.

use castle_metadata::{MetadataError, ResolveOptions};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{public_url, resolver, resolver_with_limit};

const LUA_ENTRY: &str = "#!/usr/bin/env love\n\
-- just a note\n\
--[==[\n\
#castle\n\
name: Comet Chase\n\
tags: [arcade, space]\n\
]==]\n\
function love.draw() end\n";

#[tokio::test]
async fn test_yaml_descriptor_by_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pkg/game"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("name: Yaml Game\nmain: src/start.lua\n", "app/castle+yaml"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = public_url(&server, "/pkg/game");
    let metadata = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap();

    assert_eq!(metadata.get("name"), Some(&json!("Yaml Game")));
    assert_eq!(metadata.main_url(), public_url(&server, "/pkg/src/start.lua"));
    assert!(!metadata.requested_url_is_also_main_entry_point());
    assert!(metadata.url_is_public());
    assert!(metadata.main_url_is_public());
    assert_eq!(metadata.canonical_url(), Some(url.as_str()));
    assert_eq!(metadata.requested_from_url(), url);
}

#[tokio::test]
async fn test_descriptor_by_suffix_defaults_main() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game.castle"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"name": "Json Game"}"#, "text/plain"))
        .mount(&server)
        .await;

    let url = public_url(&server, "/game.castle");
    let metadata = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap();

    assert_eq!(metadata.get("name"), Some(&json!("Json Game")));
    assert_eq!(metadata.main_url(), public_url(&server, "/main.lua"));
}

#[tokio::test]
async fn test_invalid_json_with_json_content_type_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{name: nope", "app/castle+json"))
        .mount(&server)
        .await;

    let url = public_url(&server, "/broken");
    let err = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap_err();
    assert!(matches!(err, MetadataError::InvalidJson { .. }));
    assert!(err.is_parse());
}

#[tokio::test]
async fn test_unparseable_descriptor_yields_no_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weird.castle"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("- just\n- a list\n", "app/castle"))
        .mount(&server)
        .await;

    let url = public_url(&server, "/weird.castle");
    let metadata = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap();
    assert!(metadata.fields().is_empty());
    assert_eq!(metadata.main_url(), public_url(&server, "/main.lua"));
}

#[tokio::test]
async fn test_lua_source_is_self_hosting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/comet/main.lua"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LUA_ENTRY, "text/lua"))
        .mount(&server)
        .await;

    let url = public_url(&server, "/comet/main.lua");
    let options = ResolveOptions {
        include_source_code: true,
        ..ResolveOptions::default()
    };
    let metadata = resolver(&server).resolve_url(&url, options).await.unwrap();

    assert_eq!(metadata.get("name"), Some(&json!("Comet Chase")));
    assert_eq!(metadata.get("tags"), Some(&json!(["arcade", "space"])));
    assert!(metadata.requested_url_is_also_main_entry_point());
    assert_eq!(metadata.main_url(), url);
    assert_eq!(metadata.source_code(), Some(LUA_ENTRY));
}

#[tokio::test]
async fn test_lua_source_without_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain.lua"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("print('hi')\n", "application/octet-stream"))
        .mount(&server)
        .await;

    let url = public_url(&server, "/plain.lua");
    let metadata = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap();

    assert!(metadata.fields().is_empty());
    assert!(metadata.requested_url_is_also_main_entry_point());
    assert_eq!(metadata.source_code(), None);
}

#[tokio::test]
async fn test_headers_override_and_reserved_keys_are_dropped() {
    let server = MockServer::start().await;
    let body = r#"{"name": "From File", "$__mainUrl": "http://10.0.0.1/evil.lua"}"#;
    Mock::given(method("GET"))
        .and(path("/hdr.castle"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "app/castle+json")
                .insert_header("x-castle-name", "From Header")
                .insert_header("x-castle-short-description", "A game")
                .insert_header("x-castle-$__canonical-url", "http://10.0.0.1/"),
        )
        .mount(&server)
        .await;

    let url = public_url(&server, "/hdr.castle");
    let metadata = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap();

    assert_eq!(metadata.get("name"), Some(&json!("From Header")));
    assert_eq!(metadata.get("shortDescription"), Some(&json!("A game")));
    assert_eq!(metadata.main_url(), public_url(&server, "/main.lua"));
    assert_eq!(metadata.canonical_url(), Some(url.as_str()));

    let value = metadata.to_json().unwrap();
    let object = value.as_object().unwrap();
    let reserved: Vec<_> = object.keys().filter(|k| k.starts_with("$__")).collect();
    assert_eq!(reserved.len(), 6);
}

#[tokio::test]
async fn test_error_status_body_is_still_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.castle"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("name: Still Here\n", "app/castle"))
        .mount(&server)
        .await;

    let url = public_url(&server, "/gone.castle");
    let metadata = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap();
    assert_eq!(metadata.get("name"), Some(&json!("Still Here")));
}

#[tokio::test]
async fn test_public_redirect_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old.castle"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/game.castle"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new/game.castle"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("name: Moved\n", "app/castle+yaml"))
        .expect(1)
        .mount(&server)
        .await;

    let url = public_url(&server, "/old.castle");
    let metadata = resolver(&server).resolve_url(&url, ResolveOptions::default()).await.unwrap();
    assert_eq!(metadata.get("name"), Some(&json!("Moved")));
    assert_eq!(metadata.requested_from_url(), url);
}

#[tokio::test]
async fn test_redirect_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .expect(3)
        .mount(&server)
        .await;

    let url = public_url(&server, "/loop");
    let err = resolver_with_limit(&server, 2)
        .resolve_url(&url, ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MetadataError::TooManyRedirects { limit: 2, .. }));
    assert!(err.is_network());
}
