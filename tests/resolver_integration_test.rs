/// User resolution through the real Jira client against a mockito server.
mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use common::{client_for, client_with_timeout};
use issuebridge::domain::models::{AccountId, ResolutionPath, ResolverConfig};
use issuebridge::services::UserResolver;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn resolver_config() -> ResolverConfig {
    ResolverConfig {
        domain_suffix: "corp.example".to_string(),
        similarity_threshold: 0.6,
        max_candidates: 50,
    }
}

fn resolver(server: &ServerGuard) -> UserResolver {
    UserResolver::new(Arc::new(client_for(&server.url())), resolver_config())
}

fn email_lookup(email: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("query".into(), email.into()),
        Matcher::UrlEncoded("maxResults".into(), "1".into()),
    ])
}

#[tokio::test]
async fn test_email_pattern_hit_stops_lookup() {
    let mut server = Server::new_async().await;
    let mut misses = Vec::new();
    for email in [
        "Jane Doe@corp.example",
        "jane doe@corp.example",
        "JaneDoe@corp.example",
    ] {
        misses.push(
            server
                .mock("GET", "/rest/api/2/user/search")
                .match_query(email_lookup(email))
                .with_status(200)
                .with_body("[]")
                .expect(1)
                .create_async()
                .await,
        );
    }
    let hit = server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(email_lookup("jane.doe@corp.example"))
        .with_status(200)
        .with_body(
            json!([{ "accountId": "acc-7", "displayName": "Jane Doe", "emailAddress": "jane.doe@corp.example" }])
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let fuzzy = server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "50".into()))
        .expect(0)
        .create_async()
        .await;

    let found = resolver(&server).resolve_detailed("Jane Doe").await.unwrap();

    for miss in misses {
        miss.assert_async().await;
    }
    hit.assert_async().await;
    fuzzy.assert_async().await;
    assert_eq!(found.account_id, AccountId::new("acc-7"));
    assert_eq!(found.path, ResolutionPath::EmailPattern);
    assert!((found.score - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_email_failure_falls_back_to_search() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "1".into()))
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "Jane Doe".into()),
            Matcher::UrlEncoded("maxResults".into(), "50".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([
                { "accountId": "999", "displayName": "Janet Dow", "emailAddress": "" },
                { "accountId": "123", "displayName": "Jane Doe", "emailAddress": "jane.doe@corp.example" }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let found = resolver(&server).resolve("Jane Doe").await;

    failing.assert_async().await;
    assert_eq!(found, Some(AccountId::new("123")));
}

#[tokio::test]
async fn test_weak_candidates_do_not_match() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "1".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "50".into()))
        .with_status(200)
        .with_body(
            json!([{ "accountId": "5", "displayName": "Zed Quinn", "emailAddress": "zq@corp.example" }])
                .to_string(),
        )
        .create_async()
        .await;

    assert_eq!(resolver(&server).resolve("Jane Doe").await, None);
}

#[tokio::test]
async fn test_email_query_skips_pattern_phase() {
    let mut server = Server::new_async().await;
    let pattern = server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "1".into()))
        .expect(0)
        .create_async()
        .await;
    server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "jane.doe@corp.example".into()),
            Matcher::UrlEncoded("maxResults".into(), "50".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([{ "accountId": "123", "displayName": "Jane Doe", "emailAddress": "jane.doe@corp.example" }])
                .to_string(),
        )
        .create_async()
        .await;

    let found = resolver(&server)
        .resolve_detailed("jane.doe@corp.example")
        .await
        .unwrap();

    pattern.assert_async().await;
    assert_eq!(found.path, ResolutionPath::Fuzzy);
    assert_eq!(found.account_id, AccountId::new("123"));
}

#[tokio::test]
async fn test_unparseable_email_response_falls_back_to_search() {
    let mut server = Server::new_async().await;
    let garbled = server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json")
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "50".into()))
        .with_status(200)
        .with_body(
            json!([{ "accountId": "123", "displayName": "Jane Doe", "emailAddress": "jane.doe@corp.example" }])
                .to_string(),
        )
        .create_async()
        .await;

    let found = resolver(&server).resolve_detailed("Jane Doe").await.unwrap();

    garbled.assert_async().await;
    assert_eq!(found.account_id, AccountId::new("123"));
    assert_eq!(found.path, ResolutionPath::Fuzzy);
}

#[tokio::test]
async fn test_wrong_shape_search_response_resolves_to_none() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "1".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let search = server
        .mock("GET", "/rest/api/2/user/search")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "50".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"not":"a list"}"#)
        .expect(1)
        .create_async()
        .await;

    assert_eq!(resolver(&server).resolve("Jane Doe").await, None);
    search.assert_async().await;
}

#[tokio::test]
async fn test_slow_directory_times_out_to_none() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/api/2/user/search")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_secs(2));
            w.write_all(b"[]")
        })
        .create_async()
        .await;

    let resolver = UserResolver::new(
        Arc::new(client_with_timeout(&server.url(), Duration::from_millis(200))),
        resolver_config(),
    );

    let found = tokio::time::timeout(Duration::from_secs(10), resolver.resolve("Jane Doe"))
        .await
        .expect("resolve should finish once the request timeout fires");
    assert_eq!(found, None);
}
