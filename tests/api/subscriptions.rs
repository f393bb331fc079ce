use list_signup::routes::FAILURE_MESSAGE;
use list_signup::routes::SUCCESS_MESSAGE;
use secrecy::Secret;
use wiremock::matchers::any;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::check_redirect;
use crate::helpers::spawn_app;
use crate::helpers::spawn_app_with;

/// hash of "user@example.com"
const USER_HASH: &str = "b58996c504c5638798eb6b511e6f49af";

fn member_exists() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "type": "https://mailchimp.com/developer/marketing/docs/errors/",
        "title": "Member Exists",
        "status": 400,
        "detail": "user@example.com is already a list member.",
    }))
}

/// Subscribe, then tag with the defaults from `configuration/base.yaml`, then
/// show the success message
#[tokio::test]
async fn subscribe_ok() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(app.members_path()))
        .and(body_json(serde_json::json!({
            "email_address": "user@example.com",
            "status": "subscribed",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    Mock::given(method("POST"))
        .and(path(app.tags_path(USER_HASH)))
        .and(body_json(serde_json::json!({
            "tags": [
                {"name": "newsletter", "status": "active"},
                {"name": "website", "status": "active"},
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    let resp = app.post_email("user@example.com").await;
    check_redirect(&resp, "/subscriptions");

    let html = app.get_subscriptions_html().await;
    assert!(html.contains(SUCCESS_MESSAGE));
    assert!(!html.contains(FAILURE_MESSAGE));
}

/// Tagging addresses the member by the hash of the lower-cased address, while
/// the address itself is sent as typed
#[tokio::test]
async fn subscribe_mixed_case() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(app.members_path()))
        .and(body_json(serde_json::json!({
            "email_address": "User@Example.com",
            "status": "subscribed",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    Mock::given(method("POST"))
        .and(path(app.tags_path(USER_HASH)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    let resp = app.post_email("User@Example.com").await;
    check_redirect(&resp, "/subscriptions");
    assert!(app.get_subscriptions_html().await.contains(SUCCESS_MESSAGE));
}

#[tokio::test]
async fn subscribe_rejected_by_provider() {
    let app = spawn_app().await;

    Mock::given(path(app.members_path()))
        .respond_with(member_exists())
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    // tagging must not be attempted
    Mock::given(path(app.tags_path(USER_HASH)))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&app.marketing_server)
        .await;

    let resp = app.post_email("user@example.com").await;
    check_redirect(&resp, "/subscriptions");

    let html = app.get_subscriptions_html().await;
    assert!(html.contains(FAILURE_MESSAGE));
    assert!(!html.contains(SUCCESS_MESSAGE));
}

/// The member stays subscribed; only the user is told
#[tokio::test]
async fn tag_rejected_by_provider() {
    let app = spawn_app().await;

    Mock::given(path(app.members_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    Mock::given(path(app.tags_path(USER_HASH)))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    let resp = app.post_email("user@example.com").await;
    check_redirect(&resp, "/subscriptions");
    assert!(app.get_subscriptions_html().await.contains(FAILURE_MESSAGE));
}

/// Format is not checked locally; the provider decides
#[tokio::test]
async fn malformed_email_is_passed_through() {
    let app = spawn_app().await;

    Mock::given(path(app.members_path()))
        .and(body_json(serde_json::json!({
            "email_address": "not-an-email",
            "status": "subscribed",
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "title": "Invalid Resource",
            "status": 400,
            "detail": "Please provide a valid email address.",
        })))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    let resp = app.post_email("not-an-email").await;
    check_redirect(&resp, "/subscriptions");
    assert!(app.get_subscriptions_html().await.contains(FAILURE_MESSAGE));
}

#[tokio::test]
async fn subscribe_invalid() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.marketing_server)
        .await;

    for (body, msg) in [
        ("", "null"),
        ("name=john", "null email"),
        ("email=", "empty email"),
        ("email=%20%20", "blank email"),
    ] {
        let resp = app.post_subscriptions(body.to_owned()).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");
    }
}

/// Bad credentials are caught before anything is sent
#[tokio::test]
async fn invalid_credentials() {
    let app = spawn_app_with(|cfg| {
        cfg.marketing.api_key = Secret::new("not a key".to_string());
    })
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.marketing_server)
        .await;

    let resp = app.post_email("user@example.com").await;
    check_redirect(&resp, "/subscriptions");
    assert!(app.get_subscriptions_html().await.contains(FAILURE_MESSAGE));
}

#[tokio::test]
async fn custom_default_tags() {
    let app = spawn_app_with(|cfg| {
        cfg.marketing.default_tags = vec!["vip".to_string(), "newsletter".to_string()];
    })
    .await;

    Mock::given(path(app.members_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    Mock::given(path(app.tags_path(USER_HASH)))
        .and(body_json(serde_json::json!({
            "tags": [
                {"name": "vip", "status": "active"},
                {"name": "newsletter", "status": "active"},
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.marketing_server)
        .await;

    let resp = app.post_email("user@example.com").await;
    check_redirect(&resp, "/subscriptions");
}

/// Every method other than `POST` gets the form
#[tokio::test]
async fn form_is_rendered() {
    let app = spawn_app().await;

    for (method, path) in [
        (reqwest::Method::GET, "/"),
        (reqwest::Method::GET, "/subscriptions"),
        (reqwest::Method::PUT, "/subscriptions"),
        (reqwest::Method::DELETE, "/subscriptions"),
    ] {
        let resp = app.request(method.clone(), path).await;
        assert_eq!(resp.status().as_u16(), 200, "{method} {path}");
        let html = resp.text().await.unwrap();
        assert!(
            html.contains(r#"<form action="/subscriptions" method="post">"#),
            "{method} {path}"
        );
    }
}

/// Flash messages are shown once
#[tokio::test]
async fn message_is_not_repeated() {
    let app = spawn_app().await;

    Mock::given(path(app.members_path()))
        .respond_with(member_exists())
        .mount(&app.marketing_server)
        .await;

    app.post_email("user@example.com").await;
    assert!(app.get_subscriptions_html().await.contains(FAILURE_MESSAGE));
    assert!(!app.get_subscriptions_html().await.contains(FAILURE_MESSAGE));
}
