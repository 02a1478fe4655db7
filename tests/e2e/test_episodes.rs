use crate::e2e::helpers;

use helpers::mocks::{anthropic_messages, anthropic_rewrite, elevenlabs_speech};
use helpers::{TestContext, SILENCE_MARKER};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;
use wiremock::matchers::body_string_contains;
use wiremock::ResponseTemplate;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_create_an_episode_from_html(ctx: &TestContext) {
    anthropic_messages()
        .and(body_string_contains("This damn parser"))
        .respond_with(anthropic_rewrite(
            "This darn parser finally works.",
            &["damn -> darn"],
        ))
        .expect(1)
        .mount(&ctx.providers)
        .await;
    elevenlabs_speech()
        .and(body_string_contains("This episode is based on a blog post"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"INTRO".to_vec()))
        .mount(&ctx.providers)
        .await;
    elevenlabs_speech()
        .and(body_string_contains("This darn parser finally works."))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MAIN".to_vec()))
        .mount(&ctx.providers)
        .await;

    let response = ctx
        .client
        .post(
            "/api/episodes",
            &json!({
                "title": "Parsing, Finally!",
                "html": "<html><head><style>p{}</style></head><body><p>This damn parser finally works.</p></body></html>",
                "blog_url": "https://blog.example.com/parsing"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);
    let summary = response.body.as_ref().unwrap();

    assert_eq!(summary.get("slug").and_then(|v| v.as_str()), Some("parsing-finally"));
    assert_eq!(summary.get("was_edited").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(summary.get("provider").and_then(|v| v.as_str()), Some("elevenlabs"));
    assert_eq!(
        summary.get("blog_url").and_then(|v| v.as_str()),
        Some("https://blog.example.com/parsing")
    );
    assert_eq!(
        summary.get("description").and_then(|v| v.as_str()),
        Some(
            "Based on a blog post. Lightly edited for language. Generated with \
             ElevenLabs text-to-speech and Claude AI for content preparation."
        )
    );
    assert!(summary.get("published_at").is_some());

    let mut expected = b"INTRO".to_vec();
    expected.extend_from_slice(SILENCE_MARKER);
    expected.extend_from_slice(b"MAIN");
    let written = tokio::fs::read(ctx.output_file("parsing-finally.mp3")).await.unwrap();
    assert_eq!(written, expected);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_cleaning_when_asked(ctx: &TestContext) {
    elevenlabs_speech()
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AUDIO".to_vec()))
        .mount(&ctx.providers)
        .await;

    let response = ctx
        .client
        .post(
            "/api/episodes",
            &json!({
                "title": "Raw Post",
                "text": "Leave this text alone.",
                "skip_clean": true
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);
    let summary = response.body.as_ref().unwrap();
    assert_eq!(summary.get("was_edited").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(ctx.provider_requests("/v1/messages").await, 0);
    assert_eq!(ctx.provider_requests("/v1/text-to-speech").await, 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_an_episode_without_a_body(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/episodes", &json!({"title": "Empty"}))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("text or html");
    assert_eq!(ctx.provider_requests("/").await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_missing_speech_credentials(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/episodes",
            &json!({
                "title": "Needs OpenAI",
                "text": "Some text.",
                "skip_clean": true,
                "provider": "openai"
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("OPENAI_API_KEY not set in environment");
    assert!(!ctx.output_file("needs-openai.mp3").exists());
}
