use crate::e2e::helpers;

use helpers::assertions::assert_audio_headers;
use helpers::mocks::{elevenlabs_audio, elevenlabs_speech, NumberedSegments};
use helpers::{long_article, TestContext, SILENCE_MARKER};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;
use wiremock::matchers::body_partial_json;
use wiremock::ResponseTemplate;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_short_text_with_one_provider_call(ctx: &TestContext) {
    elevenlabs_audio(b"ID3-short-audio")
        .expect(1)
        .mount(&ctx.providers)
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/generate",
            &json!({
                "text": "Hello world. This is a test.",
                "output_name": "hello"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_audio_headers(&response.headers);
    response
        .assert_header("x-chunk-count", "1")
        .assert_header("x-provider", "elevenlabs")
        .assert_header("x-voice", "JBFqnCBsd6RMkjVDRZzb");
    assert_eq!(response.body_bytes, b"ID3-short-audio".to_vec());

    let written = tokio::fs::read(ctx.output_file("hello.mp3")).await.unwrap();
    assert_eq!(written, b"ID3-short-audio".to_vec());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_chunk_long_text_and_keep_segment_order(ctx: &TestContext) {
    elevenlabs_speech()
        .respond_with(NumberedSegments::new())
        .mount(&ctx.providers)
        .await;

    // ~1850 chars per paragraph, well past the 9000 char limit
    let text = long_article(12);

    let response = ctx
        .client
        .post(
            "/api/tts/generate",
            &json!({"text": text, "output_name": "long-post"}),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let chunks: usize = response.header("x-chunk-count").unwrap().parse().unwrap();
    assert!(chunks >= 3, "expected several chunks, got {chunks}");
    assert_eq!(ctx.provider_requests("/v1/text-to-speech").await, chunks);

    let expected: String = (0..chunks).map(|i| format!("SEG{i}")).collect();
    assert_eq!(String::from_utf8(response.body_bytes.clone()).unwrap(), expected);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_with_configuration_error_when_credentials_missing(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts/generate",
            &json!({
                "text": "Hello world.",
                "output_name": "no-key",
                "provider": "openai"
            }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_message("OPENAI_API_KEY not set in environment");

    assert_eq!(ctx.provider_requests("/v1/audio/speech").await, 0);
    assert!(!ctx.output_file("no-key.mp3").exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_surface_provider_failures_as_bad_gateway(ctx: &TestContext) {
    elevenlabs_speech()
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&ctx.providers)
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/generate",
            &json!({"text": "Hello world.", "output_name": "rejected"}),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("401");
    assert!(!ctx.output_file("rejected.mp3").exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_leave_no_output_when_a_later_chunk_fails(ctx: &TestContext) {
    elevenlabs_speech()
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"SEG".to_vec()))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&ctx.providers)
        .await;
    elevenlabs_speech()
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&ctx.providers)
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/generate",
            &json!({"text": long_article(12), "output_name": "partial"}),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(ctx.provider_requests("/v1/text-to-speech").await, 2);
    assert!(!ctx.output_file("partial.mp3").exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_join_intro_pause_and_main_text(ctx: &TestContext) {
    elevenlabs_speech()
        .and(body_partial_json(json!({"text": "Welcome to the show."})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"INTRO".to_vec()))
        .mount(&ctx.providers)
        .await;
    elevenlabs_speech()
        .and(body_partial_json(json!({"text": "The article body."})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MAIN".to_vec()))
        .mount(&ctx.providers)
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/generate-with-intro",
            &json!({
                "intro_text": "Welcome to the show.",
                "main_text": "The article body.",
                "output_name": "with-intro"
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let mut expected = b"INTRO".to_vec();
    expected.extend_from_slice(SILENCE_MARKER);
    expected.extend_from_slice(b"MAIN");
    assert_eq!(response.body_bytes, expected);
    assert!(ctx.output_file("with-intro.mp3").exists());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_the_pause_when_zero(ctx: &TestContext) {
    elevenlabs_speech()
        .and(body_partial_json(json!({"text": "Hi."})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"INTRO".to_vec()))
        .mount(&ctx.providers)
        .await;
    elevenlabs_speech()
        .and(body_partial_json(json!({"text": "Body."})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MAIN".to_vec()))
        .mount(&ctx.providers)
        .await;

    let response = ctx
        .client
        .post(
            "/api/tts/generate-with-intro",
            &json!({
                "intro_text": "Hi.",
                "main_text": "Body.",
                "output_name": "no-pause",
                "pause_seconds": 0.0
            }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body_bytes, b"INTROMAIN".to_vec());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts/generate",
            &json!({"text": "   ", "output_name": "empty"}),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Text cannot be empty");
    assert_eq!(ctx.provider_requests("/").await, 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_output_names_outside_the_output_dir(ctx: &TestContext) {
    for name in ["../escape", "nested/name", ".hidden"] {
        let response = ctx
            .client
            .post(
                "/api/tts/generate",
                &json!({"text": "Hello.", "output_name": name}),
            )
            .await
            .unwrap();

        response.assert_status(StatusCode::BAD_REQUEST);
    }
    assert_eq!(ctx.provider_requests("/").await, 0);
}
