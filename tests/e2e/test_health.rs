use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_audio_tool_readiness(ctx: &TestContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    // Depends on whether ffmpeg is installed where the tests run
    assert!(
        response.status == StatusCode::OK || response.status == StatusCode::SERVICE_UNAVAILABLE
    );

    let body = response.body.as_ref().unwrap();
    let ffmpeg = body.get("ffmpeg").and_then(|v| v.as_str()).unwrap();
    if response.status == StatusCode::OK {
        assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("ready"));
        assert_eq!(ffmpeg, "available");
    } else {
        assert_eq!(ffmpeg, "unavailable");
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_responses(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = ctx
        .client
        .post("/api/clean", &serde_json::json!({"text": ""}))
        .await
        .unwrap();
    response.assert_header_exists("x-request-id");
}
