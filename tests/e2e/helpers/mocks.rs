use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::{
    matchers::{header, method, path, path_regex},
    Mock, Request, Respond, ResponseTemplate,
};

/// Answers the n-th request with `SEG{n}` audio bytes.
pub struct NumberedSegments {
    served: AtomicUsize,
}

impl NumberedSegments {
    pub fn new() -> Self {
        Self {
            served: AtomicUsize::new(0),
        }
    }
}

impl Respond for NumberedSegments {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.served.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(200)
            .insert_header("content-type", "audio/mpeg")
            .set_body_bytes(format!("SEG{n}").into_bytes())
    }
}

pub fn elevenlabs_speech() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/text-to-speech/[^/]+$"))
        .and(header("xi-api-key", "test-elevenlabs-key"))
}

pub fn elevenlabs_audio(body: &[u8]) -> Mock {
    elevenlabs_speech().respond_with(
        ResponseTemplate::new(200)
            .insert_header("content-type", "audio/mpeg")
            .set_body_bytes(body.to_vec()),
    )
}

pub fn anthropic_messages() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-anthropic-key"))
}

/// Messages API answer whose text block is `text`
pub fn anthropic_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 120, "output_tokens": 60}
    }))
}

pub fn anthropic_rewrite(cleaned_text: &str, changes: &[&str]) -> ResponseTemplate {
    let answer = json!({
        "cleaned_text": cleaned_text,
        "changed": !changes.is_empty(),
        "changes": changes,
        "summary": if changes.is_empty() { "No changes needed" } else { "Softened language" }
    });
    anthropic_text(&format!("```json\n{}\n```", answer))
}
