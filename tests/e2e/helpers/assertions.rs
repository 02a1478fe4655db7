use serde_json::Value;

#[allow(dead_code)]
pub fn assert_clean_result(result: &Value, expected_text: &str, cached: bool) {
    assert_eq!(
        result.get("cleaned_text").and_then(|v| v.as_str()),
        Some(expected_text)
    );
    assert_eq!(result.get("cached").and_then(|v| v.as_bool()), Some(cached));
    assert!(result.get("changed").and_then(|v| v.as_bool()).is_some());
    assert!(result.get("changes").and_then(|v| v.as_array()).is_some());
}

#[allow(dead_code)]
pub fn assert_audio_headers(headers: &std::collections::HashMap<String, String>) {
    assert_eq!(
        headers.get("content-type").map(String::as_str),
        Some("audio/mpeg")
    );
    assert!(headers.contains_key("x-chunk-count"), "Missing X-Chunk-Count header");
    assert!(headers.contains_key("x-provider"), "Missing X-Provider header");
    assert!(headers.contains_key("x-voice"), "Missing X-Voice header");
}
