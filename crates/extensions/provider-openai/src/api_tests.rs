use super::*;

#[test]
fn test_request_skips_unset_options() {
    let request = ApiRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![ApiMessage::user("Hello")],
        max_tokens: None,
        temperature: None,
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["messages"][0]["role"], "user");
    assert!(json.get("max_tokens").is_none());
    assert!(json.get("temperature").is_none());
}

#[test]
fn test_response_first_text() {
    let body = r#"{
        "id": "chatcmpl-1",
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi"}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
    }"#;
    let response: ApiResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.first_text(), Some("Hi"));
    assert_eq!(response.model.as_deref(), Some("gpt-4o-mini"));
}

#[test]
fn test_response_without_choices() {
    let response: ApiResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
    assert!(response.first_text().is_none());
}

#[test]
fn test_error_message_extraction() {
    let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
    assert_eq!(error_message(body), "Incorrect API key provided");
    assert_eq!(error_message("upstream down"), "upstream down");
    assert_eq!(error_message("  "), "Unknown error");
}
