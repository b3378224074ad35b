use super::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.server.port, 8765);
    assert_eq!(config.capture.buffer_capacity, 200);
    assert_eq!(config.capture.correlation_window, 10);
    assert_eq!(config.capture.field_value_limit, 100);
    assert_eq!(config.capture.redaction_marker, "<redacted>");
    assert_eq!(config.tracking.capacity, 200);
    assert_eq!(config.tracking.policy, CapacityPolicy::Global);
    assert_eq!(config.summary.recent_events, 20);
    assert_eq!(config.analysis.provider, ProviderKind::OpenAI);
    assert_eq!(config.analysis.timeout_secs, 60);
}

#[test]
fn test_default_exclusions() {
    let capture = CaptureConfig::default();
    assert!(capture.excluded_schemes.iter().any(|s| s == "chrome://"));
    assert!(capture.excluded_schemes.iter().any(|s| s == "chrome-extension://"));
    assert_eq!(capture.sensitive_field_markers.len(), 4);
}

#[test]
fn test_model_name_defaults_per_provider() {
    let mut analysis = AnalysisConfig::default();
    assert_eq!(analysis.model_name(), "gpt-4o-mini");

    analysis.provider = ProviderKind::Gemini;
    assert_eq!(analysis.model_name(), "gemini-2.0-flash");

    analysis.model = Some("gemini-1.5-pro".to_string());
    assert_eq!(analysis.model_name(), "gemini-1.5-pro");

    analysis.model = Some(String::new());
    assert_eq!(analysis.model_name(), "gemini-2.0-flash");
}

#[test]
fn test_policy_deserialization() {
    let tracking: TrackingConfig = toml::from_str("policy = \"per_origin\"").unwrap();
    assert_eq!(tracking.policy, CapacityPolicy::PerOrigin);
    assert_eq!(tracking.capacity, 200);
}

#[test]
fn test_provider_deserialization() {
    let analysis: AnalysisConfig = toml::from_str("provider = \"gemini\"").unwrap();
    assert_eq!(analysis.provider, ProviderKind::Gemini);
}
