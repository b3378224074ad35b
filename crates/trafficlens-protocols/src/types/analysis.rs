//! AI analysis results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::EventKind;

/// The four-key reply the analysis prompt asks the model for.
///
/// Models answer these with strings, lists or nested objects, so each
/// field is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnalysis {
    #[serde(default)]
    pub summary: serde_json::Value,
    #[serde(default)]
    pub privacy_concerns: serde_json::Value,
    #[serde(default)]
    pub security_concerns: serde_json::Value,
    #[serde(default)]
    pub recommendations: serde_json::Value,
}

const STRUCTURED_KEYS: [&str; 4] = [
    "summary",
    "privacyConcerns",
    "securityConcerns",
    "recommendations",
];

/// Parsed model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The reply was a JSON object with at least one of the expected keys.
    Structured(StructuredAnalysis),
    /// Anything else, kept verbatim.
    Unstructured { text: String },
}

impl AnalysisOutcome {
    /// Classify a raw model reply.
    ///
    /// A reply wrapped in a Markdown code fence is unwrapped first.
    pub fn parse(content: &str) -> Self {
        let candidate = strip_code_fence(content);
        if let Ok(serde_json::Value::Object(map)) =
            serde_json::from_str::<serde_json::Value>(candidate)
        {
            if STRUCTURED_KEYS.iter().any(|k| map.contains_key(*k)) {
                if let Ok(analysis) =
                    serde_json::from_value::<StructuredAnalysis>(serde_json::Value::Object(map))
                {
                    return AnalysisOutcome::Structured(analysis);
                }
            }
        }
        AnalysisOutcome::Unstructured {
            text: content.to_string(),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, AnalysisOutcome::Structured(_))
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    match body.find('\n') {
        Some(pos) => body[pos + 1..].trim(),
        None => body.trim(),
    }
}

/// Aggregate facts sent alongside an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub total_events: usize,
    pub event_types: BTreeMap<EventKind, usize>,
    pub domains: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Successful `analyze_traffic` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis: AnalysisOutcome,
    pub metadata: AnalysisMetadata,
}
