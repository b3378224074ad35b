//! Form field redaction.

use std::collections::BTreeMap;

use trafficlens_config::CaptureConfig;

/// Masks sensitive form values and truncates the rest.
#[derive(Debug, Clone)]
pub struct Redactor {
    marker: String,
    sensitive: Vec<String>,
    value_limit: usize,
}

impl Redactor {
    pub fn new(marker: impl Into<String>, sensitive: &[String], value_limit: usize) -> Self {
        Self {
            marker: marker.into(),
            sensitive: sensitive.iter().map(|s| s.to_lowercase()).collect(),
            value_limit,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(
            config.redaction_marker.clone(),
            &config.sensitive_field_markers,
            config.field_value_limit,
        )
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether a field name (case-insensitive) contains a sensitive marker.
    pub fn is_sensitive(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.sensitive.iter().any(|m| name.contains(m.as_str()))
    }

    /// Redact or truncate a single value.
    pub fn redact_value(&self, name: &str, value: &str) -> String {
        if self.is_sensitive(name) {
            self.marker.clone()
        } else {
            value.chars().take(self.value_limit).collect()
        }
    }

    /// Apply the rule to every field. Later duplicates of a name win.
    pub fn redact_fields<I, K, V>(&self, fields: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        fields
            .into_iter()
            .map(|(name, value)| {
                let name = name.into();
                let value = self.redact_value(&name, value.as_ref());
                (name, value)
            })
            .collect()
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}
