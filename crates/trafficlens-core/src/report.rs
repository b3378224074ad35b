//! Plain-text traffic report.
//!
//! The report is a pure function of a [`Summary`]: the same summary always
//! renders the same text. Sections appear in a fixed order: context, event
//! type breakdown, domains, endpoints by kind, recent activity, statistics,
//! and the closing analysis request. Monitoring duration and request rate
//! use [`Summary::elapsed`], i.e. [`elapsed_since_start`](crate::summarizer::elapsed_since_start).

use std::fmt::Write;

use crate::summarizer::{Summary, format_duration};

const ANALYSIS_REQUEST: &str = "\
## Analysis Request:

Please analyze this web traffic data and provide insights on:

1. **Data Collection Patterns**: What types of data is this website collecting?
2. **Third-Party Services**: Which external services is the website communicating with?
3. **Privacy Implications**: What user data might be exposed to these services?
4. **Security Assessment**: Any suspicious or potentially malicious activity?
5. **Recommendations**: What should users be aware of, and what protections might help?

Please structure your response with clear sections and actionable insights.";

/// Rendered report, or the explicit absence of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The session holds no events.
    NoData,
    Text(String),
}

impl Report {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Report::NoData)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Report::NoData => None,
            Report::Text(text) => Some(text),
        }
    }
}

/// Render `summary` with at most `domain_limit` domains listed.
pub fn render_report(summary: &Summary, domain_limit: usize) -> Report {
    if summary.is_empty() {
        return Report::NoData;
    }

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, summary, domain_limit);
    Report::Text(out)
}

fn write_report(out: &mut String, summary: &Summary, domain_limit: usize) -> std::fmt::Result {
    writeln!(out, "# Web Traffic Analysis Request")?;
    writeln!(out)?;
    writeln!(out, "## Context")?;
    writeln!(
        out,
        "- **Website URL**: {}",
        summary.url.as_deref().unwrap_or("unknown")
    )?;
    writeln!(
        out,
        "- **Analysis Start Time**: {}",
        summary.start_time.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "- **Total Events Captured**: {}", summary.total_events)?;
    writeln!(
        out,
        "- **Monitoring Duration**: {}",
        format_duration(summary.elapsed)
    )?;
    writeln!(out)?;
    writeln!(out, "## Traffic Overview")?;

    writeln!(out)?;
    writeln!(out, "### Event Types Breakdown:")?;
    for (kind, count) in &summary.kind_counts {
        writeln!(
            out,
            "- **{}**: {} events ({:.1}%)",
            kind,
            count,
            summary.percentage(*kind)
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "### Top Domains Contacted ({} total):",
        summary.domains.len()
    )?;
    for domain in summary.domains.iter().take(domain_limit) {
        writeln!(out, "- {}", domain)?;
    }
    if summary.domains.len() > domain_limit {
        writeln!(out, "- ... and {} more", summary.domains.len() - domain_limit)?;
    }

    writeln!(out)?;
    writeln!(out, "### Key Endpoints by Type:")?;
    for (kind, endpoints) in &summary.endpoints_by_kind {
        if endpoints.is_empty() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "**{}**:", kind.as_str().to_uppercase())?;
        for endpoint in endpoints {
            writeln!(out, "- {}", endpoint)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "## Recent Activity (last {} events):",
        summary.recent.len()
    )?;
    for (index, event) in summary.recent.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "**Event #{}** [{}]:",
            summary.recent_offset + index + 1,
            event.kind.as_str().to_uppercase()
        )?;
        writeln!(out, "- **Time**: {}", event.timestamp.format("%H:%M:%S"))?;
        writeln!(out, "- **Method**: {}", event.method)?;
        if let Some(url) = &event.url {
            writeln!(out, "- **URL**: {}", url)?;
        }
        if let Some(code) = event.status_code {
            let line = event.status_line.as_deref().unwrap_or("");
            writeln!(out, "- **Response**: {}", format!("{} {}", code, line).trim_end())?;
        }
        if event.resource_type != trafficlens_protocols::DEFAULT_RESOURCE_TYPE {
            writeln!(out, "- **Content Type**: {}", event.resource_type)?;
        }
        if let Some(fields) = &event.fields {
            let json = serde_json::to_string_pretty(fields).unwrap_or_default();
            writeln!(out, "- **Form Data**: {}", json)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "## Statistics:")?;
    match summary.events_per_minute() {
        Some(rate) => writeln!(out, "- Requests per minute: {:.2}", rate)?,
        None => writeln!(out, "- Requests per minute: n/a")?,
    }

    writeln!(out)?;
    write!(out, "{}", ANALYSIS_REQUEST)
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
