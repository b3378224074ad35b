//! # TrafficLens Core
//!
//! Per-tab traffic buffering and everything derived from it.
//!
//! ## Components
//!
//! - [`classifier`] - tracking-parameter classification of URLs
//! - [`tracking_log`] - global, persisted log of tracking hits
//! - [`buffer`] - the per-tab event store
//! - [`correlator`] - response to request matching
//! - [`redaction`] - form field masking
//! - [`summarizer`] / [`report`] - aggregate statistics and the text report
//! - [`capture`] - host hook handlers, the only ingestion path
//! - [`bridge`] - prompts and timeouts around an [`AnalysisProvider`](trafficlens_protocols::AnalysisProvider)
//! - [`credentials`] - persisted API key
//! - [`feed`] - push or polled session snapshots

pub mod bridge;
pub mod buffer;
pub mod capture;
pub mod classifier;
pub mod correlator;
pub mod credentials;
pub mod feed;
pub mod redaction;
pub mod report;
pub mod summarizer;
pub mod tracking_log;
pub mod tracking_store;

pub use bridge::{AnalysisBridge, BridgeSettings, ProviderFactory};
pub use buffer::{StoreEvent, TrafficStore};
pub use capture::{CaptureHooks, FormSubmission, RequestNotice, ResponseNotice};
pub use classifier::{classify, is_tracking_param};
pub use credentials::{CredentialStore, KeySource};
pub use feed::{FeedUpdate, SessionFeed};
pub use redaction::Redactor;
pub use report::{Report, render_report};
pub use summarizer::{Summarizer, Summary, elapsed_since_start, format_duration, observed_span};
pub use tracking_log::TrackingLog;
pub use tracking_store::{FileTrackingStore, MemoryTrackingStore, TrackingLogStore};
