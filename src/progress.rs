//! Progress-callback trait for report processing events.
//!
//! Inject an [`Arc<dyn ReportProgressCallback>`] via
//! [`crate::config::ReportConfigBuilder::progress_callback`] to be told when
//! the model call starts and finishes and how the contact lookup went. The
//! CLI uses it to drive a spinner; a web front-end could forward the events
//! to a websocket instead.
//!
//! # Example
//!
//! ```rust
//! use edgequake_report2msg::{ReportConfig, ReportProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ReportProgressCallback for Printer {
//!     fn on_extraction_complete(&self, chars: usize) {
//!         eprintln!("model replied with {chars} chars");
//!     }
//! }
//!
//! let config = ReportConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ReportProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by [`crate::assistant::ReportAssistant`] while processing a report.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ReportProgressCallback: Send + Sync {
    /// Called just before the image is sent to the model.
    fn on_extraction_start(&self, source: &str) {
        let _ = source;
    }

    /// Called when the model replied.
    ///
    /// # Arguments
    /// * `chars` — character count of the raw reply
    fn on_extraction_complete(&self, chars: usize) {
        let _ = chars;
    }

    /// Called when the model call failed.
    fn on_extraction_error(&self, error: &str) {
        let _ = error;
    }

    /// Called after the contact lookup.
    ///
    /// # Arguments
    /// * `student_name` — the parsed name (may be empty)
    /// * `matched`      — whether a parent phone number was found
    fn on_resolution(&self, student_name: &str, matched: bool) {
        let _ = (student_name, matched);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ReportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReportConfig`].
pub type ProgressCallback = Arc<dyn ReportProgressCallback>;
