//! Error types for the edgequake-report2msg library.
//!
//! Only conditions that stop the *current* report from being processed are
//! errors. The two "soft" outcomes of a run are deliberately not errors:
//!
//! * the model ignored the `Message:` label → the whole reply becomes the
//!   message ([`crate::output::ParsedOutcome::fallback_used`]);
//! * no contact matched the student name →
//!   [`crate::output::Resolution::Unmatched`].
//!
//! Configuration problems found at startup (no API key, no contact sheet)
//! are reported as [`StartupWarning`]s so an interactive session can keep
//! running in a degraded mode.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// All errors that abort processing of a single report.
#[derive(Debug, Error)]
pub enum Report2MsgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input image was not found at the given path.
    #[error("Report image not found: '{path}'\nCheck the path exists and is readable.")]
    ImageNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a file path or an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes are not a JPEG or PNG image.
    #[error("Unsupported image '{source_name}': {detail}\nOnly JPEG and PNG reports are accepted.")]
    UnsupportedImage { source_name: String, detail: String },

    /// The image header looked right but decoding failed.
    #[error("Could not decode image '{source_name}': {detail}")]
    ImageDecodeFailed { source_name: String, detail: String },

    // ── Contact table errors ──────────────────────────────────────────────
    /// The contact sheet could not be read or parsed.
    #[error("Could not load contacts from '{path}': {detail}")]
    ContactsRead { path: PathBuf, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No provider is configured (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The model call failed (network, auth, quota, malformed response).
    #[error("Report extraction failed: {message}")]
    ExtractionFailed { message: String },

    /// The model call exceeded `api_timeout_secs`.
    #[error("Report extraction timed out after {secs}s")]
    ExtractionTimeout { secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A configuration problem detected while setting up a
/// [`crate::assistant::ReportAssistant`].
///
/// None of these stop the assistant from being built; they degrade it.
#[derive(Debug, Clone, Error, Serialize)]
pub enum StartupWarning {
    /// No model provider could be created. Every extraction will fail with
    /// [`Report2MsgError::ProviderNotConfigured`] until this is fixed.
    #[error("AI model is not available: {detail}\nSet GEMINI_API_KEY (or OPENAI_API_KEY / ANTHROPIC_API_KEY).")]
    ProviderUnavailable { detail: String },

    /// The contact sheet is missing or malformed. Every lookup will miss.
    #[error("Parent contacts not loaded from '{path}': {detail}")]
    ContactsUnavailable { path: PathBuf, detail: String },
}
