//! Result types produced by report processing.
//!
//! Everything here is `Serialize` so the CLI's `--json` mode (or a web
//! front-end) can hand the outcome over unchanged.

use serde::{Deserialize, Serialize};

/// Raw model reply for one report image, plus call diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Free-form text exactly as returned by the model.
    pub raw_text: String,
    /// Prompt tokens reported by the provider (0 if not reported).
    pub input_tokens: usize,
    /// Completion tokens reported by the provider (0 if not reported).
    pub output_tokens: usize,
    /// Wall-clock duration of the model call.
    pub duration_ms: u64,
}

/// Student name and message read from the model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOutcome {
    /// Text after the last `Name:` label, trimmed. Empty if no label was found.
    pub student_name: String,
    /// Text after the last `Message:` label, trimmed; the whole raw reply if
    /// that was empty or missing.
    pub message_body: String,
    /// True when `message_body` is the whole raw reply.
    pub fallback_used: bool,
}

/// Phone number found for a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedContact {
    /// Parent phone exactly as written in the contact sheet.
    pub phone: String,
}

/// How the contact lookup ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// A parent phone was found and a deep-link built.
    Matched {
        student_name: String,
        phone: String,
        link: String,
    },
    /// No contact matched; the message has to be sent by hand.
    Unmatched {
        student_name: String,
        message: String,
    },
}

impl Resolution {
    /// The deep-link, if one was built.
    pub fn link(&self) -> Option<&str> {
        match self {
            Resolution::Matched { link, .. } => Some(link),
            Resolution::Unmatched { .. } => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }
}

/// Everything produced for one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// The model reply and call statistics.
    pub extraction: ExtractionResult,
    /// Fields parsed from the reply.
    pub parsed: ParsedOutcome,
    /// Contact lookup result.
    pub resolution: Resolution,
}
