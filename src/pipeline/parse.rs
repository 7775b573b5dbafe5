//! Reading the student name and message out of the model reply.
//!
//! The prompt asks for two labelled lines:
//!
//! ```text
//! Name: Sara Ali
//! Message: Great job today!
//! ```
//!
//! Models wrap these in Markdown, add preambles, or repeat them, so the scan
//! is forgiving: a label may appear anywhere in a line, and when a label
//! appears on several lines the last one wins. If no usable `Message:` line
//! is found, the whole reply becomes the message so the teacher always has
//! something to send.
//!
//! A line carrying both labels (`Name: Sara Message: Hi`) splits at the
//! `Message:` label: the name stops there. The message always runs to the
//! end of its line, so a drafted message that itself says `Name:` is kept
//! whole.

use crate::output::ParsedOutcome;
use crate::prompts::{MESSAGE_LABEL, NAME_LABEL};

/// Parse the raw model reply. Pure: same input, same output.
pub fn parse(raw: &str) -> ParsedOutcome {
    let mut student_name = String::new();
    let mut message_body = String::new();

    for line in raw.split('\n') {
        if let Some(value) = labelled_value(line, NAME_LABEL, Some(MESSAGE_LABEL)) {
            student_name = value;
        }
        if let Some(value) = labelled_value(line, MESSAGE_LABEL, None) {
            message_body = value;
        }
    }

    let fallback_used = message_body.is_empty();
    if fallback_used {
        message_body = raw.to_string();
    }

    ParsedOutcome {
        student_name,
        message_body,
        fallback_used,
    }
}

/// Text after the first `label` in `line`, up to a later `stop` label.
fn labelled_value(line: &str, label: &str, stop: Option<&str>) -> Option<String> {
    let start = line.find(label)? + label.len();
    let rest = &line[start..];
    let value = match stop.and_then(|stop| rest.find(stop)) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(value.trim().to_string())
}
