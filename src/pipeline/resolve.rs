//! Contact lookup and deep-link construction.
//!
//! ## Matching
//!
//! A contact matches when the parsed student name is a non-empty,
//! case-sensitive substring of the contact's name. The first match in sheet
//! order wins. Substring matching tolerates the model returning a shorter
//! form of the name ("Sara Ali" for "Sara Ali Mohamed"), at the cost of
//! false positives when one student's name is contained in another's
//! ("Ali" matches "Ali Hassan" and "Sara Ali"). Keep the sheet ordered with
//! that in mind.
//!
//! ## Links
//!
//! `https://<host>/<phone>?text=<message>`, with the phone inserted verbatim
//! and the message percent-encoded (everything except unreserved
//! characters, so spaces become `%20` and `/` becomes `%2F`).

use crate::contacts::ContactRecord;
use crate::output::{ParsedOutcome, ResolvedContact, Resolution};
use tracing::debug;

/// Find the parent phone for `student_name`.
pub fn resolve(student_name: &str, contacts: &[ContactRecord]) -> Option<ResolvedContact> {
    if student_name.is_empty() {
        return None;
    }
    contacts
        .iter()
        .find(|c| !c.student_name.is_empty() && c.student_name.contains(student_name))
        .map(|c| ResolvedContact {
            phone: c.parent_phone.clone(),
        })
}

/// Build a messaging deep-link for `phone` pre-filled with `message`.
pub fn build_deep_link(host: &str, phone: &str, message: &str) -> String {
    format!(
        "https://{}/{}?text={}",
        host,
        phone,
        urlencoding::encode(message)
    )
}

/// Run the lookup for a parsed reply and decide what to show the user.
pub fn resolve_outcome(parsed: &ParsedOutcome, contacts: &[ContactRecord], host: &str) -> Resolution {
    match resolve(&parsed.student_name, contacts) {
        Some(contact) => {
            debug!("Matched '{}' → {}", parsed.student_name, contact.phone);
            Resolution::Matched {
                student_name: parsed.student_name.clone(),
                link: build_deep_link(host, &contact.phone, &parsed.message_body),
                phone: contact.phone,
            }
        }
        None => {
            debug!("No contact for '{}'", parsed.student_name);
            Resolution::Unmatched {
                student_name: parsed.student_name.clone(),
                message: parsed.message_body.clone(),
            }
        }
    }
}
