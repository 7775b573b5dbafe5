//! Offline integration tests: everything after the model call.
//!
//! These run without network access or API keys. The model reply is fed in
//! as text through [`ReportAssistant::resolve_text`].

use edgequake_report2msg::{
    parse, resolve, ContactBook, ReportAssistant, ReportConfig, Resolution, StartupWarning,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn contacts_file(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("temp file");
    f.write_all(contents.as_bytes()).expect("write csv");
    f
}

fn decoded_text(link: &str) -> String {
    let (_, encoded) = link.split_once("?text=").expect("link has text param");
    urlencoding::decode(encoded).expect("valid utf-8").into_owned()
}

const SHEET: &str = "Student_Name,Parent_Phone\n\
Sara Ali Mohamed,201234567890\n\
Omar Khaled Hassan,201112223334\n";

// ── End-to-end over text ─────────────────────────────────────────────────────

#[test]
fn omar_report_resolves_to_parent_link() {
    let file = contacts_file(SHEET);
    let assistant = ReportAssistant::with_parts(
        ReportConfig::default(),
        None,
        ContactBook::load(file.path()).expect("sheet loads"),
    );

    let message = "Omar learned fractions today. Ask him what 1/2 + 1/4 equals!";
    let raw = format!("Name: Omar Khaled\nMessage: {message}");
    let outcome = assistant.resolve_text(&raw);

    match outcome.resolution {
        Resolution::Matched {
            student_name,
            phone,
            link,
        } => {
            assert_eq!(student_name, "Omar Khaled");
            assert_eq!(phone, "201112223334");
            assert!(link.starts_with("https://wa.me/201112223334?text="));
            assert_eq!(decoded_text(&link), message);
        }
        other => panic!("expected a match, got {other:?}"),
    }
}

#[test]
fn chatty_reply_with_preamble_still_parses() {
    let file = contacts_file(SHEET);
    let assistant = ReportAssistant::with_parts(
        ReportConfig::default(),
        None,
        ContactBook::load(file.path()).unwrap(),
    );

    let raw = "Sure! Here is the result:\n\nName: Sara Ali\nMessage: أهلاً يا أم سارة! سارة اتعلمت النهارده الكسور 🍕\n";
    let outcome = assistant.resolve_text(raw);
    assert!(!outcome.parsed.fallback_used);
    assert_eq!(outcome.parsed.student_name, "Sara Ali");
    let link = outcome.resolution.link().expect("matched");
    assert_eq!(
        decoded_text(link),
        "أهلاً يا أم سارة! سارة اتعلمت النهارده الكسور 🍕"
    );
}

#[test]
fn unknown_student_surfaces_message_for_manual_copy() {
    let file = contacts_file(SHEET);
    let assistant = ReportAssistant::with_parts(
        ReportConfig::default(),
        None,
        ContactBook::load(file.path()).unwrap(),
    );

    let outcome = assistant.resolve_text("Name: Youssef Tarek\nMessage: Well done!");
    assert_eq!(
        outcome.resolution,
        Resolution::Unmatched {
            student_name: "Youssef Tarek".into(),
            message: "Well done!".into(),
        }
    );
}

// ── Stage properties ─────────────────────────────────────────────────────────

#[test]
fn parse_then_resolve_free_functions() {
    let contacts = ContactBook::from_reader(SHEET.as_bytes()).unwrap();
    let parsed = parse("Name: Sara Ali\nMessage: Great job today!");
    assert_eq!(parsed.student_name, "Sara Ali");
    assert_eq!(parsed.message_body, "Great job today!");

    assert_eq!(
        resolve(&parsed.student_name, contacts.records()).unwrap().phone,
        "201234567890"
    );
    assert!(resolve("Omar Samir", contacts.records()).is_none());
    assert!(resolve("", contacts.records()).is_none());
}

// ── Startup degradation ──────────────────────────────────────────────────────

#[test]
fn missing_contact_sheet_is_a_warning_not_an_error() {
    let missing = PathBuf::from("/definitely/not/here/parents_data.csv");
    let assistant = ReportAssistant::new(ReportConfig::default(), &missing);

    assert!(assistant.contacts().is_empty());
    assert!(assistant
        .warnings()
        .iter()
        .any(|w| matches!(w, StartupWarning::ContactsUnavailable { path, .. } if *path == missing)));

    // Lookups simply miss.
    let outcome = assistant.resolve_text("Name: Sara\nMessage: Hi");
    assert!(!outcome.resolution.is_matched());
}

#[test]
fn malformed_contact_sheet_is_a_warning() {
    let file = contacts_file("name;phone\nSara;201\n");
    let assistant = ReportAssistant::new(ReportConfig::default(), file.path());
    assert!(assistant.contacts().is_empty());
    assert!(assistant
        .warnings()
        .iter()
        .any(|w| matches!(w, StartupWarning::ContactsUnavailable { .. })));
}

#[test]
fn valid_contact_sheet_loads_without_contact_warning() {
    let file = contacts_file(SHEET);
    let assistant = ReportAssistant::new(ReportConfig::default(), file.path());
    assert_eq!(assistant.contacts().len(), 2);
    assert!(!assistant
        .warnings()
        .iter()
        .any(|w| matches!(w, StartupWarning::ContactsUnavailable { .. })));
}
