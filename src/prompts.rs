//! Instruction prompt and output labels for report extraction.
//!
//! The labels are shared between the prompt (which tells the model what to
//! write) and [`crate::pipeline::parse`] (which reads it back), so they live
//! in one place.
//!
//! Callers can override the prompt via
//! [`crate::config::ReportConfig::instruction_prompt`]; a custom prompt should
//! still ask for the `Name:` / `Message:` layout or parsing will fall back to
//! using the whole reply as the message.

/// Label that introduces the student's name in the model output.
pub const NAME_LABEL: &str = "Name:";

/// Label that introduces the parent message in the model output.
pub const MESSAGE_LABEL: &str = "Message:";

/// Default instruction sent together with the report image.
pub const DEFAULT_INSTRUCTION_PROMPT: &str = r#"You are a smart educational assistant. Analyse the attached image of a student report.

1. Extract the student's name.
2. Extract the subject or topic the student studied.
3. Write a very short, friendly WhatsApp message to the student's parent in Egyptian colloquial Arabic (or simple Arabic).
4. The message must contain: a greeting, what the student learned, a fun question the family can discuss at dinner, and one simple tip.
5. Write the whole message on a single line.
6. Produce the output in exactly this format:
Name: [student name]
Message: [message text]"#;
