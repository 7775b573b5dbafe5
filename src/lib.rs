//! # edgequake-report2msg
//!
//! Turn a photo of a student report into a short parent-facing message and a
//! pre-filled WhatsApp link, using a Vision Language Model (VLM).
//!
//! A teacher photographs a report; the VLM reads the student's name and
//! drafts a friendly message; the parent's phone number is looked up in a
//! contact sheet; the result is a `https://wa.me/<phone>?text=<message>`
//! link the teacher clicks to send. Nothing is sent automatically.
//!
//! ## Pipeline Overview
//!
//! ```text
//! report image (JPEG/PNG, path or URL)
//!  │
//!  ├─ 1. Input    load file or download URL, detect format
//!  ├─ 2. Encode   downscale + base64 ImageData
//!  ├─ 3. VLM      one call to gemini / gpt / claude / …
//!  ├─ 4. Parse    `Name:` / `Message:` lines, whole-text fallback
//!  └─ 5. Resolve  substring lookup in the contact sheet → deep-link
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_report2msg::{ReportAssistant, ReportConfig, Resolution};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let assistant = ReportAssistant::new(ReportConfig::default(), "parents_data.csv");
//!     for w in assistant.warnings() {
//!         eprintln!("warning: {w}");
//!     }
//!     let outcome = assistant.process("report.jpg").await?;
//!     match outcome.resolution {
//!         Resolution::Matched { link, .. } => println!("{link}"),
//!         Resolution::Unmatched { message, .. } => println!("{message}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `report2msg` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assistant;
pub mod config;
pub mod contacts;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assistant::{resolve_provider, ReportAssistant};
pub use config::{ReportConfig, ReportConfigBuilder, DEFAULT_CONTACTS_FILE, DEFAULT_LINK_HOST};
pub use contacts::{ContactBook, ContactRecord};
pub use error::{Report2MsgError, StartupWarning};
pub use output::{ExtractionResult, ParsedOutcome, ReportOutcome, ResolvedContact, Resolution};
pub use pipeline::llm::{ProviderModel, VisionModel, VisionReply, VisionRequest};
pub use pipeline::parse::parse;
pub use pipeline::resolve::{build_deep_link, resolve};
pub use progress::{NoopProgressCallback, ProgressCallback, ReportProgressCallback};
