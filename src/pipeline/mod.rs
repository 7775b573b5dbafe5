//! Pipeline stages for turning a report image into a parent message.
//!
//! Each submodule implements exactly one step and can be tested on its own.
//! Only [`llm`] touches the network model; everything after it is a pure
//! function of the model's reply and the contact sheet.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm ──▶ parse ──▶ resolve
//! (path/URL) (base64)  (VLM)   (labels)  (contacts + deep-link)
//! ```
//!
//! 1. [`input`]   — load a local file or download a URL; accept JPEG/PNG only
//! 2. [`encode`]  — downscale and base64-wrap the image for the API request
//! 3. [`llm`]     — one vision call with the instruction prompt; no retries
//! 4. [`parse`]   — read the `Name:` / `Message:` lines, with a whole-text fallback
//! 5. [`resolve`] — substring lookup in the contact sheet and link building

pub mod encode;
pub mod input;
pub mod llm;
pub mod parse;
pub mod resolve;
