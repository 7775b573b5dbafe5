//! The report assistant: one-time setup plus per-report processing.
//!
//! [`ReportAssistant::new`] resolves the model provider and loads the contact
//! sheet once. Problems with either are collected as
//! [`StartupWarning`]s instead of failing, so an interactive session can
//! still start: without a provider every extraction fails, without contacts
//! every lookup misses.
//!
//! Each call to [`ReportAssistant::process`] then runs the pipeline once:
//!
//! ```text
//! load image ─▶ encode ─▶ VLM ─▶ parse ─▶ resolve
//! ```
//!
//! The assistant holds no mutable state, so a single instance can serve any
//! number of reports.

use crate::config::{default_model_for, ReportConfig};
use crate::contacts::ContactBook;
use crate::error::{Report2MsgError, StartupWarning};
use crate::output::{ExtractionResult, ReportOutcome};
use crate::pipeline::llm::{self, ProviderModel, VisionModel};
use crate::pipeline::{encode, input, parse, resolve};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Turns report images into parent messages and deep-links.
pub struct ReportAssistant {
    config: ReportConfig,
    model: Option<Arc<dyn VisionModel>>,
    contacts: ContactBook,
    warnings: Vec<StartupWarning>,
}

impl ReportAssistant {
    /// Set up an assistant from explicit parts.
    ///
    /// `provider` of `None` means "not configured"; extraction calls will
    /// fail with [`Report2MsgError::ProviderNotConfigured`].
    pub fn with_parts(
        config: ReportConfig,
        provider: Option<Arc<dyn LLMProvider>>,
        contacts: ContactBook,
    ) -> Self {
        Self {
            config,
            model: provider.map(|p| Arc::new(ProviderModel::new(p)) as Arc<dyn VisionModel>),
            contacts,
            warnings: Vec::new(),
        }
    }

    /// Set up an assistant around any [`VisionModel`].
    pub fn with_model(
        config: ReportConfig,
        model: Arc<dyn VisionModel>,
        contacts: ContactBook,
    ) -> Self {
        Self {
            config,
            model: Some(model),
            contacts,
            warnings: Vec::new(),
        }
    }

    /// Set up an assistant: resolve the provider from `config` / environment
    /// and load the contact sheet at `contacts_path`.
    ///
    /// Never fails; check [`ReportAssistant::warnings`] for what is missing.
    pub fn new(config: ReportConfig, contacts_path: impl AsRef<Path>) -> Self {
        let contacts_path = contacts_path.as_ref();
        let mut warnings = Vec::new();

        let model = match resolve_provider(&config) {
            Ok(p) => Some(Arc::new(ProviderModel::new(p)) as Arc<dyn VisionModel>),
            Err(e) => {
                warn!("No LLM provider: {}", e);
                warnings.push(StartupWarning::ProviderUnavailable {
                    detail: e.to_string(),
                });
                None
            }
        };

        let contacts = match ContactBook::load(contacts_path) {
            Ok(book) => book,
            Err(e) => {
                warn!("Contacts unavailable: {}", e);
                let detail = match e {
                    Report2MsgError::ContactsRead { detail, .. } => detail,
                    other => other.to_string(),
                };
                warnings.push(StartupWarning::ContactsUnavailable {
                    path: contacts_path.to_path_buf(),
                    detail,
                });
                ContactBook::empty()
            }
        };

        Self {
            config,
            model,
            contacts,
            warnings,
        }
    }

    /// Configuration problems found during setup.
    pub fn warnings(&self) -> &[StartupWarning] {
        &self.warnings
    }

    pub fn contacts(&self) -> &ContactBook {
        &self.contacts
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Process one report image given as a local path or an HTTP(S) URL.
    pub async fn process(&self, input: &str) -> Result<ReportOutcome, Report2MsgError> {
        info!("Processing report: {}", input);
        let loaded = input::load_image(input, self.config.download_timeout_secs).await?;
        self.process_loaded(loaded).await
    }

    /// Process one report image already held in memory (e.g. an upload).
    pub async fn process_bytes(
        &self,
        source_name: &str,
        bytes: &[u8],
    ) -> Result<ReportOutcome, Report2MsgError> {
        let loaded = input::decode_image(source_name, bytes)?;
        self.process_loaded(loaded).await
    }

    async fn process_loaded(
        &self,
        loaded: input::LoadedImage,
    ) -> Result<ReportOutcome, Report2MsgError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Report2MsgError::ProviderNotConfigured {
                provider: self
                    .config
                    .provider_name
                    .clone()
                    .unwrap_or_else(|| "auto".to_string()),
                hint: "Set GEMINI_API_KEY (or OPENAI_API_KEY / ANTHROPIC_API_KEY) and restart."
                    .to_string(),
            })?;

        let image_data = encode::encode_image(
            &loaded.image,
            loaded.format,
            self.config.max_image_pixels,
        )
        .map_err(|e| Report2MsgError::ImageDecodeFailed {
            source_name: loaded.source.clone(),
            detail: format!("Image encoding failed: {}", e),
        })?;

        let cb = self.config.progress_callback.as_ref();
        if let Some(cb) = cb {
            cb.on_extraction_start(&loaded.source);
        }

        let extraction = match llm::extract(model.as_ref(), image_data, &self.config).await {
            Ok(extraction) => {
                if let Some(cb) = cb {
                    cb.on_extraction_complete(extraction.raw_text.chars().count());
                }
                extraction
            }
            Err(e) => {
                if let Some(cb) = cb {
                    cb.on_extraction_error(&e.to_string());
                }
                return Err(e);
            }
        };

        Ok(self.resolve_extraction(extraction))
    }

    /// Parse a model reply and look up the contact. Needs no provider.
    pub fn resolve_extraction(&self, extraction: ExtractionResult) -> ReportOutcome {
        let parsed = parse::parse(&extraction.raw_text);
        if parsed.fallback_used {
            info!("No usable Message: label; using the whole reply as the message");
        }

        let resolution =
            resolve::resolve_outcome(&parsed, self.contacts.records(), &self.config.link_host);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_resolution(&parsed.student_name, resolution.is_matched());
        }

        ReportOutcome {
            extraction,
            parsed,
            resolution,
        }
    }

    /// Shorthand for [`ReportAssistant::resolve_extraction`] on bare text.
    pub fn resolve_text(&self, raw_text: &str) -> ReportOutcome {
        self.resolve_extraction(ExtractionResult {
            raw_text: raw_text.to_string(),
            ..Default::default()
        })
    }

    /// Synchronous wrapper around [`ReportAssistant::process`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn process_sync(&self, input: &str) -> Result<ReportOutcome, Report2MsgError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| Report2MsgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.process(input))
    }
}

// ── Provider resolution ──────────────────────────────────────────────────

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Report2MsgError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Report2MsgError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or the
///    provider's default model.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **Gemini key** — `GEMINI_API_KEY` set means Gemini, the model the
///    prompt was written for.
/// 5. **Full auto-detection** via [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &ReportConfig) -> Result<Arc<dyn LLMProvider>, Report2MsgError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config
            .model
            .as_deref()
            .unwrap_or_else(|| default_model_for(name));
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let model = config
                .model
                .as_deref()
                .unwrap_or_else(|| default_model_for("gemini"));
            return create_vision_provider("gemini", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Report2MsgError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or ANTHROPIC_API_KEY.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::ContactRecord;
    use crate::output::Resolution;
    use crate::pipeline::llm::{VisionReply, VisionRequest};
    use crate::progress::ReportProgressCallback;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct CannedModel {
        reply: Result<String, String>,
        delay: Duration,
    }

    #[async_trait]
    impl VisionModel for CannedModel {
        async fn describe(&self, _request: &VisionRequest) -> Result<VisionReply, String> {
            tokio::time::sleep(self.delay).await;
            self.reply.clone().map(|content| VisionReply {
                content,
                ..Default::default()
            })
        }
    }

    fn canned(reply: Result<&str, &str>) -> Arc<dyn VisionModel> {
        Arc::new(CannedModel {
            reply: reply.map(str::to_string).map_err(str::to_string),
            delay: Duration::ZERO,
        })
    }

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: Mutex<Vec<String>>,
        resolutions: Mutex<Vec<(String, bool)>>,
    }

    impl ReportProgressCallback for TrackingCallback {
        fn on_extraction_start(&self, _source: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_extraction_complete(&self, _chars: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_extraction_error(&self, error: &str) {
            self.errors.lock().unwrap().push(error.to_string());
        }

        fn on_resolution(&self, student_name: &str, matched: bool) {
            self.resolutions
                .lock()
                .unwrap()
                .push((student_name.to_string(), matched));
        }
    }

    fn tracked(builder: crate::config::ReportConfigBuilder) -> (ReportConfig, Arc<TrackingCallback>) {
        let tracker = Arc::new(TrackingCallback::default());
        let config = builder
            .progress_callback(tracker.clone() as Arc<dyn ReportProgressCallback>)
            .build()
            .unwrap();
        (config, tracker)
    }

    fn png_bytes() -> Vec<u8> {
        use image::{DynamicImage, Rgb, RgbImage};
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn sheet() -> ContactBook {
        ContactBook::from_records(vec![
            ContactRecord::new("Sara Ali Mohamed", "201234567890"),
            ContactRecord::new("Omar Khaled Hassan", "201112223334"),
        ])
    }

    fn assistant() -> ReportAssistant {
        ReportAssistant::with_parts(ReportConfig::default(), None, sheet())
    }

    #[test]
    fn resolves_labelled_reply() {
        let out = assistant().resolve_text("Name: Sara Ali\nMessage: Great job today!");
        assert_eq!(out.parsed.student_name, "Sara Ali");
        assert_eq!(
            out.resolution.link(),
            Some("https://wa.me/201234567890?text=Great%20job%20today%21")
        );
    }

    #[test]
    fn unmatched_reply_exposes_message() {
        let out = assistant().resolve_text("Name: Youssef\nMessage: Hello");
        assert_eq!(
            out.resolution,
            Resolution::Unmatched {
                student_name: "Youssef".into(),
                message: "Hello".into(),
            }
        );
    }

    #[test]
    fn unlabelled_reply_is_unmatched_with_full_text() {
        let raw = "I could not read this report.";
        let out = assistant().resolve_text(raw);
        assert!(out.parsed.fallback_used);
        assert_eq!(
            out.resolution,
            Resolution::Unmatched {
                student_name: String::new(),
                message: raw.into(),
            }
        );
    }

    #[tokio::test]
    async fn missing_provider_fails_at_call_time() {
        let err = assistant()
            .process_bytes("report.png", &png_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, Report2MsgError::ProviderNotConfigured { .. }));
    }

    #[test]
    fn custom_link_host_is_used() {
        let config = ReportConfig::builder().link_host("api.whatsapp.com").build().unwrap();
        let contacts = ContactBook::from_records(vec![ContactRecord::new("Mona Adel", "2010")]);
        let a = ReportAssistant::with_parts(config, None, contacts);
        let out = a.resolve_text("Name: Mona\nMessage: Hi");
        assert_eq!(out.resolution.link(), Some("https://api.whatsapp.com/2010?text=Hi"));
    }

    #[tokio::test]
    async fn model_reply_is_resolved_to_link() {
        let (config, tracker) = tracked(ReportConfig::builder());
        let a = ReportAssistant::with_model(
            config,
            canned(Ok("Name: Omar Khaled\nMessage: Omar did great in science!")),
            sheet(),
        );

        let out = a.process_bytes("report.png", &png_bytes()).await.unwrap();
        assert_eq!(
            out.resolution,
            Resolution::Matched {
                student_name: "Omar Khaled".into(),
                phone: "201112223334".into(),
                link: "https://wa.me/201112223334?text=Omar%20did%20great%20in%20science%21"
                    .into(),
            }
        );
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert!(tracker.errors.lock().unwrap().is_empty());
        assert_eq!(
            *tracker.resolutions.lock().unwrap(),
            vec![("Omar Khaled".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn model_error_reaches_caller_and_callback() {
        let (config, tracker) = tracked(ReportConfig::builder());
        let a = ReportAssistant::with_model(
            config,
            canned(Err("429 Too Many Requests: quota exceeded")),
            sheet(),
        );

        let err = a.process_bytes("report.png", &png_bytes()).await.unwrap_err();
        match &err {
            Report2MsgError::ExtractionFailed { message } => {
                assert_eq!(message, "429 Too Many Requests: quota exceeded")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 0);
        let errors = tracker.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("quota exceeded"));
        assert!(tracker.resolutions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn slow_model_is_cut_off_by_api_timeout() {
        let (config, tracker) = tracked(ReportConfig::builder().api_timeout_secs(1));
        let model = Arc::new(CannedModel {
            reply: Ok("Name: Sara\nMessage: late".to_string()),
            delay: Duration::from_secs(30),
        });
        let a = ReportAssistant::with_model(config, model, sheet());

        let err = a.process_bytes("report.png", &png_bytes()).await.unwrap_err();
        assert!(matches!(err, Report2MsgError::ExtractionTimeout { secs: 1 }));
        assert_eq!(tracker.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn session_survives_a_failed_report() {
        let a = ReportAssistant::with_model(ReportConfig::default(), canned(Err("boom")), sheet());
        assert!(a.process_bytes("a.png", &png_bytes()).await.is_err());
        assert!(a.process_bytes("b.png", &png_bytes()).await.is_err());
        assert!(a.resolve_text("Name: Sara\nMessage: Hi").resolution.is_matched());
    }
}
