//! Configuration types for report-to-message processing.
//!
//! Every knob lives in [`ReportConfig`], built via its [`ReportConfigBuilder`].
//! The provider and the contact table are *not* looked up from globals by the
//! pipeline: the caller hands them in (or lets
//! [`crate::assistant::ReportAssistant`] resolve them once at startup), so
//! every stage can be exercised in tests without a live environment.

use crate::error::Report2MsgError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Host used for outbound deep-links when none is configured.
pub const DEFAULT_LINK_HOST: &str = "wa.me";

/// Default contact sheet file name, looked up in the working directory.
pub const DEFAULT_CONTACTS_FILE: &str = "parents_data.csv";

/// Configuration for processing a student report.
///
/// # Example
/// ```rust
/// use edgequake_report2msg::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .model("gemini-2.0-flash")
///     .link_host("wa.me")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ReportConfig {
    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-mini".
    /// If None, uses the provider's default from [`default_model_for`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    /// If None along with `provider`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.4.
    ///
    /// The model has to read the report faithfully *and* write a friendly
    /// message, so this sits a little above pure transcription settings.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1024.
    ///
    /// The requested message is a few short sentences; 1024 leaves room for
    /// the subject line and any preamble the model adds anyway.
    pub max_tokens: usize,

    /// Instruction sent with the image. If None, uses
    /// [`crate::prompts::DEFAULT_INSTRUCTION_PROMPT`].
    pub instruction_prompt: Option<String>,

    /// Host part of the deep-link, e.g. `wa.me`. Default: [`DEFAULT_LINK_HOST`].
    pub link_host: String,

    /// Longest image edge in pixels sent to the model. Default: 2000.
    ///
    /// Phone photos of a report are often 4000 px or more; larger images only
    /// add upload time and image tokens without helping the model read them.
    pub max_image_pixels: u32,

    /// Download timeout for URL inputs in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Timeout for the model call in seconds. Default: None (wait for the
    /// provider's own transport timeout).
    pub api_timeout_secs: Option<u64>,

    /// Optional progress callback for extraction/resolution events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.4,
            max_tokens: 1024,
            instruction_prompt: None,
            link_host: DEFAULT_LINK_HOST.to_string(),
            max_image_pixels: 2000,
            download_timeout_secs: 60,
            api_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("instruction_prompt", &self.instruction_prompt.as_ref().map(|p| p.len()))
            .field("link_host", &self.link_host)
            .field("max_image_pixels", &self.max_image_pixels)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn instruction_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.instruction_prompt = Some(prompt.into());
        self
    }

    pub fn link_host(mut self, host: impl Into<String>) -> Self {
        self.config.link_host = host.into();
        self
    }

    pub fn max_image_pixels(mut self, px: u32) -> Self {
        self.config.max_image_pixels = px.max(100);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, Report2MsgError> {
        let c = &self.config;
        let host = c.link_host.trim();
        if host.is_empty() {
            return Err(Report2MsgError::InvalidConfig(
                "Link host must not be empty".into(),
            ));
        }
        if host.contains("://") || host.contains('/') || host.contains('?') {
            return Err(Report2MsgError::InvalidConfig(format!(
                "Link host must be a bare host name like 'wa.me', got '{}'",
                c.link_host
            )));
        }
        if c.max_tokens == 0 {
            return Err(Report2MsgError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if let Some(prompt) = &c.instruction_prompt {
            if prompt.trim().is_empty() {
                return Err(Report2MsgError::InvalidConfig(
                    "Instruction prompt must not be empty".into(),
                ));
            }
        }
        if c.api_timeout_secs == Some(0) {
            return Err(Report2MsgError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        let mut config = self.config;
        config.link_host = config.link_host.trim().to_string();
        Ok(config)
    }
}

/// Default model for a named provider.
///
/// Gemini is the house default: the first version of this tool was built
/// around Gemini Flash and the instruction prompt is tuned for it.
pub fn default_model_for(provider_name: &str) -> &'static str {
    match provider_name.to_lowercase().as_str() {
        "openai" | "azure" => "gpt-4.1-mini",
        "anthropic" => "claude-sonnet-4-20250514",
        "ollama" => "llama3.2-vision",
        _ => "gemini-2.0-flash",
    }
}
