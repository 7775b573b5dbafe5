//! VLM interaction: send the report image with the instruction prompt.
//!
//! This stage is deliberately thin. The prompt lives in [`crate::prompts`],
//! and the reply is returned untouched; reading the `Name:` / `Message:`
//! fields is [`crate::pipeline::parse`]'s job.
//!
//! There is no retry loop. A failed call fails the current report only and
//! the user simply submits again, which repeats the whole request.
//!
//! The model sits behind [`VisionModel`]. [`ProviderModel`] adapts any
//! `edgequake_llm` provider; other implementations (a local model, a test
//! double) plug into [`crate::ReportAssistant::with_model`].

use crate::config::ReportConfig;
use crate::error::Report2MsgError;
use crate::output::ExtractionResult;
use crate::prompts::DEFAULT_INSTRUCTION_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// One extraction request: instruction text plus the encoded report image.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub instruction: String,
    pub image: ImageData,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// What the model answered.
#[derive(Debug, Clone, Default)]
pub struct VisionReply {
    pub content: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// A vision model that reads one image and answers in free text.
///
/// Errors are plain descriptions; they reach the user unchanged inside
/// [`Report2MsgError::ExtractionFailed`].
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn describe(&self, request: &VisionRequest) -> Result<VisionReply, String>;
}

/// [`VisionModel`] backed by an `edgequake_llm` chat provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
}

impl ProviderModel {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl VisionModel for ProviderModel {
    async fn describe(&self, request: &VisionRequest) -> Result<VisionReply, String> {
        let messages = build_messages(request);
        let options = build_options(request);
        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| format!("{}", e))?;
        Ok(VisionReply {
            content: response.content,
            prompt_tokens: response.prompt_tokens,
            completion_tokens: response.completion_tokens,
        })
    }
}

/// Build the request for one report image from the config.
pub fn build_request(image_data: ImageData, config: &ReportConfig) -> VisionRequest {
    let instruction = config
        .instruction_prompt
        .as_deref()
        .unwrap_or(DEFAULT_INSTRUCTION_PROMPT)
        .to_string();
    VisionRequest {
        instruction,
        image: image_data,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// ## Message Layout
///
/// A single user turn carrying the instruction text and the image. Some
/// providers (Gemini in particular) follow instructions placed next to the
/// image more reliably than a separate system message.
fn build_messages(request: &VisionRequest) -> Vec<ChatMessage> {
    vec![ChatMessage::user_with_images(
        request.instruction.as_str(),
        vec![request.image.clone()],
    )]
}

fn build_options(request: &VisionRequest) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: Some(request.max_tokens),
        ..Default::default()
    }
}

/// Ask the VLM to read one report image.
pub async fn extract(
    model: &dyn VisionModel,
    image_data: ImageData,
    config: &ReportConfig,
) -> Result<ExtractionResult, Report2MsgError> {
    let start = Instant::now();
    let request = build_request(image_data, config);

    let call = model.describe(&request);
    let reply = match config.api_timeout_secs {
        Some(secs) => match timeout(Duration::from_secs(secs), call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Extraction timed out after {}s", secs);
                return Err(Report2MsgError::ExtractionTimeout { secs });
            }
        },
        None => call.await,
    };

    let reply = reply.map_err(|message| {
        warn!("Extraction failed: {}", message);
        Report2MsgError::ExtractionFailed { message }
    })?;

    let duration = start.elapsed();
    debug!(
        "Extraction: {} input tokens, {} output tokens, {:?}",
        reply.prompt_tokens, reply.completion_tokens, duration
    );

    Ok(ExtractionResult {
        raw_text: reply.content,
        input_tokens: reply.prompt_tokens,
        output_tokens: reply.completion_tokens,
        duration_ms: duration.as_millis() as u64,
    })
}
