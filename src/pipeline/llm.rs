//! Chat-completion call: build the messages and drive the provider.
//!
//! All prompt text lives in [`crate::prompts`]; this module only owns the
//! request shape, the per-attempt timeout and the retry loop.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 responses from hosted models are transient. Exponential
//! backoff (`retry_backoff_ms * 2^attempt`) with a 500 ms base and 2 retries
//! waits 500 ms → 1 s before giving up. A timed-out attempt counts as a
//! failed attempt.

use crate::config::ConsultConfig;
use crate::error::PlanError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Raw model answer plus accounting.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    /// Attempts that failed before this one succeeded.
    pub retries: u32,
}

/// Send `user_prompt` under the configured system instruction.
///
/// The request carries two messages: the system instruction (or the
/// caller's override) and the templated user prompt.
pub async fn complete(
    provider: &Arc<dyn LLMProvider>,
    user_prompt: &str,
    config: &ConsultConfig,
) -> Result<Completion, PlanError> {
    let start = Instant::now();
    let messages = vec![
        ChatMessage::system(config.system_prompt()),
        ChatMessage::user(user_prompt),
    ];
    let options = build_options(config);
    let per_call = Duration::from_secs(config.api_timeout_secs);

    let mut last_err: Option<PlanError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Consult: retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(per_call, provider.chat(&messages, Some(&options))).await {
            Ok(Ok(response)) => {
                let duration = start.elapsed();
                debug!(
                    "Consult: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens, response.completion_tokens, duration
                );
                return Ok(Completion {
                    content: response.content,
                    input_tokens: response.prompt_tokens,
                    output_tokens: response.completion_tokens,
                    duration_ms: duration.as_millis() as u64,
                    retries: attempt,
                });
            }
            Ok(Err(e)) => {
                warn!("Consult: attempt {} failed: {}", attempt + 1, e);
                last_err = Some(PlanError::Upstream {
                    detail: e.to_string(),
                });
            }
            Err(_) => {
                warn!(
                    "Consult: attempt {} timed out after {}s",
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(PlanError::UpstreamTimeout {
                    secs: config.api_timeout_secs,
                });
            }
        }
    }

    Err(last_err.unwrap_or_else(|| PlanError::Upstream {
        detail: "no attempt was made".to_string(),
    }))
}

/// Build `CompletionOptions` from the consult config.
fn build_options(config: &ConsultConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
