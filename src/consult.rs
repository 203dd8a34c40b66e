//! Forwarding a user's message to the hosted model.

use crate::classify::RequestKind;
use crate::config::{ConsultConfig, DEFAULT_MODEL};
use crate::error::PlanError;
use crate::output::ConsultReply;
use crate::pipeline::{llm, postprocess};
use crate::prompts::user_prompt;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown when the model answers with nothing at all.
pub const EMPTY_REPLY_FALLBACK: &str = "I couldn't process your symptoms.";

/// Ask the model about `message`.
///
/// The message is classified ([`RequestKind::from_message`]), wrapped in
/// the matching template, sent with retries, and the reply is cleaned up
/// for table parsing.
///
/// # Errors
/// [`PlanError::ProviderNotConfigured`] when no provider can be resolved,
/// [`PlanError::Upstream`] / [`PlanError::UpstreamTimeout`] when every
/// attempt failed.
pub async fn consult(message: &str, config: &ConsultConfig) -> Result<ConsultReply, PlanError> {
    let kind = RequestKind::from_message(message);
    info!("Consulting model ({kind})");
    let provider = resolve_provider(config)?;
    consult_with(&provider, kind, message, config).await
}

/// [`consult`] with an already resolved provider and kind.
pub async fn consult_with(
    provider: &Arc<dyn LLMProvider>,
    kind: RequestKind,
    message: &str,
    config: &ConsultConfig,
) -> Result<ConsultReply, PlanError> {
    let prompt = user_prompt(kind, message);
    let completion = llm::complete(provider, &prompt, config).await?;

    let markdown = if completion.content.trim().is_empty() {
        warn!("Model returned an empty reply");
        format!("{EMPTY_REPLY_FALLBACK}\n")
    } else {
        postprocess::clean_markdown(&completion.content)
    };
    debug!("Reply: {} bytes", markdown.len());

    Ok(ConsultReply {
        kind,
        markdown,
        input_tokens: completion.input_tokens,
        output_tokens: completion.output_tokens,
        duration_ms: completion.duration_ms,
        retries: completion.retries,
    })
}

// ── Provider resolution ──────────────────────────────────────────────────

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, PlanError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PlanError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider + model** (`config.provider_name`); the factory reads
///    the matching API key (`OPENAI_API_KEY`, …) from the environment.
/// 3. **Environment pair** (`DIETPLAN_LLM_PROVIDER` + `DIETPLAN_MODEL`),
///    honoured only when both are set and non-empty.
/// 4. **Auto-detection** (`ProviderFactory::from_env`), which picks the
///    first provider whose API key is present.
pub fn resolve_provider(config: &ConsultConfig) -> Result<Arc<dyn LLMProvider>, PlanError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("DIETPLAN_LLM_PROVIDER"),
        std::env::var("DIETPLAN_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PlanError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::blocks::parse_day_plan;
    use edgequake_llm::providers::MockAgentProvider;
    use edgequake_llm::MockProvider;

    async fn reply_to(raw: &str, kind: RequestKind) -> ConsultReply {
        let mock = MockProvider::new();
        mock.add_response(raw).await;
        let provider: Arc<dyn LLMProvider> = Arc::new(mock);
        consult_with(&provider, kind, "diet plan", &ConsultConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn empty_reply_becomes_fallback() {
        let reply = reply_to("  \n\n", RequestKind::Diagnosis).await;
        assert_eq!(reply.markdown, "I couldn't process your symptoms.\n");
    }

    #[tokio::test]
    async fn fenced_crlf_reply_is_cleaned_on_arrival() {
        let raw = "```markdown\r\nDay 1\r\n| Meal | Food |\r\n| Breakfast | Oats |\r\n```";
        let reply = reply_to(raw, RequestKind::DietPlan).await;
        assert_eq!(
            reply.markdown,
            "Day 1\n\n| Meal | Food |\n| --- | --- |\n| Breakfast | Oats |\n"
        );
        assert!(reply.is_exportable());
    }

    #[tokio::test]
    async fn cleanup_may_reveal_day_labels() {
        let hidden = "\u{200B}Day 1\n| Meal | Food |\n|---|---|\n| Breakfast | Oats |";
        let reply = reply_to(hidden, RequestKind::DietPlan).await;
        assert!(reply.markdown.starts_with("Day 1\n"));
        assert_eq!(parse_day_plan(&reply.markdown).len(), 1);

        let bare_cr = "Day 1\r| Meal | Food |\r|---|---|\r| Breakfast | Oats |\r\
                       Day 2\r| Meal | Food |\r|---|---|\r| Breakfast | Eggs |";
        let reply = reply_to(bare_cr, RequestKind::DietPlan).await;
        let days = parse_day_plan(&reply.markdown);
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].grid.cell(0, 1), "Eggs");
    }

    #[tokio::test]
    async fn kind_follows_the_message() {
        let mock = MockAgentProvider::new();
        mock.add_response("| Meal | Food |\n|---|---|\n| Breakfast | Oats |").await;
        mock.add_response("Likely tension headache.").await;
        let config = ConsultConfig::builder()
            .provider(Arc::new(mock.clone()))
            .build()
            .unwrap();

        let plan = consult("Can I get a diet for acid reflux?", &config).await.unwrap();
        assert_eq!(plan.kind, RequestKind::DietPlan);
        assert!(plan.is_exportable());

        let diagnosis = consult("I have a headache", &config).await.unwrap();
        assert_eq!(diagnosis.kind, RequestKind::Diagnosis);
        assert_eq!(diagnosis.markdown, "Likely tension headache.\n");

        assert_eq!(mock.call_count(), 2);
        assert_eq!(plan.retries, 0);
        assert_eq!(diagnosis.retries, 0);
    }

    #[test]
    fn prebuilt_provider_wins() {
        let config = ConsultConfig::builder()
            .provider(Arc::new(MockProvider::new()))
            .provider_name("openai")
            .build()
            .unwrap();
        let provider = resolve_provider(&config).unwrap();
        assert_eq!(provider.name(), "mock");
    }
}
