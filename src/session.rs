//! Conversation state for the interactive symptom checker.
//!
//! A [`ChatSession`] is an append-only transcript. Sending a message adds
//! the user's entry, then either the model's reply or the upstream failure
//! message; the conversation always continues. After a diagnosis reply the
//! bot offers a diet plan, which the user answers with a [`QuickReply`].

use crate::classify::{is_exportable_plan, looks_like_day_plan, RequestKind};
use crate::config::ConsultConfig;
use crate::consult::consult;
use crate::error::{PlanError, UPSTREAM_FAILURE_MESSAGE};
use crate::output::ConsultReply;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// First entry of every session.
pub const GREETING: &str =
    "Symptom Checker Started... Describe your symptoms and I'll suggest possible causes and advice.";

/// Appended after a diagnosis reply.
pub const DIET_PLAN_OFFER: &str =
    "Would you like me to create a personalized diet plan based on your symptoms? (Yes/No)";

/// Appended when the offer is declined.
pub const DECLINE_MESSAGE: &str = "Alright, let me know if you need one later.";

/// Message sent on the user's behalf when the offer is accepted.
pub const ACCEPT_MESSAGE: &str = "diet plan";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// Answer to [`DIET_PLAN_OFFER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickReply {
    Yes,
    No,
}

impl QuickReply {
    /// Parse a typed answer: `y`/`yes` or `n`/`no`, any case.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(QuickReply::Yes),
            "n" | "no" => Some(QuickReply::No),
            _ => None,
        }
    }
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatEntry {
    fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }

    /// Bot entry that should be shown as day tables.
    pub fn is_day_plan(&self) -> bool {
        self.speaker == Speaker::Bot && looks_like_day_plan(&self.text)
    }

    /// Bot entry that can be exported to PDF.
    pub fn is_exportable(&self) -> bool {
        self.speaker == Speaker::Bot && is_exportable_plan(&self.text)
    }

    /// Bot entry carrying the Yes/No offer.
    pub fn is_offer(&self) -> bool {
        self.speaker == Speaker::Bot && self.text == DIET_PLAN_OFFER
    }
}

/// A running conversation.
#[derive(Debug)]
pub struct ChatSession {
    config: ConsultConfig,
    entries: Vec<ChatEntry>,
    offer_pending: bool,
}

impl ChatSession {
    pub fn new(config: ConsultConfig) -> Self {
        Self {
            config,
            entries: vec![ChatEntry::bot(GREETING)],
            offer_pending: false,
        }
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Whether the last bot turn asked the Yes/No question and it has not
    /// been answered yet.
    pub fn offer_pending(&self) -> bool {
        self.offer_pending
    }

    /// The most recent exportable plan, if any.
    pub fn latest_plan(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.is_exportable())
            .map(|e| e.text.as_str())
    }

    /// Send `message` to the model and record the exchange.
    ///
    /// Returns the entries added by this turn. An empty (or all-whitespace)
    /// message is ignored and adds nothing.
    pub async fn send(&mut self, message: &str) -> &[ChatEntry] {
        let message = message.trim();
        if message.is_empty() {
            return &[];
        }
        let result = consult(message, &self.config).await;
        self.record_exchange(message, result)
    }

    /// Answer the pending offer.
    pub async fn quick_reply(&mut self, reply: QuickReply) -> &[ChatEntry] {
        match reply {
            QuickReply::Yes => self.send(ACCEPT_MESSAGE).await,
            QuickReply::No => {
                let first_new = self.entries.len();
                self.offer_pending = false;
                self.entries.push(ChatEntry::bot(DECLINE_MESSAGE));
                &self.entries[first_new..]
            }
        }
    }

    /// Record one user message and the outcome of consulting the model.
    ///
    /// Split out of [`send`](Self::send) so the transcript rules can be
    /// driven without a provider.
    pub fn record_exchange(
        &mut self,
        message: &str,
        result: Result<ConsultReply, PlanError>,
    ) -> &[ChatEntry] {
        let first_new = self.entries.len();
        self.offer_pending = false;
        self.entries.push(ChatEntry::user(message));

        match result {
            Ok(reply) => {
                self.entries.push(ChatEntry::bot(reply.markdown.trim_end()));
                if reply.kind == RequestKind::Diagnosis {
                    self.entries.push(ChatEntry::bot(DIET_PLAN_OFFER));
                    self.offer_pending = true;
                }
            }
            Err(e) => {
                warn!("Consult failed: {e}");
                self.entries.push(ChatEntry::bot(UPSTREAM_FAILURE_MESSAGE));
            }
        }

        &self.entries[first_new..]
    }
}
