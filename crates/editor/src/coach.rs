//! Prompt coach conversation.
//!
//! A message log around [`AiGateway::coach_prompt`]: the user sends draft
//! prompts, the model answers with a refined prompt and a tip. Failures
//! become a canned apology in the log rather than an error.

use canvas_gemini::AiGateway;
use serde::Serialize;

/// Opening message from the coach.
pub const GREETING: &str = "Hey! I'm your Prompt Coach. I can help you write a stronger creative \
prompt. What are you trying to make?";

/// Reply logged when the coaching call fails.
pub const APOLOGY: &str = "Sorry, I had a little trouble thinking of something. Please try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachRole {
    User,
    Model,
}

/// One entry of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachMessage {
    pub role: CoachRole,
    pub content: String,
    /// Refined prompt, on successful model replies only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl CoachMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: CoachRole::User,
            content: content.into(),
            suggestion: None,
            tip: None,
        }
    }

    fn model(content: impl Into<String>) -> Self {
        Self {
            role: CoachRole::Model,
            content: content.into(),
            suggestion: None,
            tip: None,
        }
    }
}

/// The coach's message log, oldest first.
#[derive(Debug, Clone)]
pub struct CoachConversation {
    messages: Vec<CoachMessage>,
}

impl Default for CoachConversation {
    fn default() -> Self {
        Self::new()
    }
}

impl CoachConversation {
    /// A conversation holding only the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![CoachMessage::model(GREETING)],
        }
    }

    pub fn messages(&self) -> &[CoachMessage] {
        &self.messages
    }

    /// Send a draft prompt and log the coach's reply.
    ///
    /// Blank input is ignored. Returns the model message that was
    /// appended, if any.
    pub async fn send(&mut self, gateway: &dyn AiGateway, text: &str) -> Option<&CoachMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.messages.push(CoachMessage::user(text));
        self.reply(gateway, text).await
    }

    /// Drop the last model reply and resend the last user message.
    ///
    /// No-op when the user has not said anything yet.
    pub async fn try_again(&mut self, gateway: &dyn AiGateway) -> Option<&CoachMessage> {
        let last_user = self
            .messages
            .iter()
            .rposition(|m| m.role == CoachRole::User)?;
        let draft = self.messages[last_user].content.clone();

        self.messages.truncate(last_user + 1);
        self.reply(gateway, &draft).await
    }

    /// Most recent refined prompt offered by the coach.
    pub fn latest_suggestion(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.suggestion.as_deref())
    }

    async fn reply(&mut self, gateway: &dyn AiGateway, draft: &str) -> Option<&CoachMessage> {
        let message = match gateway.coach_prompt(draft).await {
            Ok(coaching) => CoachMessage {
                role: CoachRole::Model,
                content: format!("Try this: \"{}\"", coaching.refined_prompt),
                suggestion: Some(coaching.refined_prompt),
                tip: Some(coaching.tip),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Prompt coaching failed");
                CoachMessage::model(APOLOGY)
            }
        };
        self.messages.push(message);
        self.messages.last()
    }
}
