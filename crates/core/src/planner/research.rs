//! Destination research chat.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::context::TravelContext;
use super::PlannerError;
use crate::llm::{CompletionRequest, LlmClient};
use crate::search_tool::SearchTool;

const NO_RESULTS: &str = "no search results";

/// Turns kept in the prompt; older ones are dropped.
const DEFAULT_HISTORY_TURNS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// Two columns of example questions for the chat UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedPrompts {
    pub column1: Vec<String>,
    pub column2: Vec<String>,
}

/// Answers questions about the destination, grounded in web search
/// findings and the trip so far.
pub struct ResearchAssistant {
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn SearchTool>,
    context: TravelContext,
    history: Vec<ChatTurn>,
    max_history: usize,
}

impl ResearchAssistant {
    /// Starts a conversation seeded with what is known about the trip.
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn SearchTool>, context: TravelContext) -> Self {
        let history = vec![ChatTurn {
            role: ChatRole::Assistant,
            content: context.memory_prompt(),
        }];
        Self {
            llm,
            search,
            context,
            history,
            max_history: DEFAULT_HISTORY_TURNS,
        }
    }

    pub fn with_max_history(mut self, turns: usize) -> Self {
        self.max_history = turns.max(1);
        self
    }

    pub fn context(&self) -> &TravelContext {
        &self.context
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Answers one question. A failed web search is not fatal; the model
    /// answers from the conversation alone.
    pub async fn respond(&mut self, question: &str) -> Result<String, PlannerError> {
        let findings = match self.search.search(question).await {
            Ok(digest) if !digest.trim().is_empty() => digest,
            Ok(_) => NO_RESULTS.to_string(),
            Err(e) => {
                warn!(tool = self.search.name(), error = %e, "Research search failed");
                NO_RESULTS.to_string()
            }
        };
        debug!(chars = findings.len(), "Collected research findings");

        let request = CompletionRequest::new(self.prompt(question, &findings))
            .with_system(self.system_message())
            .with_max_tokens(1024);
        let answer = self.llm.complete(request).await?.text.trim().to_string();

        self.push(ChatRole::User, question.to_string());
        self.push(ChatRole::Assistant, answer.clone());
        Ok(answer)
    }

    /// Restaurant questions for the destination, or Thailand defaults.
    pub fn suggested_prompts(&self) -> SuggestedPrompts {
        if !self.context.has_destination() {
            return SuggestedPrompts {
                column1: strings(&[
                    "Find Thai restaurants with high ratings in Bangkok",
                    "What are the best seafood restaurants in Phuket?",
                    "Show me restaurants open late night in Chiang Mai",
                    "Find restaurants with outdoor seating in Thailand",
                ]),
                column2: strings(&[
                    "What are the most popular local restaurants in Thailand?",
                    "Find Thai restaurants that serve vegetarian food",
                    "What are the best-rated street food spots?",
                    "Show me restaurants with traditional Thai cuisine",
                ]),
            };
        }

        let d = &self.context.destination;
        SuggestedPrompts {
            column1: vec![
                format!("Find Thai restaurants with high ratings in {}", d),
                format!("What are the best seafood restaurants in {}?", d),
                format!("Show me restaurants open late night in {}", d),
                format!("Find restaurants with outdoor seating in {}", d),
            ],
            column2: vec![
                format!("What are the most popular local restaurants in {}?", d),
                format!("Find {} restaurants that serve vegetarian food", d),
                "What are the best-rated street food spots?".to_string(),
                format!("Show me restaurants with traditional {} cuisine", d),
            ],
        }
    }

    fn system_message(&self) -> String {
        format!(
            "You are a travel research assistant for {}. Help users learn about \
             attractions, travel tips and other travel information. Use the search \
             findings when they are relevant.",
            self.context.destination
        )
    }

    fn prompt(&self, question: &str, findings: &str) -> String {
        let transcript = self
            .history
            .iter()
            .map(|turn| match turn.role {
                ChatRole::User => format!("User: {}", turn.content),
                ChatRole::Assistant => format!("Assistant: {}", turn.content),
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Conversation so far:\n{}\n\nSearch findings:\n{}\n\nUser: {}\nAssistant:",
            transcript, findings, question
        )
    }

    /// Appends a turn, keeping the seeded context message.
    fn push(&mut self, role: ChatRole, content: String) {
        self.history.push(ChatTurn { role, content });
        let excess = self.history.len().saturating_sub(self.max_history + 1);
        if excess > 0 {
            self.history.drain(1..1 + excess);
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
