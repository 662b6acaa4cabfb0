// Chat session
// Keeps the conversation transcript and turns workflow failures into assistant replies


pub mod repl;

pub use repl::{Banner, run_repl};

use std::fmt;
use tracing::error;

use crate::AdvisorError;
use crate::advisor::Advisor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Append-only record of a conversation, cleared only by [`Transcript::clear`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    #[inline]
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
    }

    #[inline]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Message shown in place of an answer when the workflow fails
#[inline]
pub fn apology(error: &AdvisorError) -> String {
    format!("An error occurred: {error}\n\nPlease try rephrasing your question.")
}

/// One user's conversation with the advisor
pub struct ChatSession {
    advisor: Advisor,
    transcript: Transcript,
}

impl ChatSession {
    #[inline]
    pub fn new(advisor: Advisor) -> Self {
        Self {
            advisor,
            transcript: Transcript::default(),
        }
    }

    /// Record the question, run the workflow and record the reply.
    ///
    /// Never fails: workflow errors become an apology from the assistant.
    #[inline]
    pub async fn ask(&mut self, question: &str) -> String {
        self.transcript.push(Role::User, question);

        let reply = match self.advisor.answer(question).await {
            Ok(response) => response,
            Err(e) => {
                error!("Workflow failed: {}", e);
                apology(&e)
            }
        };

        self.transcript.push(Role::Assistant, reply.clone());
        reply
    }

    #[inline]
    pub fn reset(&mut self) {
        self.transcript.clear();
    }

    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
