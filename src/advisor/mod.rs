// Advisor workflow
// verify_question -> (advisor | reject) -> done, one run per question


pub mod classify;
pub mod prompts;

pub use classify::{Classification, parse_classification};
pub use prompts::{REJECTION_MESSAGE, SAMPLE_QUESTIONS};

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::llm::ChatModel;
use crate::retrieval::{Retriever, format_results};
use crate::{AdvisorError, Result};

/// Per-question state threaded through the workflow stages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    pub question: String,
    pub is_relevant: bool,
    pub response: String,
}

impl WorkflowState {
    #[inline]
    pub fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    VerifyQuestion,
    Advisor,
    Reject,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VerifyQuestion => "verify_question",
            Self::Advisor => "advisor",
            Self::Reject => "reject",
            Self::Done => "done",
        })
    }
}

/// Next stage after `stage` has run against `state`
#[inline]
pub fn transition(stage: Stage, state: &WorkflowState) -> Stage {
    match stage {
        Stage::VerifyQuestion if state.is_relevant => Stage::Advisor,
        Stage::VerifyQuestion => Stage::Reject,
        Stage::Advisor | Stage::Reject | Stage::Done => Stage::Done,
    }
}

/// Models and retrieval depth used by the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorSettings {
    pub verifier_model: String,
    pub advisor_model: String,
    pub k_results: usize,
}

impl From<&Config> for AdvisorSettings {
    #[inline]
    fn from(config: &Config) -> Self {
        Self {
            verifier_model: config.models.verifier_model.clone(),
            advisor_model: config.models.advisor_model.clone(),
            k_results: config.retrieval.k_results,
        }
    }
}

/// Answers questions by classifying, retrieving and generating
pub struct Advisor {
    chat: Arc<dyn ChatModel>,
    retriever: Arc<dyn Retriever>,
    settings: AdvisorSettings,
}

impl Advisor {
    #[inline]
    pub fn new(
        chat: Arc<dyn ChatModel>,
        retriever: Arc<dyn Retriever>,
        settings: AdvisorSettings,
    ) -> Self {
        Self {
            chat,
            retriever,
            settings,
        }
    }

    /// Drive one question through the workflow until it reaches [`Stage::Done`]
    #[inline]
    pub async fn run(&self, question: &str) -> Result<WorkflowState> {
        let mut state = WorkflowState::new(question);
        let mut stage = Stage::VerifyQuestion;

        while stage != Stage::Done {
            debug!("Running stage {}", stage);
            match stage {
                Stage::VerifyQuestion => self.verify_question(&mut state).await?,
                Stage::Advisor => self.generate_response(&mut state).await?,
                Stage::Reject => reject_question(&mut state),
                Stage::Done => {}
            }
            stage = transition(stage, &state);
        }

        Ok(state)
    }

    #[inline]
    pub async fn answer(&self, question: &str) -> Result<String> {
        self.run(question).await.map(|state| state.response)
    }

    async fn verify_question(&self, state: &mut WorkflowState) -> Result<()> {
        let reply = self
            .complete(&self.settings.verifier_model, prompts::verifier_prompt(&state.question))
            .await?;

        state.is_relevant = match parse_classification(&reply) {
            Classification::Parsed(relevant) => relevant,
            Classification::Unparseable => {
                warn!("Could not parse relevance verdict, treating question as relevant");
                true
            }
        };

        info!("Question classified as relevant: {}", state.is_relevant);
        Ok(())
    }

    async fn generate_response(&self, state: &mut WorkflowState) -> Result<()> {
        let hits = self
            .retriever
            .search(&state.question, self.settings.k_results)
            .await?;
        debug!("Answering with {} retrieved passages", hits.len());

        let prompt = prompts::advisor_prompt(&state.question, &format_results(&hits));
        state.response = self.complete(&self.settings.advisor_model, prompt).await?;
        Ok(())
    }

    async fn complete(&self, model: &str, prompt: String) -> Result<String> {
        let chat = Arc::clone(&self.chat);
        let model = model.to_string();

        tokio::task::spawn_blocking(move || chat.complete(&model, &prompt))
            .await
            .map_err(|e| AdvisorError::Llm(format!("Completion task failed: {}", e)))?
    }
}

fn reject_question(state: &mut WorkflowState) {
    state.response = REJECTION_MESSAGE.to_string();
}
