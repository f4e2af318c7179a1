use super::domain::{AnsweredQuestion, AssessmentPhase, GeneratedQuestion};
use super::prompt::QuestionPrompt;
use crate::config::DEFAULT_MAX_QUESTIONS;
use crate::providers::{ProviderError, ProviderManager};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const REPEAT_SUFFIX: &str = " (Please provide additional details if previously answered)";
pub const COMPLETION_MESSAGE: &str =
    "Assessment completed! You can now generate your personalized report.";

const REPEAT_PREFIX_CHARS: usize = 50;
const REPEAT_TOLERANCE: usize = 2;

/// Result of evaluating a single phase against the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStep {
    Ask(AssessmentPhase),
    Transition {
        from: AssessmentPhase,
        to: AssessmentPhase,
    },
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    QuestionLimitReached,
    RepeatedQuestions,
}

/// A question ready to be shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionTurn {
    pub question: GeneratedQuestion,
    pub phase: AssessmentPhase,
    pub question_number: usize,
    pub total_questions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextAction {
    Question(QuestionTurn),
    Complete {
        phase: AssessmentPhase,
        reason: CompletionReason,
    },
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("failed to build question prompt: {0}")]
    Prompt(#[from] serde_json::Error),
    #[error("failed to generate question: {0}")]
    Generation(#[from] ProviderError),
}

/// Pure phase arithmetic: quotas, transitions, and the question limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePlan {
    max_questions: usize,
}

impl Default for PhasePlan {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUESTIONS)
    }
}

impl PhasePlan {
    pub fn new(max_questions: usize) -> Self {
        Self { max_questions }
    }

    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    pub fn questions_per_phase(&self) -> usize {
        self.max_questions.div_ceil(AssessmentPhase::COUNT)
    }

    pub fn step(&self, phase: AssessmentPhase, history: &[AnsweredQuestion]) -> PhaseStep {
        if history.len() >= self.max_questions {
            return PhaseStep::Complete;
        }

        let asked = history.iter().filter(|entry| entry.belongs_to(phase)).count();
        match phase.next() {
            Some(next) if asked >= self.questions_per_phase() => PhaseStep::Transition {
                from: phase,
                to: next,
            },
            _ => PhaseStep::Ask(phase),
        }
    }

    /// Unknown or missing phase names start from the first phase.
    pub fn starting_phase(&self, current: Option<&str>) -> AssessmentPhase {
        current
            .and_then(AssessmentPhase::from_label)
            .unwrap_or_else(AssessmentPhase::first)
    }

    /// Walks transitions until a phase that should ask, or the limit.
    pub fn resolve(&self, mut phase: AssessmentPhase, history: &[AnsweredQuestion]) -> PhaseStep {
        loop {
            match self.step(phase, history) {
                PhaseStep::Transition { from, to } => {
                    info!(from = from.label(), to = to.label(), "moving to next phase");
                    phase = to;
                }
                settled => return settled,
            }
        }
    }
}

/// Decides whether to ask another question and obtains it from the question provider.
pub struct AssessmentFlowController {
    plan: PhasePlan,
    providers: Arc<ProviderManager>,
}

impl AssessmentFlowController {
    pub fn new(providers: Arc<ProviderManager>, max_questions: usize) -> Self {
        Self {
            plan: PhasePlan::new(max_questions),
            providers,
        }
    }

    pub fn plan(&self) -> PhasePlan {
        self.plan
    }

    pub async fn next(
        &self,
        current_phase: Option<&str>,
        history: &[AnsweredQuestion],
        industry: &str,
    ) -> Result<NextAction, FlowError> {
        let mut phase = self.plan.starting_phase(current_phase);

        loop {
            phase = match self.plan.resolve(phase, history) {
                PhaseStep::Complete => {
                    info!(answered = history.len(), "question limit reached");
                    return Ok(NextAction::Complete {
                        phase,
                        reason: CompletionReason::QuestionLimitReached,
                    });
                }
                PhaseStep::Ask(phase) => phase,
                PhaseStep::Transition { to, .. } => to,
            };

            let prompt = QuestionPrompt::build(phase, industry, history)?;
            let mut question = self
                .providers
                .generate_next_question(&prompt.system, &prompt.user)
                .await?;

            if !is_repeat(history, &question.question_text) {
                return Ok(NextAction::Question(self.turn(question, phase, history)));
            }

            warn!(phase = phase.label(), "provider repeated an earlier question");
            question.question_text.push_str(REPEAT_SUFFIX);

            if !exceeds_repeat_tolerance(history, &question.question_text) {
                return Ok(NextAction::Question(self.turn(question, phase, history)));
            }

            match phase.next() {
                Some(next) => {
                    info!(to = next.label(), "moving to next phase due to repeated questions");
                    phase = next;
                }
                None => {
                    info!("repeated questions in the last phase, completing assessment");
                    return Ok(NextAction::Complete {
                        phase,
                        reason: CompletionReason::RepeatedQuestions,
                    });
                }
            }
        }
    }

    fn turn(
        &self,
        question: GeneratedQuestion,
        phase: AssessmentPhase,
        history: &[AnsweredQuestion],
    ) -> QuestionTurn {
        QuestionTurn {
            question,
            phase,
            question_number: history.len() + 1,
            total_questions: self.plan.max_questions(),
        }
    }
}

fn is_repeat(history: &[AnsweredQuestion], text: &str) -> bool {
    history.iter().any(|entry| entry.question == text)
}

fn exceeds_repeat_tolerance(history: &[AnsweredQuestion], mutated: &str) -> bool {
    let prefix: String = mutated.chars().take(REPEAT_PREFIX_CHARS).collect();
    history
        .iter()
        .filter(|entry| entry.question.contains(&prefix))
        .count()
        > REPEAT_TOLERANCE
}
