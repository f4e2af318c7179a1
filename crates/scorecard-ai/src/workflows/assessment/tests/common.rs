use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::providers::{LlmProvider, ProviderError, ProviderKind, ProviderManager};
use crate::workflows::assessment::domain::{
    Answer, AnswerType, AnsweredQuestion, AssessmentPhase,
};

/// Provider double replaying canned replies and counting calls.
pub(crate) struct StubProvider {
    kind: ProviderKind,
    available: bool,
    questions: Mutex<VecDeque<Value>>,
    report: Option<String>,
    question_calls: AtomicUsize,
    report_calls: AtomicUsize,
    last_system_prompt: Mutex<Option<String>>,
}

impl StubProvider {
    pub(crate) fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            available: true,
            questions: Mutex::new(VecDeque::new()),
            report: None,
            question_calls: AtomicUsize::new(0),
            report_calls: AtomicUsize::new(0),
            last_system_prompt: Mutex::new(None),
        }
    }

    pub(crate) fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub(crate) fn with_questions(self, replies: Vec<Value>) -> Self {
        *self.questions.lock().expect("stub mutex poisoned") = replies.into();
        self
    }

    pub(crate) fn with_report(mut self, markdown: impl Into<String>) -> Self {
        self.report = Some(markdown.into());
        self
    }

    pub(crate) fn question_calls(&self) -> usize {
        self.question_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_system_prompt(&self) -> Option<String> {
        self.last_system_prompt
            .lock()
            .expect("stub mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn generate_report(&self, system: &str, _user: &str) -> Result<String, ProviderError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system_prompt.lock().expect("stub mutex poisoned") = Some(system.to_string());
        self.report.clone().ok_or(ProviderError::Http {
            provider: self.kind,
            status: 500,
            body: "stub failure".to_string(),
        })
    }

    async fn generate_next_question(
        &self,
        system: &str,
        _user: &str,
    ) -> Result<Value, ProviderError> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system_prompt.lock().expect("stub mutex poisoned") = Some(system.to_string());
        self.questions
            .lock()
            .expect("stub mutex poisoned")
            .pop_front()
            .ok_or(ProviderError::MalformedResponse {
                provider: self.kind,
                detail: "no scripted reply left".to_string(),
            })
    }
}

pub(crate) fn question_reply(text: &str, answer_type: &str) -> Value {
    json!({
        "questionText": text,
        "answerType": answer_type,
        "options": ["Yes", "No"],
        "phase_status": "asking",
        "overall_status": "asking",
        "reasoning_text": "probing adoption"
    })
}

pub(crate) fn question_manager(stub: Arc<StubProvider>) -> Arc<ProviderManager> {
    Arc::new(ProviderManager::new(
        Some(stub as Arc<dyn LlmProvider>),
        Vec::new(),
    ))
}

pub(crate) fn report_manager(chain: Vec<Arc<StubProvider>>) -> Arc<ProviderManager> {
    let chain = chain
        .into_iter()
        .map(|stub| stub as Arc<dyn LlmProvider>)
        .collect();
    Arc::new(ProviderManager::new(None, chain))
}

pub(crate) fn answered(
    question: &str,
    answer: Answer,
    answer_type: AnswerType,
    phase: AssessmentPhase,
) -> AnsweredQuestion {
    AnsweredQuestion::new(question, answer, answer_type).in_phase(phase)
}

pub(crate) fn text(value: &str) -> Answer {
    Answer::Text(value.to_string())
}

pub(crate) fn choices(values: &[&str]) -> Answer {
    Answer::Choices(values.iter().map(|value| value.to_string()).collect())
}

/// `count` scale answers of `rating` spread across the phases in order, `per_phase` at a time.
pub(crate) fn filled_history(count: usize, per_phase: usize, rating: &str) -> Vec<AnsweredQuestion> {
    let phases = AssessmentPhase::ordered();
    (0..count)
        .map(|index| {
            let phase = phases[(index / per_phase).min(phases.len() - 1)];
            answered(
                &format!("Question {}", index + 1),
                text(rating),
                AnswerType::Scale,
                phase,
            )
        })
        .collect()
}
