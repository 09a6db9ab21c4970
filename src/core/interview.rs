//! Interview session state machine.
//!
//! The session never performs I/O itself. Every operation that needs the
//! backend or a timer returns an [`Effect`]; the caller runs it and feeds the
//! outcome back through the matching `on_*` method.

use std::time::Duration;

use anyhow::Result;
use uuid::Uuid;

use super::job::{ChatMessage, Job, JobContext, QuestionAnswer};

pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(500);

pub const ANSWER_FEEDBACK_FALLBACK: &str =
    "Could not generate feedback for this answer. Let's move on to the next question.";
pub const FINAL_FEEDBACK_FALLBACK: &str =
    "Sorry, we couldn't generate your overall feedback right now. Thanks for completing the interview!";
pub const QUESTIONS_ERROR: &str = "Failed to load interview questions. Please try again.";
pub const NO_QUESTIONS_ERROR: &str = "No interview questions were generated for this job.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    LoadingQuestions,
    AwaitingAnswer,
    LoadingFeedback,
    AwaitingNext,
    /// Pacing delay before the next question is shown
    Advancing,
    LoadingFinalFeedback,
    Complete { feedback: String },
    Error { message: String },
}

impl Phase {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Phase::LoadingQuestions | Phase::LoadingFeedback | Phase::LoadingFinalFeedback
        )
    }
}

/// Work the session asks its driver to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchQuestions(JobContext),
    FetchFeedback {
        job: JobContext,
        questions: Vec<QuestionAnswer>,
    },
    ShowNextQuestionAfter(Duration),
    FetchFinalFeedback {
        job: JobContext,
        questions: Vec<QuestionAnswer>,
    },
}

#[derive(Debug, Clone)]
pub struct InterviewSession {
    id: Uuid,
    job: Job,
    questions: Vec<String>,
    current_index: usize,
    transcript: Vec<ChatMessage>,
    answers: Vec<QuestionAnswer>,
    phase: Phase,
    advance_delay: Duration,
}

impl InterviewSession {
    /// Start a session for `job`. The returned effect fetches the question list.
    pub fn new(job: Job) -> (Self, Effect) {
        Self::with_advance_delay(job, DEFAULT_ADVANCE_DELAY)
    }

    pub fn with_advance_delay(job: Job, advance_delay: Duration) -> (Self, Effect) {
        let effect = Effect::FetchQuestions(job.context());
        let session = Self {
            id: Uuid::new_v4(),
            job,
            questions: Vec::new(),
            current_index: 0,
            transcript: Vec::new(),
            answers: Vec::new(),
            phase: Phase::LoadingQuestions,
            advance_delay,
        };
        tracing::debug!("Interview session {} started for '{}'", session.id, session.job.title);
        (session, effect)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn answers(&self) -> &[QuestionAnswer] {
        &self.answers
    }

    pub fn final_feedback(&self) -> Option<&str> {
        match &self.phase {
            Phase::Complete { feedback } => Some(feedback),
            _ => None,
        }
    }

    /// Answer input is accepted only while waiting for an answer
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::AwaitingAnswer
    }

    pub fn has_more_questions(&self) -> bool {
        self.current_index + 1 < self.questions.len()
    }

    /// "Question n of N" as shown in the progress strip
    pub fn progress_label(&self) -> String {
        let total = self.questions.len();
        format!("Question {} of {}", (self.current_index + 1).min(total), total)
    }

    pub fn on_questions(&mut self, result: Result<Vec<String>>) {
        if self.phase != Phase::LoadingQuestions {
            tracing::debug!("Ignoring question list in phase {:?}", self.phase);
            return;
        }

        match result {
            Ok(questions) if !questions.is_empty() => {
                tracing::info!(
                    "Loaded {} interview questions for '{}'",
                    questions.len(),
                    self.job.title
                );
                self.transcript.push(ChatMessage::question(0, questions[0].clone()));
                self.questions = questions;
                self.current_index = 0;
                self.phase = Phase::AwaitingAnswer;
            }
            Ok(_) => {
                tracing::warn!("Question service returned an empty list for '{}'", self.job.title);
                self.phase = Phase::Error {
                    message: NO_QUESTIONS_ERROR.to_string(),
                };
            }
            Err(e) => {
                tracing::error!("Error loading questions: {:#}", e);
                self.phase = Phase::Error {
                    message: QUESTIONS_ERROR.to_string(),
                };
            }
        }
    }

    /// Record an answer for the current question. Blank answers and answers
    /// outside `AwaitingAnswer` are ignored.
    pub fn submit_answer(&mut self, text: &str) -> Option<Effect> {
        if !self.accepts_input() {
            tracing::debug!("Answer rejected in phase {:?}", self.phase);
            return None;
        }
        if text.trim().is_empty() {
            return None;
        }

        let index = self.current_index;
        let pair = QuestionAnswer {
            question: self.questions[index].clone(),
            answer: text.to_string(),
        };

        self.transcript.push(ChatMessage::answer(index, text));
        self.answers.push(pair.clone());
        self.phase = Phase::LoadingFeedback;

        Some(Effect::FetchFeedback {
            job: self.job.context(),
            questions: vec![pair],
        })
    }

    pub fn on_answer_feedback(&mut self, result: Result<String>) {
        if self.phase != Phase::LoadingFeedback {
            tracing::debug!("Ignoring answer feedback in phase {:?}", self.phase);
            return;
        }

        let content = match result {
            Ok(feedback) => feedback,
            Err(e) => {
                tracing::warn!("Feedback for question {} failed: {:#}", self.current_index + 1, e);
                ANSWER_FEEDBACK_FALLBACK.to_string()
            }
        };
        self.transcript
            .push(ChatMessage::feedback(self.current_index, content));
        self.phase = Phase::AwaitingNext;
    }

    /// Move past the feedback: either pace in the next question or request the
    /// aggregate feedback when none are left.
    pub fn advance(&mut self) -> Option<Effect> {
        if self.phase != Phase::AwaitingNext {
            tracing::debug!("Advance ignored in phase {:?}", self.phase);
            return None;
        }

        if self.has_more_questions() {
            self.phase = Phase::Advancing;
            Some(Effect::ShowNextQuestionAfter(self.advance_delay))
        } else {
            tracing::info!(
                "All {} questions answered, requesting final feedback",
                self.answers.len()
            );
            self.phase = Phase::LoadingFinalFeedback;
            Some(Effect::FetchFinalFeedback {
                job: self.job.context(),
                questions: self.answers.clone(),
            })
        }
    }

    pub fn on_next_question_due(&mut self) {
        if self.phase != Phase::Advancing {
            tracing::debug!("Next question timer ignored in phase {:?}", self.phase);
            return;
        }

        let next = self.current_index + 1;
        self.transcript
            .push(ChatMessage::question(next, self.questions[next].clone()));
        self.current_index = next;
        self.phase = Phase::AwaitingAnswer;
    }

    pub fn on_final_feedback(&mut self, result: Result<String>) {
        if self.phase != Phase::LoadingFinalFeedback {
            tracing::debug!("Ignoring final feedback in phase {:?}", self.phase);
            return;
        }

        let feedback = match result {
            Ok(feedback) => feedback,
            Err(e) => {
                tracing::warn!("Final feedback failed: {:#}", e);
                FINAL_FEEDBACK_FALLBACK.to_string()
            }
        };
        self.phase = Phase::Complete { feedback };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn job() -> Job {
        Job {
            company: "Meta".to_string(),
            title: "Frontend Engineer".to_string(),
            location: "London".to_string(),
            job_type: "Hybrid".to_string(),
            job_level: "Mid senior".to_string(),
            description: "Build things".to_string(),
            first_seen: "2024-01-02".to_string(),
            job_link: None,
            skills: vec!["React".to_string()],
        }
    }

    fn loaded(questions: &[&str]) -> InterviewSession {
        let (mut session, _) = InterviewSession::new(job());
        session.on_questions(Ok(questions.iter().map(|q| q.to_string()).collect()));
        session
    }

    #[test]
    fn test_new_session_requests_questions() {
        let (session, effect) = InterviewSession::new(job());

        assert_eq!(session.phase(), &Phase::LoadingQuestions);
        assert_eq!(effect, Effect::FetchQuestions(job().context()));
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_questions_seed_transcript() {
        let session = loaded(&["Q1", "Q2"]);

        assert_eq!(session.phase(), &Phase::AwaitingAnswer);
        assert_eq!(session.transcript(), &[ChatMessage::question(0, "Q1")]);
        assert_eq!(session.progress_label(), "Question 1 of 2");
    }

    #[test]
    fn test_empty_question_list_is_an_error() {
        let session = loaded(&[]);

        assert!(matches!(session.phase(), Phase::Error { .. }));
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_blank_answer_is_noop() {
        let mut session = loaded(&["Q1"]);

        assert!(session.submit_answer("   \n\t").is_none());
        assert_eq!(session.transcript().len(), 1);
        assert!(session.answers().is_empty());
        assert_eq!(session.phase(), &Phase::AwaitingAnswer);
    }

    #[test]
    fn test_answer_requests_feedback_for_that_pair_only() {
        let mut session = loaded(&["Q1", "Q2"]);

        let effect = session.submit_answer("A1").unwrap();
        match effect {
            Effect::FetchFeedback { questions, .. } => {
                assert_eq!(
                    questions,
                    vec![QuestionAnswer {
                        question: "Q1".to_string(),
                        answer: "A1".to_string()
                    }]
                );
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(session.phase(), &Phase::LoadingFeedback);
        assert!(!session.accepts_input());
        assert!(session.submit_answer("again").is_none());
    }

    #[test]
    fn test_feedback_failure_still_moves_forward() {
        let mut session = loaded(&["Q1", "Q2"]);
        session.submit_answer("A1");

        session.on_answer_feedback(Err(anyhow!("boom")));

        assert_eq!(session.phase(), &Phase::AwaitingNext);
        let last = session.transcript().last().unwrap();
        assert_eq!(last.content, ANSWER_FEEDBACK_FALLBACK);
    }

    #[test]
    fn test_advance_paces_next_question() {
        let mut session = loaded(&["Q1", "Q2"]);
        session.submit_answer("A1");
        session.on_answer_feedback(Ok("Nice".to_string()));

        let effect = session.advance().unwrap();
        assert_eq!(effect, Effect::ShowNextQuestionAfter(DEFAULT_ADVANCE_DELAY));
        assert_eq!(session.phase(), &Phase::Advancing);
        assert_eq!(session.current_index(), 0);

        session.on_next_question_due();
        assert_eq!(session.phase(), &Phase::AwaitingAnswer);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answers().len(), session.current_index());
        assert_eq!(session.progress_label(), "Question 2 of 2");
    }

    #[test]
    fn test_out_of_phase_calls_are_ignored() {
        let mut session = loaded(&["Q1"]);

        assert!(session.advance().is_none());
        session.on_next_question_due();
        session.on_final_feedback(Ok("late".to_string()));
        session.on_answer_feedback(Ok("late".to_string()));

        assert_eq!(session.phase(), &Phase::AwaitingAnswer);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_final_feedback_failure_completes_with_apology() {
        let mut session = loaded(&["Q1"]);
        session.submit_answer("A1");
        session.on_answer_feedback(Ok("ok".to_string()));
        assert!(matches!(
            session.advance(),
            Some(Effect::FetchFinalFeedback { .. })
        ));

        session.on_final_feedback(Err(anyhow!("timeout")));

        assert_eq!(session.final_feedback(), Some(FINAL_FEEDBACK_FALLBACK));
        assert!(!session.accepts_input());
    }
}
