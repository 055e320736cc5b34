// src/quiz/attempt.rs

//! State machine for one user's run through a quiz.
//!
//! `Ready -> InProgress -> Submitting -> Completed`, and `Completed -> InProgress`
//! on retake. Loading and load errors happen before an attempt exists.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        quiz::{PublicQuestion, Quiz},
        submission::{AnswerMap, QuizResult},
    },
    quiz::{
        recorder::PersistenceOutcome,
        scorer,
        timer::{Countdown, Tick},
        tracker::{AnswerSelection, Navigator},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    Ready,
    InProgress,
    Submitting,
    Completed,
}

/// What ended the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitTrigger {
    User,
    TimerExpired,
}

#[derive(Debug)]
pub struct QuizAttempt {
    id: Uuid,
    quiz: Arc<Quiz>,
    user_id: Option<Uuid>,
    phase: QuizPhase,
    answers: AnswerSelection,
    navigator: Navigator,
    countdown: Option<Countdown>,
    result: Option<QuizResult>,
    trigger: Option<SubmitTrigger>,
    persistence: Option<PersistenceOutcome>,
    /// 1 for the first run, incremented on each retake.
    round: u32,
}

impl QuizAttempt {
    pub fn new(quiz: Arc<Quiz>, user_id: Option<Uuid>) -> Self {
        let total = quiz.total_questions();
        Self {
            id: Uuid::new_v4(),
            quiz,
            user_id,
            phase: QuizPhase::Ready,
            answers: AnswerSelection::default(),
            navigator: Navigator::new(total),
            countdown: None,
            result: None,
            trigger: None,
            persistence: None,
            round: 1,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn answers(&self) -> &AnswerMap {
        self.answers.as_map()
    }

    pub fn current_question(&self) -> usize {
        self.navigator.current()
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.countdown.map(|c| c.remaining())
    }

    pub fn result(&self) -> Option<QuizResult> {
        self.result
    }

    /// True while a timer should be running for this attempt.
    pub fn is_timed(&self) -> bool {
        self.phase == QuizPhase::InProgress && self.countdown.is_some_and(|c| c.is_active())
    }

    /// Ready -> InProgress. Arms the countdown when the quiz has a time limit.
    pub fn start(&mut self) -> Result<(), AppError> {
        if self.phase != QuizPhase::Ready {
            return Err(AppError::Conflict("Attempt already started".to_string()));
        }
        self.countdown = self.quiz.time_limit_secs().map(Countdown::new);
        self.phase = QuizPhase::InProgress;
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), AppError> {
        if self.phase != QuizPhase::InProgress {
            return Err(AppError::Conflict("Attempt is not in progress".to_string()));
        }
        Ok(())
    }

    /// Selects an option for the visible question.
    pub fn select_option(&mut self, option: usize) -> Result<(), AppError> {
        self.ensure_in_progress()?;
        let index = self.navigator.current();
        let option_count = self.quiz.questions[index].options.len();
        self.answers
            .select(index, option, self.quiz.total_questions(), option_count)
    }

    /// Requires an answer on the visible question. No-op on the last question.
    pub fn next(&mut self) -> Result<bool, AppError> {
        self.ensure_in_progress()?;
        if !self.answers.is_answered(self.navigator.current()) {
            return Err(AppError::BadRequest(
                "Select an answer before moving on".to_string(),
            ));
        }
        Ok(self.navigator.next())
    }

    /// No-op on the first question.
    pub fn previous(&mut self) -> Result<bool, AppError> {
        self.ensure_in_progress()?;
        Ok(self.navigator.previous())
    }

    /// The last question is answered while visible, or every question has an answer.
    pub fn can_submit(&self) -> bool {
        if self.phase != QuizPhase::InProgress {
            return false;
        }
        let on_answered_last =
            self.navigator.is_last() && self.answers.is_answered(self.navigator.current());
        on_answered_last || self.all_answered()
    }

    pub fn all_answered(&self) -> bool {
        self.answers.answered_count() == self.quiz.total_questions()
    }

    /// Advances the countdown by one second. `Stopped` once the attempt has left InProgress.
    pub fn tick(&mut self) -> Tick {
        if self.phase != QuizPhase::InProgress {
            return Tick::Stopped;
        }
        match self.countdown.as_mut() {
            Some(countdown) => countdown.tick(),
            None => Tick::Stopped,
        }
    }

    /// InProgress -> Submitting. Scores the current answers and freezes the countdown.
    ///
    /// A timer-triggered submission takes whatever answers exist.
    pub fn begin_submit(&mut self, trigger: SubmitTrigger) -> Result<QuizResult, AppError> {
        self.ensure_in_progress()?;
        if trigger == SubmitTrigger::User && !self.can_submit() {
            return Err(AppError::BadRequest(
                "Answer the remaining questions before submitting".to_string(),
            ));
        }

        if let Some(countdown) = self.countdown.as_mut() {
            countdown.stop();
        }

        let result = scorer::score(
            &self.quiz.questions,
            self.answers.as_map(),
            self.quiz.passing_score,
        );
        self.result = Some(result);
        self.trigger = Some(trigger);
        self.phase = QuizPhase::Submitting;
        Ok(result)
    }

    /// Submitting -> Completed, whatever happened to persistence.
    pub fn complete(&mut self, outcome: PersistenceOutcome) {
        if self.phase == QuizPhase::Submitting {
            self.persistence = Some(outcome);
            self.phase = QuizPhase::Completed;
        }
    }

    /// Completed -> InProgress with empty answers, first question and a fresh countdown.
    /// The quiz definition is reused.
    pub fn retake(&mut self) -> Result<(), AppError> {
        if self.phase != QuizPhase::Completed {
            return Err(AppError::Conflict(
                "Only a completed attempt can be retaken".to_string(),
            ));
        }
        self.answers.clear();
        self.navigator.reset();
        self.result = None;
        self.trigger = None;
        self.persistence = None;
        self.countdown = self.quiz.time_limit_secs().map(Countdown::new);
        self.round += 1;
        self.phase = QuizPhase::InProgress;
        Ok(())
    }

    pub fn snapshot(&self) -> AttemptSnapshot {
        let index = self.navigator.current();
        let completed = self.phase == QuizPhase::Completed;

        let certificate_href = match &self.persistence {
            Some(PersistenceOutcome::Recorded {
                enrollment_completed: true,
                ..
            }) => Some(format!("/courses/{}/certificate", self.quiz.course_id)),
            _ => None,
        };

        let review = if completed {
            self.quiz
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| ReviewItem {
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                    selected: self.answers.get(i),
                    correct_option: q.correct_option,
                    explanation: q.explanation.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let current_question = self.quiz.questions.get(index).map(|q| PublicQuestion {
            id: q.id,
            prompt: q.prompt.clone(),
            options: q.options.clone(),
        });

        AttemptSnapshot {
            attempt_id: self.id,
            quiz_id: self.quiz.id,
            course_id: self.quiz.course_id,
            round: self.round,
            phase: self.phase,
            current_index: index,
            total_questions: self.quiz.total_questions(),
            current_question,
            selected_option: self.answers.get(index),
            answers: self.answers.as_map().clone(),
            can_go_next: self.phase == QuizPhase::InProgress
                && !self.navigator.is_last()
                && self.answers.is_answered(index),
            can_go_previous: self.phase == QuizPhase::InProgress && !self.navigator.is_first(),
            can_submit: self.can_submit(),
            can_submit_early: self.phase == QuizPhase::InProgress
                && self.all_answered()
                && !self.navigator.is_last(),
            remaining_secs: self.remaining_secs(),
            result: self.result,
            submitted_by: self.trigger,
            persistence: self.persistence.clone(),
            notice: self
                .persistence
                .as_ref()
                .and_then(|p| p.notice())
                .map(str::to_string),
            certificate_href,
            review,
        }
    }
}

/// A question with the user's choice and the correct answer, shown after completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewItem {
    pub prompt: String,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub correct_option: usize,
    pub explanation: Option<String>,
}

/// Serializable view of an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSnapshot {
    pub attempt_id: Uuid,
    pub quiz_id: Uuid,
    pub course_id: Uuid,
    pub round: u32,
    pub phase: QuizPhase,
    pub current_index: usize,
    pub total_questions: usize,
    pub current_question: Option<PublicQuestion>,
    pub selected_option: Option<usize>,
    pub answers: AnswerMap,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub can_submit: bool,
    pub can_submit_early: bool,
    pub remaining_secs: Option<u64>,
    pub result: Option<QuizResult>,
    pub submitted_by: Option<SubmitTrigger>,
    pub persistence: Option<PersistenceOutcome>,
    pub notice: Option<String>,
    pub certificate_href: Option<String>,
    pub review: Vec<ReviewItem>,
}
