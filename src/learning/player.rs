//! Slide and quiz state machine for a single chapter
//!
//! A player walks `Viewing(0) .. Viewing(N-1)` and then `Quiz`. A correct
//! answer consumes the completion callback, so a chapter session can complete
//! at most once. Dropping the player mid-chapter discards all progress.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::notify::{Notice, Notifier};
use crate::catalog::{Chapter, Quiz, Slide};

/// Notice shown on a correct answer
pub const CORRECT_NOTICE: &str = "Correct! Well done.";
/// Notice shown on an incorrect answer
pub const INCORRECT_NOTICE: &str = "Not quite. Try again!";
/// Pause between a correct answer and completion
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(1500);

/// Callback invoked once when the chapter is passed
pub type CompletionCallback<'c> = Box<dyn FnOnce() + Send + 'c>;

/// Which part of the chapter is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Viewing,
    Quiz,
}

/// Result of the most recent quiz submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnswerState {
    #[default]
    Unanswered,
    Correct,
    Incorrect,
}

/// Operations rejected by the player
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// Quiz operations need the quiz to be open
    #[error("the quiz is not open yet")]
    NotInQuiz,

    /// Submitting needs a selected option
    #[error("no option selected")]
    NoSelection,

    /// The option does not exist
    #[error("option {index} is out of range for {options} options")]
    OptionOutOfRange { index: usize, options: usize },

    /// The chapter has already been passed
    #[error("chapter already completed")]
    Finished,
}

/// Completion that fires after the configured delay
pub struct PendingCompletion<'c> {
    callback: CompletionCallback<'c>,
    delay: Duration,
}

impl<'c> PendingCompletion<'c> {
    /// Delay before the callback runs
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay, then invoke the completion callback
    pub async fn fire(self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.callback)();
    }

    /// Invoke the completion callback immediately
    pub fn fire_now(self) {
        (self.callback)();
    }
}

impl fmt::Debug for PendingCompletion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCompletion").field("delay", &self.delay).finish_non_exhaustive()
    }
}

/// Outcome of `submit_answer`
#[derive(Debug)]
pub enum Submission<'c> {
    /// Correct answer; the completion still has to be fired
    Passed(PendingCompletion<'c>),
    /// Wrong answer; the learner may pick again
    Failed,
}

/// Plays one chapter for one learner
pub struct ChapterPlayer<'c, N: Notifier> {
    chapter: &'c Chapter,
    notifier: N,
    on_complete: Option<CompletionCallback<'c>>,
    completion_delay: Duration,
    current_slide: usize,
    phase: Phase,
    selected_option: Option<usize>,
    answer_state: AnswerState,
}

impl<'c, N: Notifier> ChapterPlayer<'c, N> {
    /// Open a chapter at its first slide
    pub fn open(
        chapter: &'c Chapter,
        notifier: N,
        on_complete: impl FnOnce() + Send + 'c,
    ) -> Self {
        tracing::debug!("Opening chapter {} ({} slides)", chapter.id(), chapter.slide_count());
        Self {
            chapter,
            notifier,
            on_complete: Some(Box::new(on_complete)),
            completion_delay: DEFAULT_COMPLETION_DELAY,
            current_slide: 0,
            phase: Phase::Viewing,
            selected_option: None,
            answer_state: AnswerState::Unanswered,
        }
    }

    /// Override the pause before completion fires
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    pub fn chapter(&self) -> &'c Chapter {
        self.chapter
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the current (or, during the quiz, last viewed) slide
    pub fn slide_index(&self) -> usize {
        self.current_slide
    }

    /// The slide on screen, if not in the quiz
    pub fn current_slide(&self) -> Option<&'c Slide> {
        match self.phase {
            Phase::Viewing => self.chapter.slides().get(self.current_slide),
            Phase::Quiz => None,
        }
    }

    /// One-based position for "Part i of N" labels
    pub fn slide_position(&self) -> (usize, usize) {
        (self.current_slide + 1, self.chapter.slide_count())
    }

    pub fn quiz(&self) -> &'c Quiz {
        self.chapter.quiz()
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    pub fn answer_state(&self) -> AnswerState {
        self.answer_state
    }

    /// Whether the chapter has been passed
    pub fn is_finished(&self) -> bool {
        self.on_complete.is_none()
    }

    /// Whether `retreat` would do anything
    pub fn can_retreat(&self) -> bool {
        !self.is_finished() && (self.phase == Phase::Quiz || self.current_slide > 0)
    }

    /// Move to the next slide, or into the quiz after the last one
    ///
    /// Returns `false` when nothing changed.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() || self.phase == Phase::Quiz {
            return false;
        }
        let last = self.chapter.slide_count() - 1;
        if self.current_slide < last {
            self.current_slide += 1;
            tracing::debug!("Chapter {}: slide {}", self.chapter.id(), self.current_slide);
        } else {
            self.phase = Phase::Quiz;
            tracing::debug!("Chapter {}: quiz opened", self.chapter.id());
        }
        true
    }

    /// Move back one slide, or from the quiz back to the last slide
    ///
    /// Returns `false` when nothing changed.
    pub fn retreat(&mut self) -> bool {
        if !self.can_retreat() {
            return false;
        }
        match self.phase {
            Phase::Quiz => self.phase = Phase::Viewing,
            Phase::Viewing => self.current_slide -= 1,
        }
        tracing::debug!("Chapter {}: back to slide {}", self.chapter.id(), self.current_slide);
        true
    }

    /// Pick an answer; replaces any earlier pick and clears the last verdict
    pub fn select_option(&mut self, index: usize) -> Result<(), PlayerError> {
        self.ensure_quiz_open()?;
        let options = self.quiz().options.len();
        if index >= options {
            return Err(PlayerError::OptionOutOfRange { index, options });
        }
        self.selected_option = Some(index);
        self.answer_state = AnswerState::Unanswered;
        Ok(())
    }

    /// Check the selected answer
    ///
    /// A wrong answer can be corrected any number of times. The first correct
    /// answer hands back the completion; later calls fail with `Finished`.
    pub fn submit_answer(&mut self) -> Result<Submission<'c>, PlayerError> {
        self.ensure_quiz_open()?;
        let selected = self.selected_option.ok_or(PlayerError::NoSelection)?;

        if !self.quiz().is_correct(selected) {
            self.answer_state = AnswerState::Incorrect;
            self.notifier.notify(Notice::error(INCORRECT_NOTICE));
            tracing::debug!("Chapter {}: option {} is wrong", self.chapter.id(), selected);
            return Ok(Submission::Failed);
        }

        self.answer_state = AnswerState::Correct;
        let callback = self.on_complete.take().ok_or(PlayerError::Finished)?;
        self.notifier.notify(Notice::success(CORRECT_NOTICE));
        tracing::info!("Chapter {} passed", self.chapter.id());

        Ok(Submission::Passed(PendingCompletion { callback, delay: self.completion_delay }))
    }

    fn ensure_quiz_open(&self) -> Result<(), PlayerError> {
        if self.is_finished() {
            return Err(PlayerError::Finished);
        }
        if self.phase != Phase::Quiz {
            return Err(PlayerError::NotInQuiz);
        }
        Ok(())
    }
}
