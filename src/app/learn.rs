//! Console view for a chapter player

use anyhow::Result;
use tokio::io::{AsyncBufRead, Lines};

use super::command::{LearnCommand, ParseResult, option_letter, parse_learn};
use super::console::{rule, wrap, wrap_prefixed};
use crate::learning::{AnswerState, ChapterPlayer, Notifier, Phase, Submission};

const SLIDE_HINT: &str = "[n] next  [p] previous  [q] close";
const QUIZ_HINT: &str = "[1-9 / a-z] choose  [s] check answer  [p] back to slides  [q] close";

/// How a chapter session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnExit {
    /// The quiz was passed and completion fired
    Completed,
    /// The learner left early; no progress kept
    Closed,
}

/// Drives a `ChapterPlayer` from console input
pub struct LearnView<'c, N: Notifier> {
    player: ChapterPlayer<'c, N>,
    width: usize,
}

impl<'c, N: Notifier> LearnView<'c, N> {
    pub fn new(player: ChapterPlayer<'c, N>, width: usize) -> Self {
        Self { player, width }
    }

    /// Run until the chapter is passed, closed, or input ends
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, lines: &mut Lines<R>) -> Result<LearnExit> {
        println!("{}", rule(self.width));
        println!("{}", self.player.chapter().title());
        println!("{}", rule(self.width));
        self.render();

        while let Some(line) = lines.next_line().await? {
            let command = match parse_learn(&line) {
                ParseResult::Ok(command) => command,
                ParseResult::UnknownCommand(cmd) => {
                    println!("Unknown command: {}  (h for help)", cmd);
                    continue;
                }
            };

            match command {
                LearnCommand::Next => {
                    if !self.player.advance() {
                        println!("Answer the question to finish the chapter.");
                        continue;
                    }
                }
                LearnCommand::Previous => {
                    if !self.player.retreat() {
                        println!("Already at the first part.");
                        continue;
                    }
                }
                LearnCommand::Select(index) => {
                    if let Err(e) = self.player.select_option(index) {
                        println!("{}", e);
                        continue;
                    }
                }
                LearnCommand::Submit => match self.player.submit_answer() {
                    Ok(Submission::Passed(completion)) => {
                        completion.fire().await;
                        return Ok(LearnExit::Completed);
                    }
                    Ok(Submission::Failed) => {}
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                },
                LearnCommand::Quit => return Ok(LearnExit::Closed),
                LearnCommand::Help => {
                    println!("{}", self.hint());
                    continue;
                }
            }
            self.render();
        }

        Ok(LearnExit::Closed)
    }

    fn hint(&self) -> &'static str {
        match self.player.phase() {
            Phase::Viewing => SLIDE_HINT,
            Phase::Quiz => QUIZ_HINT,
        }
    }

    fn render(&self) {
        println!();
        match self.player.current_slide() {
            Some(slide) => {
                let (part, total) = self.player.slide_position();
                println!("PART {} OF {}", part, total);
                println!("{}", slide.title);
                println!();
                println!("{}", wrap(&slide.content, self.width));
                println!();
                println!("{}", progress_dots(part - 1, total));
            }
            None => {
                let quiz = self.player.quiz();
                println!("Knowledge Check");
                println!();
                println!("{}", wrap(&quiz.question, self.width));
                println!();
                for (i, option) in quiz.options.iter().enumerate() {
                    let marker = self.option_marker(i);
                    let prefix = format!("  {} {}) ", marker, option_letter(i));
                    println!("{}", wrap_prefixed(&prefix, option, self.width));
                }
            }
        }
        println!("{}", self.hint());
    }

    fn option_marker(&self, index: usize) -> &'static str {
        if self.player.selected_option() != Some(index) {
            return "\u{25CB}"; // ○
        }
        match self.player.answer_state() {
            AnswerState::Unanswered => "\u{25CF}", // ●
            AnswerState::Correct => "\u{2713}",    // ✓
            AnswerState::Incorrect => "\u{2717}",  // ✗
        }
    }
}

/// One dot per slide plus one for the quiz, current slide highlighted
fn progress_dots(current: usize, total: usize) -> String {
    let mut dots: Vec<&str> =
        (0..total).map(|i| if i == current { "\u{25CF}" } else { "\u{00B7}" }).collect();
    dots.push("\u{00B7}");
    dots.join(" ")
}
