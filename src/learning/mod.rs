//! Educational chapter playback

pub mod notify;
pub mod player;

pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use player::{AnswerState, ChapterPlayer, PendingCompletion, Phase, PlayerError, Submission};
