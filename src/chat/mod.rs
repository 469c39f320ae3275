//! AI support chat
//!
//! `ChatSession` owns a transcript and talks to whatever implements
//! `ReplyGenerator`. Generator failures never reach the transcript as errors;
//! they become a fixed apologetic reply.

pub mod session;
pub mod transcript;

use std::future::Future;

pub use session::{
    ChatSession, EMPTY_REPLY_FALLBACK, ERROR_FALLBACK, PendingReply, Reply, ReplyApplied,
    SUGGESTED_PROMPTS, SendOutcome, SendRejected,
};
pub use transcript::{GREETING, GREETING_ID, Message, MessageId, Role, Transcript};

/// Remote service that answers a conversation
///
/// Implementations own the persona instruction; callers send only the
/// transcript in order.
pub trait ReplyGenerator: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Produce the assistant's next reply to the given messages
    fn generate(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
