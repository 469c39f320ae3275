//! Chat session: transcript plus one outstanding reply at a time
//!
//! A send is split in three steps so a host can stay responsive while the
//! request is in flight: `begin_send` records the user's turn and hands back a
//! `PendingReply`, `PendingReply::resolve` talks to the generator, and `apply`
//! appends the answer. `send` chains all three.
//!
//! Only one reply may be outstanding; a second send while waiting is
//! rejected. `clear` cancels the outstanding request and bumps the transcript
//! generation, so a reply that still arrives for the old conversation is
//! dropped instead of appended.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::ReplyGenerator;
use super::transcript::{Message, Role, Transcript};

/// Reply used when the generator fails for any reason
pub const ERROR_FALLBACK: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

/// Reply used when the generator answers with nothing
pub const EMPTY_REPLY_FALLBACK: &str = "I'm here with you. Could you share a bit more?";

/// Conversation starters offered on a fresh transcript
pub const SUGGESTED_PROMPTS: &[&str] = &[
    "I received a hateful message.",
    "How can I help a bullied friend?",
    "I feel overwhelmed by social media.",
    "Is this considered hate speech?",
];

/// Suggestions are shown while the transcript is shorter than this
const SUGGESTION_LIMIT: usize = 3;

/// Why a send was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    /// Input was empty after trimming
    EmptyInput,
    /// A reply is still outstanding
    Busy,
}

/// Outcome of a full `send`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant's reply was appended
    Replied(Message),
    /// Nothing was sent
    Rejected(SendRejected),
    /// The conversation was reset before the reply landed
    Stale,
}

/// Outcome of applying a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyApplied {
    /// Appended to the transcript
    Appended(Message),
    /// Belonged to a cleared conversation and was dropped
    Stale,
}

/// Reply text tagged with the conversation generation it answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    generation: u64,
    /// `None` when the request was cancelled
    content: Option<String>,
}

impl Reply {
    /// Text that would be appended, if the request was not cancelled
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// An outstanding reply request
#[derive(Debug)]
pub struct PendingReply<G> {
    generation: u64,
    messages: Vec<Message>,
    generator: Arc<G>,
    cancel: CancellationToken,
}

impl<G: ReplyGenerator> PendingReply<G> {
    /// Messages sent to the generator
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Ask the generator, mapping every failure to the safe fallback
    pub async fn resolve(self) -> Reply {
        let generation = self.generation;
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("Reply for generation {} cancelled", generation);
                return Reply { generation, content: None };
            }
            result = self.generator.generate(&self.messages) => result,
        };

        let content = match result {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() { EMPTY_REPLY_FALLBACK.to_string() } else { text.to_string() }
            }
            Err(e) => {
                tracing::warn!("Reply generation failed: {}", e);
                ERROR_FALLBACK.to_string()
            }
        };
        Reply { generation, content: Some(content) }
    }
}

/// One mounted support chat
pub struct ChatSession<G> {
    generator: Arc<G>,
    transcript: Transcript,
    draft: String,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl<G: ReplyGenerator> ChatSession<G> {
    /// Start a conversation with the greeting
    pub fn new(generator: G) -> Self {
        Self::with_shared(Arc::new(generator))
    }

    /// Start a conversation with a generator shared with other sessions
    pub fn with_shared(generator: Arc<G>) -> Self {
        Self {
            generator,
            transcript: Transcript::new(),
            draft: String::new(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    /// Typing indicator: true while a reply is outstanding
    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starter prompts, offered only at the start of a conversation
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.transcript.len() < SUGGESTION_LIMIT { SUGGESTED_PROMPTS } else { &[] }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Record the user's turn and start a reply request
    ///
    /// On success the draft is cleared and the session waits for `apply`.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingReply<G>, SendRejected> {
        if text.trim().is_empty() {
            return Err(SendRejected::EmptyInput);
        }
        if self.is_awaiting_reply() {
            tracing::debug!("Send rejected while a reply is outstanding");
            return Err(SendRejected::Busy);
        }

        self.transcript.push(Role::User, text);
        self.draft.clear();

        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        tracing::debug!(
            "Requesting reply for {} messages (generation {})",
            self.transcript.len(),
            self.generation
        );

        Ok(PendingReply {
            generation: self.generation,
            messages: self.transcript.messages().to_vec(),
            generator: Arc::clone(&self.generator),
            cancel,
        })
    }

    /// Append a resolved reply if it still belongs to this conversation
    pub fn apply(&mut self, reply: Reply) -> ReplyApplied {
        if reply.generation != self.generation {
            tracing::debug!("Dropping stale reply for generation {}", reply.generation);
            return ReplyApplied::Stale;
        }
        self.in_flight = None;
        match reply.content {
            Some(content) => ReplyApplied::Appended(
                self.transcript.push(Role::Assistant, content).clone(),
            ),
            None => ReplyApplied::Stale,
        }
    }

    /// Send a user turn and wait for the assistant's reply
    ///
    /// Dropping the returned future before it completes cancels the request
    /// and returns the session to idle; the user's turn stays in the
    /// transcript.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let pending = match self.begin_send(text) {
            Ok(pending) => pending,
            Err(rejected) => return SendOutcome::Rejected(rejected),
        };
        let guard = InFlightGuard { generation: pending.generation, session: self, armed: true };
        let reply = pending.resolve().await;
        match guard.apply(reply) {
            ReplyApplied::Appended(message) => SendOutcome::Replied(message),
            ReplyApplied::Stale => SendOutcome::Stale,
        }
    }

    /// Send whatever is in the draft buffer
    pub async fn send_draft(&mut self) -> SendOutcome {
        let text = self.draft.clone();
        self.send(&text).await
    }

    /// Reset to the greeting and abandon any outstanding reply
    pub fn clear(&mut self) {
        if let Some(cancel) = self.in_flight.take() {
            cancel.cancel();
        }
        self.generation += 1;
        self.transcript.clear();
        tracing::info!("Chat cleared");
    }
}

impl<G> ChatSession<G> {
    /// Cancel the outstanding request of `generation` without touching the
    /// transcript
    fn abandon(&mut self, generation: u64) {
        if generation != self.generation {
            return;
        }
        if let Some(cancel) = self.in_flight.take() {
            cancel.cancel();
            tracing::debug!("Abandoned reply for generation {}", generation);
        }
    }
}

/// Returns the session to idle if a `send` is dropped mid-request
struct InFlightGuard<'s, G> {
    session: &'s mut ChatSession<G>,
    generation: u64,
    armed: bool,
}

impl<G: ReplyGenerator> InFlightGuard<'_, G> {
    fn apply(mut self, reply: Reply) -> ReplyApplied {
        self.armed = false;
        self.session.apply(reply)
    }
}

impl<G> Drop for InFlightGuard<'_, G> {
    fn drop(&mut self) {
        if self.armed {
            self.session.abandon(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use thiserror::Error;

    use super::*;
    use crate::chat::transcript::{GREETING, GREETING_ID};

    #[derive(Debug, Error)]
    #[error("service unavailable")]
    struct Unavailable;

    /// Answers from a script and records how many messages each request held
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, Unavailable>>>,
        seen: Mutex<Vec<Vec<(Role, String)>>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, Unavailable>>) -> Self {
            let replies = replies.into_iter().map(|r| r.map(str::to_string)).collect();
            Self { replies: Mutex::new(replies), seen: Mutex::default() }
        }
    }

    impl ReplyGenerator for Scripted {
        type Error = Unavailable;

        async fn generate(&self, messages: &[Message]) -> Result<String, Unavailable> {
            let snapshot = messages.iter().map(|m| (m.role, m.content.clone())).collect();
            self.seen.lock().unwrap().push(snapshot);
            self.replies.lock().unwrap().pop_front().unwrap_or(Ok("ok".to_string()))
        }
    }

    /// Never answers
    struct Silent;

    impl ReplyGenerator for Silent {
        type Error = Unavailable;

        async fn generate(&self, _messages: &[Message]) -> Result<String, Unavailable> {
            std::future::pending().await
        }
    }

    fn replied(outcome: SendOutcome) -> Message {
        match outcome {
            SendOutcome::Replied(message) => message,
            other => panic!("expected a reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn each_send_appends_user_and_assistant() {
        let mut session =
            ChatSession::new(Scripted::new(vec![Ok("first"), Err(Unavailable), Ok("third")]));

        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            session.send(text).await;
            assert_eq!(session.messages().len(), 1 + 2 * (i + 1));
            assert!(!session.is_awaiting_reply());
        }

        let roles: Vec<_> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
            ]
        );
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut session = ChatSession::new(Scripted::default());
        for text in ["", "   ", "\n\t"] {
            assert_eq!(session.send(text).await, SendOutcome::Rejected(SendRejected::EmptyInput));
        }
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn failure_appends_fallback_literal() {
        let mut session = ChatSession::new(Scripted::new(vec![Err(Unavailable)]));
        let message = replied(session.send("I received a hateful message.").await);
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(
            message.content,
            "I'm sorry, I'm having trouble responding right now. Please try again in a moment."
        );
    }

    #[tokio::test]
    async fn empty_reply_asks_for_more() {
        let mut session = ChatSession::new(Scripted::new(vec![Ok("   ")]));
        let message = replied(session.send("hi").await);
        assert_eq!(message.content, EMPTY_REPLY_FALLBACK);
    }

    #[tokio::test]
    async fn replies_are_trimmed() {
        let mut session = ChatSession::new(Scripted::new(vec![Ok("\n  You are not alone.  \n")]));
        let message = replied(session.send("hi").await);
        assert_eq!(message.content, "You are not alone.");
    }

    #[tokio::test]
    async fn whole_transcript_is_sent_in_order() {
        let generator = Arc::new(Scripted::new(vec![Ok("a1"), Ok("a2")]));
        let mut session = ChatSession::with_shared(Arc::clone(&generator));
        session.send("u1").await;
        session.send("u2").await;

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[1],
            vec![
                (Role::Assistant, GREETING.to_string()),
                (Role::User, "u1".to_string()),
                (Role::Assistant, "a1".to_string()),
                (Role::User, "u2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn clear_resets_to_greeting() {
        let mut session = ChatSession::new(Scripted::default());
        session.send("one").await;
        session.send("two").await;
        session.clear();

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].id, GREETING_ID);
        assert_eq!(session.messages()[0].content, GREETING);
    }

    #[test]
    fn second_send_while_waiting_is_busy() {
        let mut session = ChatSession::new(Silent);
        let pending = session.begin_send("first").unwrap();
        assert!(session.is_awaiting_reply());
        assert_eq!(pending.messages().len(), 2);

        assert!(matches!(session.begin_send("second"), Err(SendRejected::Busy)));
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn reply_after_clear_is_dropped() {
        let mut session = ChatSession::new(Scripted::new(vec![Ok("late")]));
        let pending = session.begin_send("hello").unwrap();
        session.clear();
        assert!(!session.is_awaiting_reply());

        let reply = pending.resolve().await;
        assert_eq!(session.apply(reply), ReplyApplied::Stale);
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn clear_cancels_a_hung_request() {
        let mut session = ChatSession::new(Silent);
        let pending = session.begin_send("hello").unwrap();
        session.clear();

        let reply = pending.resolve().await;
        assert_eq!(reply.content(), None);
        assert_eq!(session.apply(reply), ReplyApplied::Stale);
    }

    #[tokio::test]
    async fn new_send_after_clear_is_accepted() {
        let mut session = ChatSession::new(Scripted::new(vec![Ok("stale"), Ok("fresh")]));
        let stale = session.begin_send("old").unwrap();
        session.clear();

        let fresh = session.begin_send("new").unwrap();
        let stale_reply = stale.resolve().await;
        let fresh_reply = fresh.resolve().await;

        assert_eq!(session.apply(stale_reply), ReplyApplied::Stale);
        assert!(matches!(session.apply(fresh_reply), ReplyApplied::Appended(_)));
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test]
    async fn dropped_send_returns_to_idle() {
        let mut session = ChatSession::new(Silent);
        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), session.send("hi")).await;
        assert!(timed_out.is_err());

        assert!(!session.is_awaiting_reply());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].content, "hi");
        assert!(session.begin_send("again").is_ok());
    }

    #[test]
    fn abandon_ignores_cleared_generation() {
        let mut session = ChatSession::new(Silent);
        let pending = session.begin_send("old").unwrap();
        session.clear();
        let fresh = session.begin_send("new").unwrap();

        session.abandon(pending.generation);
        assert!(session.is_awaiting_reply());
        assert!(!fresh.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn draft_is_cleared_on_send() {
        let mut session = ChatSession::new(Scripted::default());
        session.set_draft("How can I help a bullied friend?");
        replied(session.send_draft().await);
        assert_eq!(session.draft(), "");
        assert_eq!(session.messages()[1].content, "How can I help a bullied friend?");
    }

    #[tokio::test]
    async fn suggestions_only_on_fresh_conversation() {
        let mut session = ChatSession::new(Scripted::default());
        assert_eq!(session.suggestions().len(), 4);
        let prompt = session.suggestions()[0];
        session.send(prompt).await;
        assert!(session.suggestions().is_empty());
        session.clear();
        assert_eq!(session.suggestions(), SUGGESTED_PROMPTS);
    }
}
