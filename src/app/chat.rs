//! Console view for the support chat

use anyhow::Result;
use tokio::io::{AsyncBufRead, Lines};

use super::command::{ChatCommand, ParseResult, parse_chat};
use super::console::{rule, wrap_prefixed};
use crate::chat::{ChatSession, Message, ReplyApplied, ReplyGenerator, Role, SendRejected};

const ASSISTANT_NAME: &str = "PeaceNet AI";
const DISCLAIMER: &str =
    "PeaceNet AI can make mistakes. Consider checking important information with a professional.";
const HELP: &str = "Type a message and press Enter. :1-:4 send a suggestion, :clear resets the \
conversation, :quit leaves.";

/// Interactive chat loop over a line source
pub struct ChatView<G: ReplyGenerator> {
    session: ChatSession<G>,
    width: usize,
}

impl<G: ReplyGenerator> ChatView<G> {
    pub fn new(session: ChatSession<G>, width: usize) -> Self {
        Self { session, width }
    }

    /// Run until the user quits or input ends
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, lines: &mut Lines<R>) -> Result<()> {
        println!("{}", rule(self.width));
        println!("{} \u{00b7} online & ready to help", ASSISTANT_NAME);
        println!("{}", rule(self.width));
        self.print_transcript();
        self.print_suggestions();

        while let Some(line) = lines.next_line().await? {
            let text = match parse_chat(&line) {
                ParseResult::Ok(ChatCommand::Say(text)) => text,
                ParseResult::Ok(ChatCommand::Suggestion(i)) => {
                    match self.session.suggestions().get(i) {
                        Some(prompt) => {
                            println!("{}", wrap_prefixed("You: ", prompt, self.width));
                            prompt.to_string()
                        }
                        None => {
                            println!("No suggestion {} right now.", i + 1);
                            continue;
                        }
                    }
                }
                ParseResult::Ok(ChatCommand::Clear) => {
                    self.session.clear();
                    self.print_transcript();
                    self.print_suggestions();
                    continue;
                }
                ParseResult::Ok(ChatCommand::Quit) => return Ok(()),
                ParseResult::Ok(ChatCommand::Help) => {
                    println!("{}", HELP);
                    continue;
                }
                ParseResult::UnknownCommand(cmd) => {
                    println!("Unknown command: :{}", cmd);
                    continue;
                }
            };

            if !self.exchange(&text, lines).await? {
                return Ok(());
            }
        }

        Ok(())
    }

    /// Send one turn and wait for the reply while still reading input
    ///
    /// Returns `false` if the user quit while waiting.
    async fn exchange<R: AsyncBufRead + Unpin>(
        &mut self,
        text: &str,
        lines: &mut Lines<R>,
    ) -> Result<bool> {
        let pending = match self.session.begin_send(text) {
            Ok(pending) => pending,
            Err(SendRejected::EmptyInput) => return Ok(true),
            Err(SendRejected::Busy) => {
                println!("Still waiting for the last reply.");
                return Ok(true);
            }
        };
        println!("{} is typing...", ASSISTANT_NAME);

        let reply = pending.resolve();
        tokio::pin!(reply);
        let mut input_open = true;

        loop {
            tokio::select! {
                biased;

                reply = &mut reply => {
                    if let ReplyApplied::Appended(message) = self.session.apply(reply) {
                        self.print_message(&message);
                    }
                    return Ok(true);
                }
                line = lines.next_line(), if input_open => {
                    let Some(line) = line? else {
                        input_open = false;
                        continue;
                    };
                    match parse_chat(&line) {
                        ParseResult::Ok(ChatCommand::Clear) => {
                            self.session.clear();
                            self.print_transcript();
                            self.print_suggestions();
                        }
                        ParseResult::Ok(ChatCommand::Quit) => return Ok(false),
                        _ => println!("Still waiting for the last reply."),
                    }
                }
            }
        }
    }

    fn print_transcript(&self) {
        for message in self.session.messages() {
            self.print_message(message);
        }
    }

    fn print_message(&self, message: &Message) {
        let prefix = match message.role {
            Role::User => "You: ".to_string(),
            Role::Assistant => format!("{}: ", ASSISTANT_NAME),
        };
        println!("{}", wrap_prefixed(&prefix, &message.content, self.width));
    }

    fn print_suggestions(&self) {
        let suggestions = self.session.suggestions();
        if suggestions.is_empty() {
            return;
        }
        println!();
        for (i, prompt) in suggestions.iter().enumerate() {
            println!("  :{}  {}", i + 1, prompt);
        }
        println!();
        println!("{}", DISCLAIMER);
    }
}

#[cfg(test)]
mod tests {
    use thiserror::Error;
    use tokio::io::AsyncBufReadExt;

    use super::*;
    use crate::chat::{ERROR_FALLBACK, GREETING, SUGGESTED_PROMPTS};

    #[derive(Debug, Error)]
    #[error("offline")]
    struct Offline;

    /// Echoes the last user message, fails on "fail", never answers "hang"
    struct Echo;

    impl ReplyGenerator for Echo {
        type Error = Offline;

        async fn generate(&self, messages: &[Message]) -> Result<String, Offline> {
            match messages.last().map(|m| m.content.as_str()) {
                Some("fail") => Err(Offline),
                Some("hang") => std::future::pending().await,
                Some(text) => Ok(format!("echo: {text}")),
                None => Ok(String::new()),
            }
        }
    }

    async fn chat(input: &'static str) -> ChatView<Echo> {
        let mut view = ChatView::new(ChatSession::new(Echo), 80);
        let mut lines = input.as_bytes().lines();
        view.run(&mut lines).await.unwrap();
        view
    }

    fn contents(view: &ChatView<Echo>) -> Vec<String> {
        view.session.messages().iter().map(|m| m.content.clone()).collect()
    }

    #[tokio::test]
    async fn typed_lines_get_replies() {
        let view = chat("hello\nfail\n:quit\n").await;
        assert_eq!(
            contents(&view),
            vec![GREETING, "hello", "echo: hello", "fail", ERROR_FALLBACK]
        );
    }

    #[tokio::test]
    async fn suggestion_shortcut_sends_prompt() {
        let view = chat(":2\n").await;
        let expected = format!("echo: {}", SUGGESTED_PROMPTS[1]);
        assert_eq!(contents(&view), vec![GREETING, SUGGESTED_PROMPTS[1], expected.as_str()]);
    }

    #[tokio::test]
    async fn clear_while_waiting_drops_the_reply() {
        let view = chat("hang\n:1\n:clear\nhello\n").await;
        assert_eq!(contents(&view), vec![GREETING, "hello", "echo: hello"]);
        assert!(!view.session.is_awaiting_reply());
    }

    #[tokio::test]
    async fn commands_are_not_sent() {
        let view = chat(":help\n:dance\n   \n:clear\n").await;
        assert_eq!(contents(&view), vec![GREETING]);
        assert!(!view.session.is_awaiting_reply());
    }
}
