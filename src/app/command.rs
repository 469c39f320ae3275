//! Input parsing for the console views

/// A line typed into the chat view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Plain text to send: anything not starting with ':'
    Say(String),
    /// Send a suggested prompt (zero-based): :1, :2, ...
    Suggestion(usize),
    /// Reset the conversation: :clear or :c
    Clear,
    /// Leave the chat: :q or :quit
    Quit,
    /// Show help: :help or :h
    Help,
}

/// A line typed into the chapter view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnCommand {
    /// Next slide: n, next, or an empty line
    Next,
    /// Previous slide: p, prev, back
    Previous,
    /// Choose an option (zero-based): 1..9 or a..z
    Select(usize),
    /// Check the selected answer: s, submit, check
    Submit,
    /// Close the chapter: q, quit
    Quit,
    /// Show help: h, help, ?
    Help,
}

/// Result of parsing a line
#[derive(Debug, PartialEq, Eq)]
pub enum ParseResult<T> {
    /// Successfully parsed command
    Ok(T),
    /// Unknown command
    UnknownCommand(String),
}

/// Parse a chat line
pub fn parse_chat(input: &str) -> ParseResult<ChatCommand> {
    let trimmed = input.trim();
    let Some(cmd) = trimmed.strip_prefix(':') else {
        return ParseResult::Ok(ChatCommand::Say(input.to_string()));
    };

    let cmd = cmd.trim().to_lowercase();
    match cmd.as_str() {
        "clear" | "c" => ParseResult::Ok(ChatCommand::Clear),
        "quit" | "q" | "exit" => ParseResult::Ok(ChatCommand::Quit),
        "help" | "h" | "?" => ParseResult::Ok(ChatCommand::Help),
        _ => match cmd.parse::<usize>() {
            Ok(n) if n > 0 => ParseResult::Ok(ChatCommand::Suggestion(n - 1)),
            _ => ParseResult::UnknownCommand(cmd),
        },
    }
}

/// Parse a chapter-view line
pub fn parse_learn(input: &str) -> ParseResult<LearnCommand> {
    let cmd = input.trim().to_lowercase();

    match cmd.as_str() {
        "" | "n" | "next" => ParseResult::Ok(LearnCommand::Next),
        "p" | "prev" | "previous" | "back" => ParseResult::Ok(LearnCommand::Previous),
        "s" | "submit" | "check" => ParseResult::Ok(LearnCommand::Submit),
        "q" | "quit" | "close" => ParseResult::Ok(LearnCommand::Quit),
        "h" | "help" | "?" => ParseResult::Ok(LearnCommand::Help),
        _ => parse_option(&cmd)
            .map(|i| ParseResult::Ok(LearnCommand::Select(i)))
            .unwrap_or(ParseResult::UnknownCommand(cmd)),
    }
}

/// "2" or "b" both mean the second option
fn parse_option(cmd: &str) -> Option<usize> {
    if let Ok(n) = cmd.parse::<usize>() {
        return n.checked_sub(1);
    }
    let mut chars = cmd.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='z'), None) => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

/// Letter label for an option index
pub fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
