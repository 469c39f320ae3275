//! Terminal output helpers

use crate::learning::{Notice, NoticeLevel, Notifier};

/// Prints notices inline with the console transcript
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    width: usize,
}

impl ConsoleNotifier {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", format_notice(&notice, self.width));
    }
}

/// Render a notice with its marker
pub fn format_notice(notice: &Notice, width: usize) -> String {
    let marker = match notice.level {
        NoticeLevel::Success => "\u{2713}", // ✓
        NoticeLevel::Error => "\u{2717}",   // ✗
        NoticeLevel::Info => "\u{2022}",    // •
    };
    wrap_prefixed(&format!("{} ", marker), &notice.text, width)
}

/// Wrap `text` to `width`, indenting continuation lines under the prefix
pub fn wrap_prefixed(prefix: &str, text: &str, width: usize) -> String {
    let indent = " ".repeat(prefix.chars().count());
    let options = textwrap::Options::new(width.max(20))
        .initial_indent(prefix)
        .subsequent_indent(&indent);
    textwrap::fill(text, options)
}

/// Wrap plain text to `width`
pub fn wrap(text: &str, width: usize) -> String {
    textwrap::fill(text, width.max(20))
}

/// A horizontal rule the width of the output
pub fn rule(width: usize) -> String {
    "\u{2500}".repeat(width.max(20)) // ─
}
