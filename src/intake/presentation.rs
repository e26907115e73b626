//! Duplicate-message suppression for renderers.
//!
//! The engine exposes the last bot text it emitted but never filters its own
//! output; renderers that display messages run them through
//! [`MessageDeduper`] first.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Bot,
    User,
}

#[derive(Debug, Default)]
pub struct MessageDeduper {
    last: Option<(Sender, String)>,
    last_bot: Option<String>,
}

impl MessageDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the message repeats the immediately preceding
    /// message from the same sender, or (for the bot) the last bot question.
    pub fn admit(&mut self, sender: Sender, text: &str) -> bool {
        let text = text.trim();

        if let Some((last_sender, last_text)) = &self.last {
            if *last_sender == sender && last_text == text {
                return false;
            }
        }
        if sender == Sender::Bot && self.last_bot.as_deref() == Some(text) {
            return false;
        }

        if sender == Sender::Bot {
            self.last_bot = Some(text.to_string());
        }
        self.last = Some((sender, text.to_string()));
        true
    }

    pub fn clear(&mut self) {
        self.last = None;
        self.last_bot = None;
    }
}
