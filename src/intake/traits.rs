use serde::{Deserialize, Serialize};

use super::types::FormKind;

/// Presentation seam. The engine calls it whenever a transition produces
/// visible output; delays and layout belong to the implementation.
pub trait Renderer {
    fn emit_bot_message(&mut self, text: &str, options: &[&str]);

    fn emit_user_message(&mut self, text: &str);

    fn emit_emergency_banner(&mut self);

    fn show_form(&mut self, kind: FormKind);
}

/// One call made against a [`Renderer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderEvent {
    Bot { text: String, options: Vec<String> },
    User { text: String },
    EmergencyBanner,
    Form { kind: FormKind },
}

/// Renderer that records every event, for front-ends that replay output
/// on their own schedule.
#[derive(Debug, Default)]
pub struct Transcript {
    pub events: Vec<RenderEvent>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bot_messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Bot { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_bot(&self) -> Option<&RenderEvent> {
        self.events
            .iter()
            .rev()
            .find(|e| matches!(e, RenderEvent::Bot { .. }))
    }

    /// Drain recorded events.
    pub fn take(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Renderer for Transcript {
    fn emit_bot_message(&mut self, text: &str, options: &[&str]) {
        self.events.push(RenderEvent::Bot {
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        });
    }

    fn emit_user_message(&mut self, text: &str) {
        self.events.push(RenderEvent::User {
            text: text.to_string(),
        });
    }

    fn emit_emergency_banner(&mut self) {
        self.events.push(RenderEvent::EmergencyBanner);
    }

    fn show_form(&mut self, kind: FormKind) {
        self.events.push(RenderEvent::Form { kind });
    }
}
