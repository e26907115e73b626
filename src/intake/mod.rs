//! Conversation engine for the scripted symptom intake.
//!
//! Static tables (`catalog`, `paths`) describe what can be asked; `engine`
//! owns one session's state and decides what is asked next. Output leaves
//! through the `traits::Renderer` seam.

pub mod catalog;
pub mod engine;
pub mod messages;
pub mod paths;
pub mod presentation;
pub mod traits;
pub mod types;

pub use engine::IntakeEngine;
pub use traits::{RenderEvent, Renderer, Transcript};
pub use types::{Answers, FormKind, InputOutcome, IntakeState, QuestionIndex, VitalSigns};
