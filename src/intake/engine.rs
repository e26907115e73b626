use chrono::Utc;
use uuid::Uuid;

use crate::archive::SessionArchive;
use crate::diagnosis::reference::DISEASE_TABLE;
use crate::diagnosis::scoring::{score_conditions, ConditionMatch};
use crate::diagnosis::summary::{aggregate_warnings, build_summary, SessionSummary};
use crate::diagnosis::vitals::check_critical_vital_signs;

use super::catalog::{
    self, declines_vital_signs, reports_low_mood, FAMILY_HISTORY, MOOD, QUESTION_COUNT,
    SYMPTOMS, VITAL_SIGNS,
};
use super::messages::{MessageTemplates, EMERGENCY_ALERT, FEEDBACK_OPTIONS, RESTART_OPTIONS};
use super::paths::{detect_path, RefinedPath, SymptomPath};
use super::traits::Renderer;
use super::types::{
    Answers, FeedbackKind, FeedbackRecord, FormKind, InputOutcome, IntakeState, QuestionIndex,
    QuestionLifecycle, VitalSigns,
};

/// State of one conversation. Created by `reset`, owned by one engine.
#[derive(Debug, Clone)]
struct Session {
    id: Uuid,
    state: IntakeState,
    /// Main question the conversation is anchored on; follow-ups and forms
    /// rejoin the sequence after it.
    cursor: QuestionIndex,
    lifecycles: [QuestionLifecycle; QUESTION_COUNT],
    answers: Answers,
    emergency: bool,
    last_bot_message: Option<String>,
    diagnosis: Vec<ConditionMatch>,
    summary: Option<SessionSummary>,
    feedback_given: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: IntakeState::AwaitingMainAnswer(SYMPTOMS),
            cursor: SYMPTOMS,
            lifecycles: [QuestionLifecycle::Unasked; QUESTION_COUNT],
            answers: Answers::default(),
            emergency: false,
            last_bot_message: None,
            diagnosis: Vec::new(),
            summary: None,
            feedback_given: false,
        }
    }

    fn lifecycle(&self, index: QuestionIndex) -> QuestionLifecycle {
        self.lifecycles[index.get()]
    }

    fn set_lifecycle(&mut self, index: QuestionIndex, lifecycle: QuestionLifecycle) {
        self.lifecycles[index.get()] = lifecycle;
    }
}

/// Quick replies understood once the assessment is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClosingReply {
    StartOver,
    Feedback(FeedbackKind),
    Done,
}

impl ClosingReply {
    fn parse(answer: &str) -> Option<Self> {
        // Quick options carry a leading emoji ("👍 Helpful").
        let lower = answer
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .trim()
            .to_lowercase();

        if lower.contains("start over") {
            Some(Self::StartOver)
        } else if lower.contains("helpful") {
            Self::parse_rating(&lower).map(Self::Feedback)
        } else if lower.contains("done") {
            Some(Self::Done)
        } else {
            None
        }
    }

    /// Only a bare "helpful" is positive; any negated form is negative.
    fn parse_rating(lower: &str) -> Option<FeedbackKind> {
        const NEGATIONS: [&str; 4] = ["not ", "unhelpful", "n't", "no "];

        if NEGATIONS.iter().any(|n| lower.contains(n)) {
            Some(FeedbackKind::Negative)
        } else if lower == "helpful" {
            Some(FeedbackKind::Positive)
        } else {
            None
        }
    }
}

/// The intake state machine.
///
/// Every input is processed to completion, including any cascade of
/// transitions and rendered output, before the call returns.
pub struct IntakeEngine<R, A> {
    renderer: R,
    archive: A,
    session: Session,
}

impl<R: Renderer, A: SessionArchive> IntakeEngine<R, A> {
    /// Engine in its initial state; call [`start`](Self::start) to greet.
    pub fn new(renderer: R, archive: A) -> Self {
        Self {
            renderer,
            archive,
            session: Session::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────

    /// Reset the session and emit the welcome with question 0's options.
    pub fn start(&mut self) {
        self.reset();

        let profile = match self.archive.load_user_profile() {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load user profile, continuing without it");
                None
            }
        };

        self.session.set_lifecycle(SYMPTOMS, QuestionLifecycle::Asked);
        let welcome = MessageTemplates::welcome(profile.as_ref());
        self.bot(&welcome, catalog::question(SYMPTOMS).quick_options);

        tracing::info!(
            session_id = %self.session.id,
            has_profile = profile.is_some(),
            "Intake session started"
        );
    }

    /// Discard all session state without emitting anything.
    pub fn reset(&mut self) {
        self.session = Session::new();
    }

    pub fn restart(&mut self) {
        tracing::debug!(session_id = %self.session.id, "Restarting intake");
        self.start();
    }

    // ── Inputs ────────────────────────────────────────

    /// Free-text reply (typed, spoken, or a quick option).
    pub fn submit_answer(&mut self, text: &str) -> InputOutcome {
        let answer = text.trim();
        if answer.is_empty() {
            return InputOutcome::Ignored;
        }

        match self.session.state {
            IntakeState::AwaitingVitalSignsForm | IntakeState::AwaitingFamilyHistoryForm => {
                tracing::debug!(state = ?self.session.state, "Free text ignored while a form is open");
                InputOutcome::Ignored
            }
            IntakeState::Complete => self.handle_closing_reply(answer),
            IntakeState::AwaitingPathFollowUp(path) => {
                self.renderer.emit_user_message(answer);
                self.handle_path_follow_up(path, answer);
                InputOutcome::Accepted
            }
            IntakeState::AwaitingConditionFollowUp(target) => {
                self.renderer.emit_user_message(answer);
                self.handle_condition_follow_up(target, answer);
                InputOutcome::Accepted
            }
            IntakeState::AwaitingMainAnswer(index) => {
                self.renderer.emit_user_message(answer);
                self.handle_main_answer(index, answer);
                InputOutcome::Accepted
            }
        }
    }

    pub fn submit_vital_signs(&mut self, vitals: VitalSigns) -> InputOutcome {
        if self.session.state != IntakeState::AwaitingVitalSignsForm {
            return InputOutcome::Ignored;
        }

        let warnings = check_critical_vital_signs(&vitals);
        self.session.answers.record_vital_signs(vitals);

        if !warnings.is_empty() {
            tracing::warn!(
                session_id = %self.session.id,
                count = warnings.len(),
                "Critical vital signs reported"
            );
            self.bot(&MessageTemplates::critical_vitals(&warnings), &[]);
        }

        self.advance();
        InputOutcome::Accepted
    }

    /// Decline the open vital-signs form.
    pub fn skip(&mut self) -> InputOutcome {
        if self.session.state != IntakeState::AwaitingVitalSignsForm {
            return InputOutcome::Ignored;
        }

        self.bot(MessageTemplates::vitals_skipped(), &[]);
        self.advance();
        InputOutcome::Accepted
    }

    pub fn submit_family_history(&mut self, selections: Vec<String>) -> InputOutcome {
        if self.session.state != IntakeState::AwaitingFamilyHistoryForm {
            return InputOutcome::Ignored;
        }

        let selections: Vec<String> = selections
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.session.answers.record_family_history(selections);

        self.advance();
        InputOutcome::Accepted
    }

    /// Rate the finished assessment; accepted once per session.
    pub fn submit_feedback(&mut self, kind: FeedbackKind) -> InputOutcome {
        if !self.session.state.is_complete() || self.session.feedback_given {
            return InputOutcome::Ignored;
        }

        self.session.feedback_given = true;
        self.bot(MessageTemplates::feedback_thanks(kind), &[]);

        let record = FeedbackRecord {
            session_id: self.session.id,
            kind,
            recorded_at: Utc::now(),
        };
        if let Err(e) = self.archive.save_feedback(&record) {
            tracing::warn!(error = %e, "Failed to archive feedback");
        }
        InputOutcome::Accepted
    }

    // ── Transitions ───────────────────────────────────

    fn handle_main_answer(&mut self, index: QuestionIndex, answer: &str) {
        self.session.answers.record(index, answer);
        self.session.set_lifecycle(index, QuestionLifecycle::Answered);

        if index == SYMPTOMS {
            if let Some(path) = detect_path(answer) {
                self.open_path(path);
                return;
            }
        } else if index == VITAL_SIGNS {
            if declines_vital_signs(answer) {
                self.bot(MessageTemplates::vitals_declined(), &[]);
            } else {
                self.open_form(IntakeState::AwaitingVitalSignsForm, FormKind::VitalSigns);
                return;
            }
        } else if index == FAMILY_HISTORY {
            self.open_form(IntakeState::AwaitingFamilyHistoryForm, FormKind::FamilyHistory);
            return;
        } else if index == MOOD && reports_low_mood(answer) {
            self.bot(MessageTemplates::mood_support(), &[]);
        }

        self.advance();
    }

    fn open_path(&mut self, path: SymptomPath) {
        let entry = path.entry();
        tracing::debug!(
            path = path.as_str(),
            emergency_path = entry.emergency,
            "Conversation path detected"
        );
        self.session.state = IntakeState::AwaitingPathFollowUp(path);
        self.bot(entry.follow_up, entry.options);
    }

    fn open_form(&mut self, state: IntakeState, kind: FormKind) {
        self.session.state = state;
        self.renderer.show_form(kind);
    }

    fn handle_path_follow_up(&mut self, path: SymptomPath, answer: &str) {
        let follow_up = path
            .refine(answer)
            .and_then(|target| target.follow_up().map(|f| (target, f)));

        let Some((target, follow_up)) = follow_up else {
            tracing::debug!(path = path.as_str(), "No condition follow-up, rejoining main sequence");
            self.advance();
            return;
        };

        self.session.state = IntakeState::AwaitingConditionFollowUp(target);
        self.bot(follow_up.question, follow_up.options);

        if follow_up.emergency.fires_when_shown() {
            self.raise_emergency(target);
        }
    }

    fn handle_condition_follow_up(&mut self, target: RefinedPath, answer: &str) {
        let fires = target
            .follow_up()
            .is_some_and(|f| f.emergency.fires_on_answer(answer));
        if fires {
            self.raise_emergency(target);
        }
        self.advance();
    }

    fn handle_closing_reply(&mut self, answer: &str) -> InputOutcome {
        let Some(reply) = ClosingReply::parse(answer) else {
            return InputOutcome::Ignored;
        };
        if matches!(reply, ClosingReply::Feedback(_)) && self.session.feedback_given {
            return InputOutcome::Ignored;
        }

        self.renderer.emit_user_message(answer);
        match reply {
            ClosingReply::StartOver => {
                self.restart();
                InputOutcome::Accepted
            }
            ClosingReply::Feedback(kind) => self.submit_feedback(kind),
            ClosingReply::Done => {
                self.bot(MessageTemplates::farewell(), &[]);
                InputOutcome::Accepted
            }
        }
    }

    /// Move to the next question that has not been asked yet, or finish.
    fn advance(&mut self) {
        let mut next = self.session.cursor.next();
        while let Some(index) = next {
            if !self.session.lifecycle(index).was_asked() {
                break;
            }
            next = index.next();
        }

        match next {
            Some(index) => self.ask(index),
            None => self.complete(),
        }
    }

    fn ask(&mut self, index: QuestionIndex) {
        self.session.cursor = index;
        self.session.set_lifecycle(index, QuestionLifecycle::Asked);
        self.session.state = IntakeState::AwaitingMainAnswer(index);

        let question = catalog::question(index);
        self.bot(question.text, question.quick_options);
    }

    fn raise_emergency(&mut self, source: RefinedPath) {
        self.session.emergency = true;
        tracing::warn!(
            session_id = %self.session.id,
            source = source.as_str(),
            "Emergency flag raised"
        );

        self.renderer.emit_emergency_banner();
        for line in EMERGENCY_ALERT {
            self.bot(line, &[]);
        }
    }

    fn complete(&mut self) {
        self.session.state = IntakeState::Complete;

        let answers = &self.session.answers;
        let diagnosis = score_conditions(&DISEASE_TABLE, answers);
        let warnings = aggregate_warnings(&diagnosis, answers);
        let summary = build_summary(
            self.session.id,
            Utc::now(),
            answers,
            &diagnosis,
            self.session.emergency,
        );

        let top = diagnosis.first();
        self.bot(&MessageTemplates::diagnosis(top), &[]);
        if top.is_some() {
            self.bot(&MessageTemplates::recommendations(top), &[]);
        }
        if let Some(block) = MessageTemplates::warnings(&warnings) {
            self.bot(&block, &[]);
        }
        self.bot(MessageTemplates::disclaimer(), &[]);
        self.bot(MessageTemplates::feedback_prompt(), FEEDBACK_OPTIONS);
        self.bot(MessageTemplates::restart_prompt(), RESTART_OPTIONS);

        if let Err(e) = self.archive.save_session_summary(&summary) {
            tracing::warn!(error = %e, "Failed to archive session summary");
        }

        tracing::info!(
            session_id = %self.session.id,
            detected = %summary.detected_condition,
            emergency = self.session.emergency,
            "Intake session complete"
        );

        self.session.diagnosis = diagnosis;
        self.session.summary = Some(summary);
    }

    fn bot(&mut self, text: &str, options: &[&str]) {
        self.renderer.emit_bot_message(text, options);
        self.session.last_bot_message = Some(text.to_string());
    }

    // ── Accessors ─────────────────────────────────────

    pub fn session_id(&self) -> Uuid {
        self.session.id
    }

    pub fn state(&self) -> IntakeState {
        self.session.state
    }

    pub fn answers(&self) -> &Answers {
        &self.session.answers
    }

    /// Questions presented so far, in catalog order.
    pub fn asked_questions(&self) -> Vec<QuestionIndex> {
        (0..QUESTION_COUNT)
            .filter_map(QuestionIndex::new)
            .filter(|i| self.session.lifecycle(*i).was_asked())
            .collect()
    }

    pub fn lifecycle(&self, index: QuestionIndex) -> QuestionLifecycle {
        self.session.lifecycle(index)
    }

    pub fn is_answered(&self, index: QuestionIndex) -> bool {
        self.session.lifecycle(index) == QuestionLifecycle::Answered
    }

    pub fn emergency(&self) -> bool {
        self.session.emergency
    }

    pub fn is_vital_signs_step(&self) -> bool {
        self.session.state == IntakeState::AwaitingVitalSignsForm
    }

    pub fn pending_follow_up(&self) -> Option<FormKind> {
        self.session.state.pending_form()
    }

    /// Text of the most recent bot message, for duplicate suppression.
    pub fn last_bot_message(&self) -> Option<&str> {
        self.session.last_bot_message.as_deref()
    }

    /// Ranked matches; empty until the session completes.
    pub fn diagnosis(&self) -> &[ConditionMatch] {
        &self.session.diagnosis
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.session.summary.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn into_parts(self) -> (R, A) {
        (self.renderer, self.archive)
    }
}
