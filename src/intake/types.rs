use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{ALLERGIES, QUESTION_COUNT};
use super::paths::{RefinedPath, SymptomPath};

// ---------------------------------------------------------------------------
// QuestionIndex
// ---------------------------------------------------------------------------

/// Position in the fixed question catalog, always `< QUESTION_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionIndex(usize);

impl QuestionIndex {
    /// Unchecked constructor for catalog constants.
    pub(crate) const fn at(index: usize) -> Self {
        Self(index)
    }

    pub fn new(index: usize) -> Option<Self> {
        (index < QUESTION_COUNT).then_some(Self(index))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// The following catalog position, or `None` past the last question.
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }
}

impl fmt::Display for QuestionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// IntakeState
// ---------------------------------------------------------------------------

/// Where the conversation currently waits for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum IntakeState {
    AwaitingMainAnswer(QuestionIndex),
    AwaitingPathFollowUp(SymptomPath),
    AwaitingConditionFollowUp(RefinedPath),
    AwaitingVitalSignsForm,
    AwaitingFamilyHistoryForm,
    Complete,
}

impl IntakeState {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// The structured form that suspends the main sequence, if any.
    pub fn pending_form(&self) -> Option<FormKind> {
        match self {
            Self::AwaitingVitalSignsForm => Some(FormKind::VitalSigns),
            Self::AwaitingFamilyHistoryForm => Some(FormKind::FamilyHistory),
            _ => None,
        }
    }
}

/// Structured forms the renderer is asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    VitalSigns,
    FamilyHistory,
}

/// Lifecycle of a single catalog question within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionLifecycle {
    #[default]
    Unasked,
    Asked,
    Answered,
}

impl QuestionLifecycle {
    pub fn was_asked(self) -> bool {
        !matches!(self, Self::Unasked)
    }
}

/// Whether the engine acted on an input or dropped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted,
    Ignored,
}

// ---------------------------------------------------------------------------
// Structured answers
// ---------------------------------------------------------------------------

/// Vital-signs form. Blank fields stay `None` and never take part in checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    /// Degrees Fahrenheit.
    pub temperature: Option<f64>,
    pub systolic: Option<u32>,
    pub diastolic: Option<u32>,
    /// Beats per minute.
    pub pulse: Option<u32>,
    /// mg/dL.
    pub glucose: Option<u32>,
}

/// Words that answer the allergy question without naming an allergen.
const NON_ALLERGENS: &[&str] = &["none", "no", "n/a", "not sure", "other"];

fn is_non_allergen(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    NON_ALLERGENS.contains(&text.as_str())
}

/// Everything the user has told the engine during one session.
///
/// One answer per key: a second write to an occupied slot is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answers {
    pub questions: BTreeMap<QuestionIndex, String>,
    pub vital_signs: Option<VitalSigns>,
    pub family_history: Option<Vec<String>>,
}

impl Answers {
    /// Returns false when the question already holds an answer.
    pub fn record(&mut self, index: QuestionIndex, answer: &str) -> bool {
        if self.questions.contains_key(&index) {
            return false;
        }
        self.questions.insert(index, answer.to_string());
        true
    }

    pub fn get(&self, index: QuestionIndex) -> Option<&str> {
        self.questions.get(&index).map(String::as_str)
    }

    pub fn record_vital_signs(&mut self, vitals: VitalSigns) -> bool {
        if self.vital_signs.is_some() {
            return false;
        }
        self.vital_signs = Some(vitals);
        true
    }

    pub fn record_family_history(&mut self, selections: Vec<String>) -> bool {
        if self.family_history.is_some() {
            return false;
        }
        self.family_history = Some(selections);
        true
    }

    pub fn temperature(&self) -> Option<f64> {
        self.vital_signs.and_then(|v| v.temperature)
    }

    /// Lowercased free text of every answer: question answers in catalog
    /// order, then family-history selections.
    pub fn combined_text(&self) -> String {
        let mut parts: Vec<&str> = self.questions.values().map(String::as_str).collect();
        if let Some(history) = &self.family_history {
            parts.extend(history.iter().map(String::as_str));
        }
        parts.join(" ").to_lowercase()
    }

    /// Allergens named in the answer to the allergy question.
    pub fn allergies(&self) -> Vec<String> {
        let Some(answer) = self.get(ALLERGIES) else {
            return Vec::new();
        };
        // Whole-answer check first: "N/A" must not be split on '/'.
        if is_non_allergen(answer) {
            return Vec::new();
        }

        answer
            .to_lowercase()
            .replace(" and ", ",")
            .split([',', ';', '/'])
            .map(str::trim)
            .filter(|s| !s.is_empty() && !is_non_allergen(s))
            .map(str::to_string)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Profile & feedback
// ---------------------------------------------------------------------------

/// Optional stored profile used to personalise the welcome text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub height_in: f64,
    pub weight_lbs: f64,
}

impl UserProfile {
    /// Imperial BMI, `None` for a non-positive height.
    pub fn bmi(&self) -> Option<f64> {
        if self.height_in <= 0.0 || self.weight_lbs <= 0.0 {
            return None;
        }
        Some(self.weight_lbs * 703.0 / (self.height_in * self.height_in))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub session_id: Uuid,
    pub kind: FeedbackKind,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(index: usize) -> QuestionIndex {
        QuestionIndex::new(index).unwrap()
    }

    #[test]
    fn question_index_bounds() {
        assert!(QuestionIndex::new(9).is_some());
        assert!(QuestionIndex::new(QUESTION_COUNT).is_none());
        assert_eq!(q(8).next(), Some(q(9)));
        assert_eq!(q(9).next(), None);
    }

    #[test]
    fn answers_keep_first_write() {
        let mut answers = Answers::default();
        assert!(answers.record(q(1), "1-2 days"));
        assert!(!answers.record(q(1), "Over a week"));
        assert_eq!(answers.get(q(1)), Some("1-2 days"));
    }

    #[test]
    fn combined_text_includes_family_history() {
        let mut answers = Answers::default();
        answers.record(q(0), "Fever and Cough");
        answers.record(q(2), "Asthma");
        answers.record_family_history(vec!["diabetes".into()]);
        assert_eq!(answers.combined_text(), "fever and cough asthma diabetes");
    }

    #[test]
    fn allergies_split_and_drop_non_answers() {
        let mut answers = Answers::default();
        answers.record(ALLERGIES, "Ibuprofen, Penicillin and sulfa");
        assert_eq!(answers.allergies(), vec!["ibuprofen", "penicillin", "sulfa"]);

        let mut none = Answers::default();
        none.record(ALLERGIES, "None");
        assert!(none.allergies().is_empty());
    }

    #[test]
    fn not_applicable_names_no_allergen() {
        for answer in ["N/A", " n/a ", "Not sure"] {
            let mut answers = Answers::default();
            answers.record(ALLERGIES, answer);
            assert!(answers.allergies().is_empty(), "{answer}");
        }

        let mut mixed = Answers::default();
        mixed.record(ALLERGIES, "Aspirin / none");
        assert_eq!(mixed.allergies(), vec!["aspirin"]);
    }

    #[test]
    fn uppercase_and_separates_allergens() {
        let mut answers = Answers::default();
        answers.record(ALLERGIES, "Penicillin AND Sulfa");
        assert_eq!(answers.allergies(), vec!["penicillin", "sulfa"]);
    }

    #[test]
    fn bmi_from_profile() {
        let profile = UserProfile { height_in: 70.0, weight_lbs: 154.0 };
        let bmi = profile.bmi().unwrap();
        assert!((bmi - 22.094).abs() < 0.01);
        assert!(UserProfile { height_in: 0.0, weight_lbs: 150.0 }.bmi().is_none());
    }

    #[test]
    fn state_serializes_tagged() {
        let json = serde_json::to_string(&IntakeState::AwaitingMainAnswer(q(3))).unwrap();
        assert_eq!(json, r#"{"state":"awaiting_main_answer","at":3}"#);
        let json = serde_json::to_string(&IntakeState::Complete).unwrap();
        assert_eq!(json, r#"{"state":"complete"}"#);
    }

    #[test]
    fn pending_form_derived_from_state() {
        assert_eq!(
            IntakeState::AwaitingVitalSignsForm.pending_form(),
            Some(FormKind::VitalSigns)
        );
        assert_eq!(IntakeState::Complete.pending_form(), None);
    }
}
