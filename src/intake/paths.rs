//! Symptom paths and their one-level condition follow-ups.
//!
//! Both tables are ordered and evaluated first-match-wins: an earlier,
//! coarser keyword always beats a later, more specific one. A condition
//! follow-up carries no next-path table of its own, so the deepest chain is
//! path → condition.

use serde::{Deserialize, Serialize};

/// Symptom-specific sub-flow selected from the first answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomPath {
    Fever,
    Cough,
    Headache,
    ChestPain,
}

/// Second-level target reached from a path's follow-up answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinedPath {
    HighFever,
    ModerateFever,
    ProductiveCough,
    DryCough,
    Migraine,
    TensionHeadache,
    Pleurisy,
    Musculoskeletal,
}

/// When showing or answering a condition follow-up raises the emergency flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyRule {
    Never,
    /// Fires as soon as the follow-up question is shown.
    Always,
    /// Fires when the answer to the follow-up equals this option.
    AnswerIs(&'static str),
}

impl EmergencyRule {
    pub fn fires_when_shown(self) -> bool {
        matches!(self, Self::Always)
    }

    pub fn fires_on_answer(self, answer: &str) -> bool {
        match self {
            Self::AnswerIs(expected) => answer.trim().eq_ignore_ascii_case(expected),
            Self::Never | Self::Always => false,
        }
    }
}

#[derive(Debug)]
pub struct PathEntry {
    pub path: SymptomPath,
    /// Case-insensitive substrings of the first answer that select this path.
    pub keywords: &'static [&'static str],
    pub follow_up: &'static str,
    pub options: &'static [&'static str],
    /// `(substring, target)` pairs, scanned in order against the follow-up answer.
    pub next_paths: &'static [(&'static str, RefinedPath)],
    /// Path whose sub-flow can end in an emergency notice.
    pub emergency: bool,
}

#[derive(Debug)]
pub struct ConditionFollowUp {
    pub target: RefinedPath,
    pub question: &'static str,
    pub options: &'static [&'static str],
    pub emergency: EmergencyRule,
}

// Order matches `SymptomPath` discriminants; see `SymptomPath::entry`.
static PATH_TABLE: [PathEntry; 4] = [
    PathEntry {
        path: SymptomPath::Fever,
        keywords: &["fever"],
        follow_up: "How high is your temperature?",
        options: &["Below 100°F", "100-102°F", "Above 102°F", "Don't know"],
        next_paths: &[
            ("above 102", RefinedPath::HighFever),
            ("100-102", RefinedPath::ModerateFever),
        ],
        emergency: false,
    },
    PathEntry {
        path: SymptomPath::Cough,
        keywords: &["cough"],
        follow_up: "Is the cough dry or productive (bringing up mucus)?",
        options: &["Dry cough", "Productive cough", "Both", "Not sure"],
        next_paths: &[
            ("productive", RefinedPath::ProductiveCough),
            ("dry", RefinedPath::DryCough),
        ],
        emergency: false,
    },
    PathEntry {
        path: SymptomPath::Headache,
        keywords: &["headache"],
        follow_up: "Where is the pain located?",
        options: &["Front of head", "Back of head", "One side", "All over", "Not sure"],
        next_paths: &[
            ("one side", RefinedPath::Migraine),
            ("all over", RefinedPath::TensionHeadache),
        ],
        emergency: false,
    },
    PathEntry {
        path: SymptomPath::ChestPain,
        keywords: &["chest pain", "chest_pain"],
        follow_up: "Does the pain worsen when breathing deeply?",
        options: &["Yes", "No", "Sometimes", "Not sure"],
        next_paths: &[
            ("yes", RefinedPath::Pleurisy),
            ("no", RefinedPath::Musculoskeletal),
        ],
        emergency: true,
    },
];

static CONDITION_FOLLOW_UPS: [ConditionFollowUp; 3] = [
    ConditionFollowUp {
        target: RefinedPath::HighFever,
        question: "A high fever requires attention. Do you also have chills or body aches?",
        options: &["Yes", "No", "Not sure"],
        emergency: EmergencyRule::Always,
    },
    ConditionFollowUp {
        target: RefinedPath::ProductiveCough,
        question: "A productive cough with mucus. What color is the mucus?",
        options: &["Clear/White", "Yellow", "Green", "Blood-tinged", "Not sure"],
        emergency: EmergencyRule::AnswerIs("Blood-tinged"),
    },
    ConditionFollowUp {
        target: RefinedPath::Pleurisy,
        question: "⚠️ Chest pain that worsens with breathing could indicate a serious condition. Do you also have shortness of breath?",
        options: &["Yes", "No", "Not sure"],
        emergency: EmergencyRule::Always,
    },
];

impl SymptomPath {
    pub fn entry(self) -> &'static PathEntry {
        &PATH_TABLE[self as usize]
    }

    /// First next-path key contained in the follow-up answer.
    pub fn refine(self, answer: &str) -> Option<RefinedPath> {
        let lower = answer.to_lowercase();
        self.entry()
            .next_paths
            .iter()
            .find(|(key, _)| lower.contains(key))
            .map(|(_, target)| *target)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fever => "fever",
            Self::Cough => "cough",
            Self::Headache => "headache",
            Self::ChestPain => "chest_pain",
        }
    }
}

impl RefinedPath {
    pub fn follow_up(self) -> Option<&'static ConditionFollowUp> {
        CONDITION_FOLLOW_UPS.iter().find(|f| f.target == self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighFever => "high_fever",
            Self::ModerateFever => "moderate_fever",
            Self::ProductiveCough => "productive_cough",
            Self::DryCough => "dry_cough",
            Self::Migraine => "migraine",
            Self::TensionHeadache => "tension_headache",
            Self::Pleurisy => "pleurisy",
            Self::Musculoskeletal => "musculoskeletal",
        }
    }
}

pub fn path_table() -> &'static [PathEntry] {
    &PATH_TABLE
}

/// First path (in table order) whose keyword appears in the answer.
pub fn detect_path(answer: &str) -> Option<SymptomPath> {
    let lower = answer.to_lowercase();
    PATH_TABLE
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| lower.contains(k)))
        .map(|entry| entry.path)
}
