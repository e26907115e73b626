//! Fixed questionnaire: ten main questions and their quick-reply options.

use super::types::QuestionIndex;

pub const QUESTION_COUNT: usize = 10;

// Catalog positions with dedicated side logic in the engine.
pub const SYMPTOMS: QuestionIndex = QuestionIndex::at(0);
pub const ALLERGIES: QuestionIndex = QuestionIndex::at(4);
pub const VITAL_SIGNS: QuestionIndex = QuestionIndex::at(5);
pub const FAMILY_HISTORY: QuestionIndex = QuestionIndex::at(6);
pub const MOOD: QuestionIndex = QuestionIndex::at(7);
pub const SLEEP_APPETITE_ENERGY: QuestionIndex = QuestionIndex::at(9);

/// One catalog entry.
#[derive(Debug)]
pub struct CatalogQuestion {
    pub text: &'static str,
    pub quick_options: &'static [&'static str],
}

static QUESTIONS: [CatalogQuestion; QUESTION_COUNT] = [
    CatalogQuestion {
        text: "What symptoms are you experiencing? (e.g., fever, cough, headache, fatigue, stomach pain, chest pain)",
        quick_options: &["Fever", "Cough", "Headache", "Fatigue", "Stomach Pain", "Chest Pain"],
    },
    CatalogQuestion {
        text: "How long have you had these symptoms? (hours/days/weeks)",
        quick_options: &["Few hours", "1-2 days", "3-7 days", "Over a week", "Not sure"],
    },
    CatalogQuestion {
        text: "Do you have any known medical conditions?",
        quick_options: &["None", "Diabetes", "Heart Disease", "Asthma", "Other"],
    },
    CatalogQuestion {
        text: "Are you currently taking any medication?",
        quick_options: &["None", "Pain relievers", "Prescription meds", "Supplements", "Other"],
    },
    CatalogQuestion {
        text: "Do you have any known allergies to medications or substances? (e.g., Penicillin, Ibuprofen, Aspirin, Sulfa drugs)",
        quick_options: &["None", "Penicillin", "Ibuprofen", "Aspirin", "Other"],
    },
    CatalogQuestion {
        text: "Can you provide any vital signs? (pulse, blood pressure, temperature, blood glucose)",
        quick_options: &["Don't have", "Normal range", "Elevated", "Low", "Not sure"],
    },
    CatalogQuestion {
        text: "Do you or your immediate family have a history of any of the following?",
        quick_options: &["None", "Heart disease", "Diabetes", "Cancer", "Other"],
    },
    CatalogQuestion {
        text: "Have you been feeling unusually sad, hopeless, or disinterested in activities?",
        quick_options: &["No", "Sometimes", "Often", "Very often"],
    },
    CatalogQuestion {
        text: "What is your vaccination status? (COVID, flu, etc.)",
        quick_options: &["Up to date", "Need COVID", "Need flu", "Need other", "Not sure"],
    },
    CatalogQuestion {
        text: "How has your sleep, appetite, and energy level been?",
        quick_options: &["Good", "Fair", "Poor", "Very poor"],
    },
];

/// Checkbox values offered by the family-history form.
pub const FAMILY_HISTORY_CONDITIONS: &[&str] = &[
    "heart disease",
    "diabetes",
    "cancer",
    "hypertension",
    "asthma",
    "none",
];

pub fn question(index: QuestionIndex) -> &'static CatalogQuestion {
    &QUESTIONS[index.get()]
}

pub fn questions() -> &'static [CatalogQuestion] {
    &QUESTIONS
}

/// A vital-signs answer that declines the form ("Don't have", "Not sure").
pub fn declines_vital_signs(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    lower.contains("don't") || lower.contains("not")
}

/// A mood answer that deserves a supportive acknowledgment.
pub fn reports_low_mood(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    ["yes", "often", "very"].iter().any(|w| lower.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_question_has_text_and_options() {
        assert_eq!(questions().len(), QUESTION_COUNT);
        for entry in questions() {
            assert!(!entry.text.is_empty());
            assert!(!entry.quick_options.is_empty());
        }
    }

    #[test]
    fn named_positions_point_at_expected_questions() {
        assert!(question(SYMPTOMS).text.contains("symptoms"));
        assert!(question(ALLERGIES).text.contains("allergies"));
        assert!(question(VITAL_SIGNS).text.contains("vital signs"));
        assert!(question(FAMILY_HISTORY).text.contains("family"));
        assert!(question(MOOD).text.contains("sad"));
        assert!(question(SLEEP_APPETITE_ENERGY).text.contains("sleep"));
    }

    #[test]
    fn vital_sign_refusals() {
        assert!(declines_vital_signs("Don't have"));
        assert!(declines_vital_signs("NOT SURE"));
        assert!(!declines_vital_signs("Elevated"));
        assert!(!declines_vital_signs("Normal range"));
    }

    #[test]
    fn low_mood_keywords() {
        assert!(reports_low_mood("Very often"));
        assert!(reports_low_mood("yes, lately"));
        assert!(!reports_low_mood("Sometimes"));
        assert!(!reports_low_mood("No"));
    }
}
