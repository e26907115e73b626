use serde::{Deserialize, Serialize};

use crate::intake::types::Answers;

use super::reference::DiseaseProfile;

/// Percentage ceiling; a keyword count never claims certainty.
const MAX_PERCENTAGE: f64 = 95.0;
const TEMPERATURE_BONUS: f64 = 0.5;
const HIGH_THRESHOLD: u8 = 70;
const MEDIUM_THRESHOLD: u8 = 50;
pub const MAX_SAFE_MEDICATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage > HIGH_THRESHOLD {
            Self::High
        } else if percentage > MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// One scored condition, with medications already filtered for allergies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionMatch {
    pub condition: String,
    pub match_percentage: u8,
    pub confidence: Confidence,
    pub description: String,
    pub safe_medications: Vec<String>,
    pub warnings: Vec<String>,
}

/// Raw keyword score: substring hits plus the temperature bonus.
pub fn match_score(profile: &DiseaseProfile, answer_text: &str, temperature: Option<f64>) -> f64 {
    let hits = profile
        .symptoms
        .iter()
        .filter(|symptom| answer_text.contains(&symptom.to_lowercase()))
        .count() as f64;

    let bonus = match (temperature, profile.temperature) {
        (Some(t), Some(range)) if range.contains(t) => TEMPERATURE_BONUS,
        _ => 0.0,
    };

    hits + bonus
}

pub fn match_percentage(score: f64, keyword_count: usize) -> u8 {
    if keyword_count == 0 {
        return 0;
    }
    let raw = (score / keyword_count as f64) * 100.0;
    raw.min(MAX_PERCENTAGE).round() as u8
}

/// Score every condition in `table` and rank by percentage, highest first.
/// Equal percentages keep table order.
pub fn score_conditions(table: &[DiseaseProfile], answers: &Answers) -> Vec<ConditionMatch> {
    let text = answers.combined_text();
    let temperature = answers.temperature();
    let allergies = answers.allergies();

    let mut matches: Vec<ConditionMatch> = table
        .iter()
        .map(|profile| {
            let score = match_score(profile, &text, temperature);
            let percentage = match_percentage(score, profile.symptoms.len());
            tracing::debug!(condition = profile.name, score, percentage, "Condition scored");

            ConditionMatch {
                condition: profile.name.to_string(),
                match_percentage: percentage,
                confidence: Confidence::from_percentage(percentage),
                description: profile.description.to_string(),
                safe_medications: filter_medications_by_allergies(profile.medications, &allergies)
                    .into_iter()
                    .take(MAX_SAFE_MEDICATIONS)
                    .collect(),
                warnings: profile.warnings.iter().map(|w| w.to_string()).collect(),
            }
        })
        .collect();

    // `sort_by` is stable.
    matches.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
    matches
}

/// Drop every medication whose name contains one of the allergens
/// (case-insensitive).
pub fn filter_medications_by_allergies<M, A>(medications: &[M], allergies: &[A]) -> Vec<String>
where
    M: AsRef<str>,
    A: AsRef<str>,
{
    let allergens: Vec<String> = allergies
        .iter()
        .map(|a| a.as_ref().trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();

    medications
        .iter()
        .map(|med| med.as_ref())
        .filter(|med| {
            let lower = med.to_lowercase();
            !allergens.iter().any(|allergen| lower.contains(allergen.as_str()))
        })
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::reference::{TemperatureRange, DISEASE_TABLE};
    use crate::intake::types::{QuestionIndex, VitalSigns};

    fn answers_with(text: &str) -> Answers {
        let mut answers = Answers::default();
        answers.record(QuestionIndex::new(0).unwrap(), text);
        answers
    }

    fn find<'a>(matches: &'a [ConditionMatch], name: &str) -> &'a ConditionMatch {
        matches.iter().find(|m| m.condition == name).unwrap()
    }

    #[test]
    fn confidence_thresholds_are_exclusive() {
        assert_eq!(Confidence::from_percentage(71), Confidence::High);
        assert_eq!(Confidence::from_percentage(70), Confidence::Medium);
        assert_eq!(Confidence::from_percentage(51), Confidence::Medium);
        assert_eq!(Confidence::from_percentage(50), Confidence::Low);
        assert_eq!(Confidence::from_percentage(0), Confidence::Low);
    }

    #[test]
    fn percentage_capped_and_rounded() {
        assert_eq!(match_percentage(5.5, 5), 95);
        assert_eq!(match_percentage(2.0, 6), 33);
        assert_eq!(match_percentage(2.5, 6), 42);
        assert_eq!(match_percentage(1.0, 0), 0);
    }

    #[test]
    fn fever_and_cough_with_high_temperature() {
        let mut answers = answers_with("fever and cough");
        answers.record_vital_signs(VitalSigns {
            temperature: Some(104.0),
            ..VitalSigns::default()
        });

        let influenza = &DISEASE_TABLE[1];
        let score = match_score(influenza, &answers.combined_text(), answers.temperature());
        assert!((score - 2.5).abs() < f64::EPSILON);

        let matches = score_conditions(&DISEASE_TABLE, &answers);
        assert_eq!(find(&matches, "Influenza").match_percentage, 42);
        // 104 is outside Acute Bronchitis' 99-101 band: cough only.
        assert_eq!(find(&matches, "Acute Bronchitis").match_percentage, 20);
        assert_eq!(matches[0].condition, "Influenza");
    }

    #[test]
    fn scoring_is_deterministic() {
        let answers = answers_with("cough, fatigue and a sore throat");
        let first = score_conditions(&DISEASE_TABLE, &answers);
        let second = score_conditions(&DISEASE_TABLE, &answers);
        assert_eq!(first, second);
    }

    #[test]
    fn ties_keep_declaration_order() {
        static TABLE: [DiseaseProfile; 3] = [
            DiseaseProfile {
                name: "Alpha",
                symptoms: &["rash", "itch"],
                temperature: None,
                description: "",
                medications: &[],
                warnings: &[],
            },
            DiseaseProfile {
                name: "Beta",
                symptoms: &["zzz"],
                temperature: None,
                description: "",
                medications: &[],
                warnings: &[],
            },
            DiseaseProfile {
                name: "Gamma",
                symptoms: &["rash", "swelling"],
                temperature: Some(TemperatureRange { min: 0.0, max: 1.0 }),
                description: "",
                medications: &[],
                warnings: &[],
            },
        ];

        let matches = score_conditions(&TABLE, &answers_with("a rash"));
        let order: Vec<_> = matches.iter().map(|m| m.condition.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "Gamma", "Beta"]);
        assert_eq!(matches[0].match_percentage, 50);
        assert_eq!(matches[1].match_percentage, 50);
    }

    #[test]
    fn no_answers_scores_zero_everywhere() {
        let matches = score_conditions(&DISEASE_TABLE, &Answers::default());
        assert!(matches.iter().all(|m| m.match_percentage == 0));
        let order: Vec<_> = matches.iter().map(|m| m.condition.as_str()).collect();
        assert_eq!(order, vec!["Acute Bronchitis", "Influenza", "Common Cold"]);
    }

    #[test]
    fn allergy_filter_excludes_substring_matches() {
        let meds = ["Acetaminophen (Tylenol)", "Ibuprofen (Advil)", "Zinc Supplements"];
        let filtered = filter_medications_by_allergies(&meds, &["Ibuprofen"]);
        assert_eq!(filtered, vec!["Acetaminophen (Tylenol)", "Zinc Supplements"]);
    }

    #[test]
    fn allergy_filter_is_idempotent_and_shrinking() {
        let meds = DISEASE_TABLE[1].medications;
        let allergies = ["advil", "ZINC"];
        let once = filter_medications_by_allergies(meds, &allergies);
        let twice = filter_medications_by_allergies(&once, &allergies);
        assert!(once.len() <= meds.len());
        assert_eq!(once, twice);
    }

    #[test]
    fn allergy_filter_without_allergies_keeps_everything() {
        let meds = DISEASE_TABLE[0].medications;
        let none: [&str; 0] = [];
        assert_eq!(filter_medications_by_allergies(meds, &none).len(), meds.len());
    }

    #[test]
    fn not_applicable_allergy_keeps_all_medications() {
        let mut answers = answers_with("fever");
        answers.record(QuestionIndex::new(4).unwrap(), "N/A");
        let matches = score_conditions(&DISEASE_TABLE, &answers);
        for profile in &DISEASE_TABLE {
            let m = find(&matches, profile.name);
            assert_eq!(m.safe_medications, profile.medications.to_vec());
        }
    }

    #[test]
    fn declared_allergy_applied_to_matches() {
        let mut answers = answers_with("fever");
        answers.record(QuestionIndex::new(4).unwrap(), "Ibuprofen");
        let matches = score_conditions(&DISEASE_TABLE, &answers);
        for m in &matches {
            assert!(m.safe_medications.iter().all(|med| !med.contains("Ibuprofen")));
            assert!(m.safe_medications.len() <= MAX_SAFE_MEDICATIONS);
        }
    }
}
