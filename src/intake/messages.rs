use crate::diagnosis::scoring::{Confidence, ConditionMatch};

use super::types::{FeedbackKind, UserProfile};

/// Bot-side wording used by the intake engine.
pub struct MessageTemplates;

pub const FEEDBACK_OPTIONS: &[&str] = &["👍 Helpful", "👎 Not Helpful"];
pub const RESTART_OPTIONS: &[&str] = &["Yes, Start Over", "No, I'm Done"];

/// Emergency notice, emitted right after the banner.
pub const EMERGENCY_ALERT: [&str; 2] = [
    "⚠️ **EMERGENCY ALERT:** Your symptoms could indicate a serious medical condition. Please seek immediate medical care.",
    "🚨 Please call 911 or go to the nearest emergency room immediately.",
];

impl MessageTemplates {
    /// Opening message; replaces the text of question 0.
    pub fn welcome(profile: Option<&UserProfile>) -> String {
        let mut text = String::from(
            "Hello! I'm your health intake assistant. What symptoms are you experiencing today?",
        );
        if let Some(profile) = profile {
            if let Some(bmi) = profile.bmi() {
                text.push_str(&format!(
                    "\n\nI can see your profile information: Height {} inches, Weight {} lbs (BMI: {:.1})",
                    profile.height_in, profile.weight_lbs, bmi,
                ));
            }
        }
        text
    }

    pub fn vitals_declined() -> &'static str {
        "No problem! Let's continue without vital signs."
    }

    pub fn vitals_skipped() -> &'static str {
        "That's perfectly fine! We can proceed without vital signs. Let's continue with the assessment."
    }

    pub fn critical_vitals(warnings: &[String]) -> String {
        format!(
            "⚠️ **CRITICAL VITAL SIGNS DETECTED:**\n{}\n\nPlease seek emergency medical care immediately!",
            bullet_list(warnings),
        )
    }

    pub fn mood_support() -> &'static str {
        "Thank you for sharing that. It's important to talk about mental health. \
         We'll include some resources in your assessment summary."
    }

    pub fn diagnosis(top: Option<&ConditionMatch>) -> String {
        match top {
            Some(top) => format!(
                "Based on your symptoms, the most likely condition is **{}** ({}% match).\n\n{}",
                top.condition, top.match_percentage, top.description,
            ),
            None => "Based on your symptoms, I couldn't identify a specific condition. \
                     Please consult a healthcare provider for a proper evaluation."
                .to_string(),
        }
    }

    /// Next steps keyed on the top match's confidence.
    pub fn recommendations(top: Option<&ConditionMatch>) -> String {
        let first = match top.map(|t| t.confidence) {
            Some(Confidence::High) => "Schedule a doctor appointment within 24-48 hours",
            Some(Confidence::Medium) => {
                "Monitor symptoms and see a doctor if they persist for more than 3-5 days"
            }
            Some(Confidence::Low) | None => {
                "Consider consulting a healthcare provider for a thorough evaluation"
            }
        };
        let lines = [first, "Rest and stay hydrated", "Monitor your symptoms"];
        format!("**Recommended Actions:**\n{}", bullet_list(&lines))
    }

    /// `None` when there is nothing to warn about.
    pub fn warnings(warnings: &[String]) -> Option<String> {
        if warnings.is_empty() {
            return None;
        }
        Some(format!("**⚠️ Important Warnings:**\n{}", bullet_list(warnings)))
    }

    pub fn disclaimer() -> &'static str {
        "**Important:** These are estimates based on your symptoms. \
         Please consult a healthcare provider for a confirmed diagnosis."
    }

    pub fn feedback_prompt() -> &'static str {
        "How helpful was this assessment?"
    }

    pub fn feedback_thanks(kind: FeedbackKind) -> &'static str {
        match kind {
            FeedbackKind::Positive => "Thanks for your feedback!",
            FeedbackKind::Negative => "We're sorry. We'll keep improving.",
        }
    }

    pub fn restart_prompt() -> &'static str {
        "Would you like to start a new assessment?"
    }

    pub fn farewell() -> &'static str {
        "Take care! You can start a new assessment at any time."
    }
}

fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("• {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_match(confidence: Confidence) -> ConditionMatch {
        ConditionMatch {
            condition: "Influenza".into(),
            match_percentage: 42,
            confidence,
            description: "Viral infection affecting the respiratory system".into(),
            safe_medications: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn welcome_without_profile() {
        let text = MessageTemplates::welcome(None);
        assert!(text.starts_with("Hello!"));
        assert!(!text.contains("BMI"));
    }

    #[test]
    fn welcome_with_profile_includes_bmi() {
        let profile = UserProfile { height_in: 70.0, weight_lbs: 154.0 };
        let text = MessageTemplates::welcome(Some(&profile));
        assert!(text.contains("Height 70 inches, Weight 154 lbs (BMI: 22.1)"));
    }

    #[test]
    fn diagnosis_names_top_match() {
        let text = MessageTemplates::diagnosis(Some(&make_match(Confidence::Low)));
        assert!(text.contains("**Influenza** (42% match)"));
        assert!(MessageTemplates::diagnosis(None).contains("couldn't identify"));
    }

    #[test]
    fn recommendations_follow_confidence() {
        let high = MessageTemplates::recommendations(Some(&make_match(Confidence::High)));
        assert!(high.contains("within 24-48 hours"));
        let medium = MessageTemplates::recommendations(Some(&make_match(Confidence::Medium)));
        assert!(medium.contains("3-5 days"));
        let none = MessageTemplates::recommendations(None);
        assert!(none.contains("thorough evaluation"));
        assert_eq!(none.lines().count(), 4);
    }

    #[test]
    fn warnings_block_is_optional() {
        assert!(MessageTemplates::warnings(&[]).is_none());
        let block = MessageTemplates::warnings(&["See doctor".to_string()]).unwrap();
        assert_eq!(block, "**⚠️ Important Warnings:**\n• See doctor");
    }

    #[test]
    fn critical_vitals_lists_each_warning() {
        let text = MessageTemplates::critical_vitals(&[
            "High fever (>103°F) - Seek immediate medical care".to_string(),
            "Abnormal heart rate - Seek medical attention".to_string(),
        ]);
        assert!(text.contains("• High fever"));
        assert!(text.contains("• Abnormal heart rate"));
    }
}
