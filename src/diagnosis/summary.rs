use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intake::messages::MessageTemplates;
use crate::intake::types::Answers;

use super::scoring::{ConditionMatch, Confidence};
use super::vitals::check_critical_vital_signs;

/// Number of ranked conditions kept in the archive.
pub const TOP_CONDITIONS: usize = 3;

/// Fallback `detected_condition` when nothing was scored.
pub const GENERAL_CONDITION: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub name: String,
    pub percentage: u8,
    pub confidence: Confidence,
    pub safe_medications: Vec<String>,
}

/// Archival record written once per completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub date: DateTime<Utc>,
    pub answers: Answers,
    pub emergency: bool,
    pub detected_condition: String,
    pub top_conditions: Vec<ConditionSummary>,
    pub warnings: Vec<String>,
    pub general_recommendations: String,
}

/// Condition warnings in ranked order, then critical vital-sign advisories.
pub fn aggregate_warnings(matches: &[ConditionMatch], answers: &Answers) -> Vec<String> {
    let mut warnings: Vec<String> = matches
        .iter()
        .flat_map(|m| m.warnings.iter().cloned())
        .collect();

    if let Some(vitals) = &answers.vital_signs {
        warnings.extend(check_critical_vital_signs(vitals));
    }

    warnings
}

pub fn build_summary(
    session_id: Uuid,
    date: DateTime<Utc>,
    answers: &Answers,
    matches: &[ConditionMatch],
    emergency: bool,
) -> SessionSummary {
    let top = matches.first();

    SessionSummary {
        session_id,
        date,
        answers: answers.clone(),
        emergency,
        detected_condition: top
            .map(|m| m.condition.clone())
            .unwrap_or_else(|| GENERAL_CONDITION.to_string()),
        top_conditions: matches
            .iter()
            .take(TOP_CONDITIONS)
            .map(|m| ConditionSummary {
                name: m.condition.clone(),
                percentage: m.match_percentage,
                confidence: m.confidence,
                safe_medications: m.safe_medications.clone(),
            })
            .collect(),
        warnings: aggregate_warnings(matches, answers),
        general_recommendations: MessageTemplates::recommendations(top),
    }
}
