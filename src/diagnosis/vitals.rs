use crate::intake::types::VitalSigns;

const MAX_TEMPERATURE_F: f64 = 103.0;
const MAX_SYSTOLIC: u32 = 180;
const MAX_DIASTOLIC: u32 = 110;
const MIN_PULSE: u32 = 50;
const MAX_PULSE: u32 = 120;
const MIN_GLUCOSE: u32 = 70;
const MAX_GLUCOSE: u32 = 300;

pub const HIGH_FEVER: &str = "High fever (>103°F) - Seek immediate medical care";
pub const HIGH_BLOOD_PRESSURE: &str = "High blood pressure - Seek medical attention";
pub const ABNORMAL_HEART_RATE: &str = "Abnormal heart rate - Seek medical attention";
pub const ABNORMAL_GLUCOSE: &str = "Abnormal blood glucose - Seek medical attention";

/// Advisories for readings outside the safe bands. Missing readings never fire.
pub fn check_critical_vital_signs(vitals: &VitalSigns) -> Vec<String> {
    let mut warnings = Vec::new();

    if vitals.temperature.is_some_and(|t| t > MAX_TEMPERATURE_F) {
        warnings.push(HIGH_FEVER.to_string());
    }
    if vitals.systolic.is_some_and(|s| s > MAX_SYSTOLIC)
        || vitals.diastolic.is_some_and(|d| d > MAX_DIASTOLIC)
    {
        warnings.push(HIGH_BLOOD_PRESSURE.to_string());
    }
    if vitals.pulse.is_some_and(|p| !(MIN_PULSE..=MAX_PULSE).contains(&p)) {
        warnings.push(ABNORMAL_HEART_RATE.to_string());
    }
    if vitals.glucose.is_some_and(|g| !(MIN_GLUCOSE..=MAX_GLUCOSE).contains(&g)) {
        warnings.push(ABNORMAL_GLUCOSE.to_string());
    }

    warnings
}
